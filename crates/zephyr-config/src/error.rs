//! Settings errors.

use std::path::PathBuf;
use thiserror::Error;

/// Why settings could not be loaded or changed.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file does not exist.
    #[error("settings file `{}` does not exist", path.display())]
    FileNotFound {
        /// Path as given to the loader.
        path: PathBuf,
    },

    /// The settings file exists but could not be read.
    #[error("cannot read settings file `{}`", path.display())]
    ReadError {
        /// Path as given to the loader.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// TOML input did not deserialize into [`Settings`](crate::Settings).
    #[error("invalid TOML settings: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON input did not deserialize into [`Settings`](crate::Settings).
    #[error("invalid JSON settings: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Neither `toml` nor `json`.
    #[error("settings format `{format}` is not supported (use toml or json)")]
    UnsupportedFormat {
        /// Rejected extension, format name or path.
        format: String,
    },

    /// A value failed a type check or validation.
    #[error("setting `{key}` rejected: {reason}")]
    InvalidValue {
        /// Dotted key, e.g. `view.extension`.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// `Settings::set` was called with an empty key.
    #[error("setting keys must not be empty")]
    EmptyKey,

    /// A `PREFIX__SECTION__KEY` override could not be applied.
    #[error("environment override {var} rejected: {reason}")]
    EnvParseError {
        /// Variable name.
        var: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A `.env` file was found but is malformed.
    #[error("cannot load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

impl ConfigError {
    /// Missing settings file.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Unreadable settings file.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Unknown format.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// A setting with the wrong type or an out-of-range value.
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// A rejected environment override.
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            reason: reason.into(),
        }
    }
}
