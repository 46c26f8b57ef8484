//! Layered settings loader.

use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::{ConfigError, Settings};

/// Loads [`Settings`] in layers, later layers overriding earlier ones:
///
/// 1. a preset (defaults, development or production)
/// 2. a TOML or JSON file, or a string
/// 3. a `.env` file, merged into the process environment
/// 4. environment variables `PREFIX__SECTION__KEY`
///
/// # Example
///
/// ```no_run
/// use zephyr_config::ConfigLoader;
///
/// # fn main() -> Result<(), zephyr_config::ConfigError> {
/// let settings = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("zephyr.toml")?
///     .with_dotenv()?
///     .with_env_prefix("ZEPHYR")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    settings: Settings,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader starting from the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            env_prefix: None,
        }
    }

    /// Resets to the default settings.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.settings = Settings::default();
        self
    }

    /// Resets to the development preset.
    ///
    /// ```
    /// use zephyr_config::ConfigLoader;
    ///
    /// let settings = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(settings.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.settings = Settings::development();
        self
    }

    /// Resets to the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.settings = Settings::production();
        self
    }

    /// Loads a `.toml` or `.json` file. The file replaces the current
    /// settings; sections it omits take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, has an
    /// unsupported extension, or does not parse (unknown fields included).
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::unsupported_format(path.display().to_string()))?;

        self.settings = parse(&content, format)?;
        Ok(self)
    }

    /// Loads a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads settings from a string in the given format (`"toml"` or
    /// `"json"`).
    ///
    /// ```
    /// use zephyr_config::ConfigLoader;
    ///
    /// let settings = ConfigLoader::new()
    ///     .with_string("[errors]\nbacktrace = false", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    /// assert!(!settings.errors.backtrace);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unsupported or parsing fails.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.settings = parse(content, format)?;
        Ok(self)
    }

    /// Sets the environment variable prefix for overrides.
    ///
    /// With prefix `ZEPHYR`:
    /// - `ZEPHYR__ERRORS__BACKTRACE=false`
    /// - `ZEPHYR__VIEW__LAYOUT=base`
    /// - `ZEPHYR__EXTRA__BLOG_TITLE=My Blog` (stored as `blog_title`)
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads a `.env` file from the current directory or its parents into
    /// the process environment. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Dotenv`] if the file exists but is malformed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or validation
    /// fails.
    pub fn load(mut self) -> Result<Settings, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars: Vec<(String, String)> = env::vars()
                .filter(|(k, _)| k.starts_with(&prefix))
                .collect();
            for (key, value) in vars {
                self.apply_env_var(&key, &value, &prefix)?;
            }
        }

        self.settings.validate()?;
        Ok(self.settings)
    }

    /// Returns the settings without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> Settings {
        self.settings
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(());
        };

        let parts: Vec<&str> = rest.split("__").collect();
        let (setting, value) = match parts.as_slice() {
            ["EXTRA", name] => (name.to_lowercase(), Value::from(value)),
            [section, field] => {
                let setting = format!("{}.{}", section.to_lowercase(), field.to_lowercase());
                let value = match self.settings.get(&setting) {
                    Some(Value::Bool(_)) => Value::from(
                        parse_bool(value)
                            .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?,
                    ),
                    Some(_) => Value::from(value),
                    None => return Ok(()),
                };
                (setting, value)
            }
            _ => return Ok(()),
        };

        self.settings
            .set(&setting, value)
            .map_err(|e| ConfigError::env_parse_error(key, e.to_string()))
    }
}

fn parse(content: &str, format: &str) -> Result<Settings, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::unsupported_format(other)),
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
