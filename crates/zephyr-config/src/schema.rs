//! Settings sections.

use serde::{Deserialize, Serialize};
use zephyr_telemetry::{LogConfig, LogFormat};

/// View collaborator settings.
///
/// # Example
///
/// ```
/// use zephyr_config::ViewSettings;
///
/// let view = ViewSettings::default();
/// assert_eq!(view.directory, "../views");
/// assert_eq!(view.layout, "layout");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ViewSettings {
    /// Name of the template engine the view collaborator should use.
    #[serde(default = "default_engine")]
    pub engine: String,

    /// Directory templates are loaded from.
    #[serde(default = "default_directory")]
    pub directory: String,

    /// Template file extension, including the dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Name of the layout template.
    #[serde(default = "default_layout")]
    pub layout: String,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            directory: default_directory(),
            extension: default_extension(),
            layout: default_layout(),
        }
    }
}

fn default_engine() -> String {
    "builtin".to_string()
}

fn default_directory() -> String {
    "../views".to_string()
}

fn default_extension() -> String {
    ".html".to_string()
}

fn default_layout() -> String {
    "layout".to_string()
}

/// Error boundary settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ErrorSettings {
    /// Append a backtrace block to the built-in error page.
    #[serde(default = "default_true")]
    pub backtrace: bool,

    /// Ask the host to halt after an error was dispatched.
    #[serde(default = "default_true")]
    pub exit: bool,
}

impl Default for ErrorSettings {
    fn default() -> Self {
        Self {
            backtrace: true,
            exit: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g. "info", "zephyr_router=trace,info").
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Colour pretty output.
    #[serde(default)]
    pub ansi: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_level(),
            format: LogFormat::Json,
            ansi: false,
        }
    }
}

impl LoggingSettings {
    /// Converts to the telemetry crate's subscriber configuration.
    ///
    /// ```
    /// use zephyr_config::LoggingSettings;
    ///
    /// let log = LoggingSettings::default().to_log_config();
    /// assert_eq!(log.level, "info");
    /// ```
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            ansi: self.ansi,
            ..base
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
