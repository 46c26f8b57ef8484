//! Application settings.
//!
//! [`Settings`] is the typed root of all configuration. Besides field
//! access it offers a key/value surface (`get`/`set`) over dotted keys so
//! handlers and plugins can read and change settings by name. Keys outside
//! the known sections live in `extra`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use zephyr_telemetry::{create_env_filter, LogFormat};

use crate::{ConfigError, ErrorSettings, LoggingSettings, ViewSettings};

/// Flat key names accepted as aliases of dotted keys.
const ALIASES: [(&str, &str); 6] = [
    ("template_engine", "view.engine"),
    ("template_directory", "view.directory"),
    ("template_extension", "view.extension"),
    ("template_layout", "view.layout"),
    ("errors_backtrace", "errors.backtrace"),
    ("errors_exit", "errors.exit"),
];

/// Complete Zephyr settings.
///
/// # Example
///
/// ```
/// use zephyr_config::Settings;
/// use serde_json::json;
///
/// let mut settings = Settings::default();
/// assert_eq!(settings.get("errors.backtrace"), Some(json!(true)));
/// assert_eq!(settings.get("unset key"), None);
///
/// settings.set("view.engine", "tera").unwrap();
/// settings.set("a key", "a value").unwrap();
/// assert_eq!(settings.view.engine, "tera");
/// assert_eq!(settings.get("a key"), Some(json!("a value")));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// View collaborator settings.
    #[serde(default)]
    pub view: ViewSettings,

    /// Error boundary settings.
    #[serde(default)]
    pub errors: ErrorSettings,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// User-defined keys.
    #[serde(default)]
    pub extra: IndexMap<String, Value>,
}

impl Settings {
    /// Development preset: pretty debug logging.
    #[must_use]
    pub fn development() -> Self {
        let mut settings = Self::default();
        settings.logging.level = "debug".to_string();
        settings.logging.format = LogFormat::Pretty;
        settings.logging.ansi = true;
        settings
    }

    /// Production preset: JSON logging, no backtraces on error pages.
    #[must_use]
    pub fn production() -> Self {
        let mut settings = Self::default();
        settings.errors.backtrace = false;
        settings
    }

    /// Returns the value stored under `key`, or `None` if it was never set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let value = match canonical(key) {
            "view.engine" => Value::from(self.view.engine.as_str()),
            "view.directory" => Value::from(self.view.directory.as_str()),
            "view.extension" => Value::from(self.view.extension.as_str()),
            "view.layout" => Value::from(self.view.layout.as_str()),
            "errors.backtrace" => Value::from(self.errors.backtrace),
            "errors.exit" => Value::from(self.errors.exit),
            "logging.enabled" => Value::from(self.logging.enabled),
            "logging.level" => Value::from(self.logging.level.as_str()),
            "logging.format" => Value::from(self.logging.format.to_string()),
            "logging.ansi" => Value::from(self.logging.ansi),
            other => return self.extra.get(other).cloned(),
        };
        Some(value)
    }

    /// Returns a string setting.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns a boolean setting.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyKey`] for an empty key and
    /// [`ConfigError::InvalidValue`] when a known key gets a value of the
    /// wrong type.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), ConfigError> {
        if key.is_empty() {
            return Err(ConfigError::EmptyKey);
        }

        let value = value.into();
        let key = canonical(key);
        match key {
            "view.engine" => self.view.engine = expect_string(key, value)?,
            "view.directory" => self.view.directory = expect_string(key, value)?,
            "view.extension" => self.view.extension = expect_string(key, value)?,
            "view.layout" => self.view.layout = expect_string(key, value)?,
            "errors.backtrace" => self.errors.backtrace = expect_bool(key, value)?,
            "errors.exit" => self.errors.exit = expect_bool(key, value)?,
            "logging.enabled" => self.logging.enabled = expect_bool(key, value)?,
            "logging.level" => self.logging.level = expect_string(key, value)?,
            "logging.format" => {
                self.logging.format = expect_string(key, value)?
                    .parse()
                    .map_err(|_| ConfigError::invalid_value(key, "expected `json` or `pretty`"))?;
            }
            "logging.ansi" => self.logging.ansi = expect_bool(key, value)?,
            other => {
                self.extra.insert(other.to_string(), value);
            }
        }
        Ok(())
    }

    /// Stores every pair of `values`, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first error [`Settings::set`] reports.
    pub fn set_many<K, V, I>(&mut self, values: I) -> Result<(), ConfigError>
    where
        K: AsRef<str>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in values {
            self.set(key.as_ref(), value)?;
        }
        Ok(())
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the log level is not a valid
    /// filter directive, the template directory is empty, or the template
    /// extension does not start with a dot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.view.directory.is_empty() {
            return Err(ConfigError::invalid_value("view.directory", "must not be empty"));
        }

        if !self.view.extension.is_empty() && !self.view.extension.starts_with('.') {
            return Err(ConfigError::invalid_value(
                "view.extension",
                format!("`{}` must start with `.`", self.view.extension),
            ));
        }

        if self.logging.enabled {
            create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }
}

fn canonical(key: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map_or(key, |(_, dotted)| *dotted)
}

fn expect_string(key: &str, value: Value) -> Result<String, ConfigError> {
    match value {
        Value::String(value) => Ok(value),
        other => Err(ConfigError::invalid_value(
            key,
            format!("expected string, got {other}"),
        )),
    }
}

fn expect_bool(key: &str, value: Value) -> Result<bool, ConfigError> {
    value
        .as_bool()
        .ok_or_else(|| ConfigError::invalid_value(key, format!("expected boolean, got {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        let defaults = [
            ("template_engine", json!("builtin")),
            ("template_directory", json!("../views")),
            ("template_extension", json!(".html")),
            ("template_layout", json!("layout")),
            ("errors_backtrace", json!(true)),
        ];
        for (key, expected) in defaults {
            assert_eq!(settings.get(key), Some(expected), "{key}");
        }
        assert_eq!(settings.get("logging.format"), Some(json!("json")));
    }

    #[test]
    fn test_get_with_unset_key() {
        assert_eq!(Settings::default().get("unset key"), None);
    }

    #[test]
    fn test_set_new_and_existing_keys() {
        let mut settings = Settings::default();
        settings.set("a key", "a value").unwrap();
        settings.set("template_engine", "smarty").unwrap();

        assert_eq!(settings.get("a key"), Some(json!("a value")));
        assert_eq!(settings.get_str("view.engine").as_deref(), Some("smarty"));
    }

    #[test]
    fn test_set_many() {
        let mut settings = Settings::default();
        settings
            .set_many([
                ("a key1", json!("a value1")),
                ("a key2", json!("a value2")),
                ("template_engine", json!("smarty")),
                ("template_extension", json!(".tpl")),
            ])
            .unwrap();

        assert_eq!(settings.get("a key2"), Some(json!("a value2")));
        assert_eq!(settings.view.extension, ".tpl");
        assert_eq!(settings.extra.len(), 2);
    }

    #[test]
    fn test_set_rejects_wrong_types() {
        let mut settings = Settings::default();
        assert!(matches!(
            settings.set("errors.backtrace", "yes"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            settings.set("view.layout", 3),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            settings.set("logging.format", "xml"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(settings.set("", 1), Err(ConfigError::EmptyKey)));
    }

    #[test]
    fn test_bool_accessor() {
        let mut settings = Settings::default();
        settings.set("errors_backtrace", false).unwrap();
        assert_eq!(settings.get_bool("errors.backtrace"), Some(false));
        assert_eq!(settings.get_bool("view.layout"), None);
    }

    #[test]
    fn test_presets() {
        assert_eq!(Settings::development().logging.format, LogFormat::Pretty);
        assert!(!Settings::production().errors.backtrace);
    }

    #[test]
    fn test_validate() {
        assert!(Settings::default().validate().is_ok());

        let mut settings = Settings::default();
        settings.view.extension = "html".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.logging.level = "zephyr=loud".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_toml_roundtrip_keeps_extra() {
        let toml_str = r#"
            [errors]
            backtrace = false

            [extra]
            blog_title = "My Blog"
        "#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert!(!settings.errors.backtrace);
        assert_eq!(settings.get("blog_title"), Some(json!("My Blog")));
    }
}
