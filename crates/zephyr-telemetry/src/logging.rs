//! Structured logging for Zephyr.
//!
//! Installs a global `tracing` subscriber that writes either JSON lines
//! (for production) or pretty human-readable output (for development).
//! Dispatch spans carry the request id, method and path, so every event a
//! handler emits is correlated with its request.
//!
//! # Example
//!
//! ```rust,ignore
//! use zephyr_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(route = "/admin/posts", "bootstrapped");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line, human-readable output.
    Pretty,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
        })
    }
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(TelemetryError::InvalidFilter {
                filter: other.to_string(),
                reason: "expected `json` or `pretty`".to_string(),
            }),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g. `"info"`, `"zephyr_router=trace,info"`).
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Whether to emit span open/close events.
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include thread IDs.
    pub thread_ids: bool,

    /// Whether to include the target (module path).
    pub include_target: bool,

    /// Whether to colour pretty output.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            ansi: false,
        }
    }
}

impl LogConfig {
    /// Human-readable output at `debug`, with span events and source
    /// locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            span_events: true,
            file_line_info: true,
            ansi: true,
            ..Self::default()
        }
    }

    /// JSON output at `info`.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Installs the global log subscriber.
///
/// Does nothing when `config.enabled` is false.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] for a bad level directive and
/// [`TelemetryError::LoggingInit`] if a global subscriber already exists.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;
    let base = tracing_subscriber::fmt::layer()
        .with_span_events(config.span_events())
        .with_file(config.file_line_info)
        .with_line_number(config.file_line_info)
        .with_thread_ids(config.thread_ids)
        .with_target(config.include_target);

    let layer = match config.format {
        LogFormat::Json => base.json().with_current_span(true).with_filter(filter).boxed(),
        LogFormat::Pretty => base.pretty().with_ansi(config.ansi).with_filter(filter).boxed(),
    };

    let result = tracing_subscriber::registry().with(layer).try_init();
    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Parses a filter directive such as `"info"` or `"zephyr=debug,warn"`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] if the directive is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter).map_err(|e| TelemetryError::InvalidFilter {
        filter: filter.to_string(),
        reason: e.to_string(),
    })
}

/// Standard log field names.
pub mod fields {
    /// Request ID.
    pub const REQUEST_ID: &str = "request_id";

    /// HTTP method.
    pub const HTTP_METHOD: &str = "http.method";

    /// Request path.
    pub const HTTP_PATH: &str = "http.path";

    /// Response status code.
    pub const HTTP_STATUS: &str = "http.status_code";

    /// Registration order of the route that handled the request.
    pub const ROUTE_ORDER: &str = "route.order";

    /// Kind name of a dispatched error.
    pub const ERROR_KIND: &str = "error.kind";

    /// Code carried by a dispatched error.
    pub const ERROR_CODE: &str = "error.code";

    /// Duration in microseconds.
    pub const DURATION_US: &str = "duration_us";
}

/// Logs the start of a dispatch.
#[macro_export]
macro_rules! log_request_start {
    ($request_id:expr, $method:expr, $path:expr) => {
        tracing::debug!(
            request_id = %$request_id,
            http.method = %$method,
            http.path = %$path,
            "request started"
        );
    };
}

/// Logs the end of a dispatch.
#[macro_export]
macro_rules! log_request_complete {
    ($request_id:expr, $status:expr, $duration_us:expr) => {
        tracing::info!(
            request_id = %$request_id,
            http.status_code = $status,
            duration_us = $duration_us,
            "request completed"
        );
    };
}

/// Logs an error that reached the error boundary.
#[macro_export]
macro_rules! log_request_error {
    ($request_id:expr, $error:expr) => {
        tracing::error!(
            request_id = %$request_id,
            error = %$error,
            "request failed"
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "info");
        assert_eq!(config, LogConfig::production());
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.span_events);
        assert!(config.file_line_info);
        assert_eq!(config.level, "debug");
        assert_eq!(config.span_events(), FmtSpan::NEW | FmtSpan::CLOSE);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Pretty.to_string(), "pretty");
    }

    #[test]
    fn test_format_serde() {
        let json = serde_json::to_string(&LogFormat::Pretty).unwrap();
        assert_eq!(json, "\"pretty\"");
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
    }

    #[test]
    fn test_create_env_filter() {
        assert!(create_env_filter("info").is_ok());
        assert!(create_env_filter("zephyr_router=trace,warn").is_ok());
        assert!(matches!(
            create_env_filter("zephyr=notalevel"),
            Err(TelemetryError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_disabled_logging() {
        let config = LogConfig {
            enabled: false,
            level: "notalevel=".to_string(),
            ..LogConfig::default()
        };
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_macros_expand() {
        let request_id = "0190b6d5-0000-7000-8000-000000000000";
        crate::log_request_start!(request_id, "GET", "/admin/posts/5");
        crate::log_request_complete!(request_id, 200_u16, 42_u64);
        crate::log_request_error!(request_id, "boom");
    }
}
