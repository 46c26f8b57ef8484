//! Logging setup for Zephyr applications.
//!
//! The library crates only emit `tracing` events; installing a subscriber is
//! the host's decision. This crate provides the standard one.
//!
//! # Example
//!
//! ```rust,ignore
//! use zephyr_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production())?;
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
