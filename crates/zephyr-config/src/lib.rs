//! Typed settings for Zephyr applications.
//!
//! This crate provides the settings store an application reads and writes
//! at runtime, with support for:
//! - TOML and JSON configuration files
//! - `.env` files and environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (preset → file → env)
//!
//! # Overview
//!
//! [`Settings`] groups the known options into sections:
//!
//! - [`ViewSettings`] - template engine, directory, extension and layout
//! - [`ErrorSettings`] - backtrace block and halt flag of the error boundary
//! - [`LoggingSettings`] - subscriber level and format
//!
//! Any other key lands in `extra` and is reachable through
//! [`Settings::get`] and [`Settings::set`].
//!
//! # Example
//!
//! ```no_run
//! use zephyr_config::ConfigLoader;
//!
//! # fn main() -> Result<(), zephyr_config::ConfigError> {
//! let settings = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("zephyr.toml")?
//!     .with_env_prefix("ZEPHYR")
//!     .load()?;
//!
//! println!("templates live in {}", settings.view.directory);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [view]
//! engine = "builtin"
//! directory = "../views"
//! extension = ".html"
//! layout = "layout"
//!
//! [errors]
//! backtrace = false
//! exit = true
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [extra]
//! blog_title = "My Blog"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Known values can be overridden with `PREFIX__SECTION__KEY`, and extra
//! keys with `PREFIX__EXTRA__NAME`:
//!
//! - `ZEPHYR__ERRORS__BACKTRACE=false`
//! - `ZEPHYR__LOGGING__LEVEL=debug`
//! - `ZEPHYR__EXTRA__BLOG_TITLE=My Blog`

#![warn(missing_docs)]

mod error;
mod loader;
mod schema;
mod settings;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{ErrorSettings, LoggingSettings, ViewSettings};
pub use settings::Settings;
