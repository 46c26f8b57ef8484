//! # Zephyr Core
//!
//! Core types shared by every Zephyr crate:
//!
//! - [`ZephyrError`] / [`AppError`] - the error taxonomy
//! - [`Flow`] - the "try the next candidate" sentinel returned by handlers and guards
//! - [`RequestContext`] / [`Response`] - per-request state and its result
//! - [`ClosureChain`] - the ordered chain behind filters and helpers

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chain;
mod context;
mod error;
mod flow;

pub use chain::{ChainEntry, ClosureChain};
pub use context::{RequestContext, RequestId, Response};
pub use error::{AppError, ZephyrError, ZephyrResult, GENERIC_KIND};
pub use flow::{Flow, HandlerResult};

/// Re-exported so downstream crates and handlers share one `http` version.
pub use http;
