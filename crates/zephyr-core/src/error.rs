//! Error types for Zephyr.
//!
//! This module provides [`ZephyrError`], the error type returned by every
//! fallible registration and dispatch operation, and [`AppError`], the
//! application error raised from inside route handlers.
//!
//! | Variant | Raised by | Observed by |
//! |---|---|---|
//! | `InvalidName` | condition, filter and error registration | caller, at bootstrap |
//! | `InvalidCondition` | condition dispatch of an unknown name | caller |
//! | `InvalidPayload` | error dispatch, plugin registration | caller |
//! | `DependencyMismatch` | application construction | caller |
//! | `InvalidPattern` | route registration, `user_agent_matches` | caller |
//! | `UnknownFilter` | filter stage lookup by name | caller |
//! | `UnknownHelper` | helper call by an unregistered name | caller |
//! | `Collaborator` | view and other external collaborators | orchestrator |
//! | `Application` | handler bodies | orchestrator → error registry |
//!
//! The "try the next candidate" signal is deliberately absent: it is a
//! [`Flow`](crate::Flow) value, so it can never travel through a `?`.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::borrow::Cow;
use thiserror::Error;

/// Result type alias using [`ZephyrError`].
pub type ZephyrResult<T> = Result<T, ZephyrError>;

/// Kind name given to application errors created without an explicit kind.
pub const GENERIC_KIND: &str = "generic";

/// Standard error type for Zephyr.
///
/// # Example
///
/// ```
/// use zephyr_core::{AppError, ZephyrError};
///
/// fn load_post(id: &str) -> Result<(), ZephyrError> {
///     if id.is_empty() {
///         return Err(AppError::new("MissingPost", "no such post").with_code(404).into());
///     }
///     Ok(())
/// }
///
/// let err = load_post("").unwrap_err();
/// assert_eq!(err.kind_name(), "MissingPost");
/// assert_eq!(err.code(), 404);
/// ```
#[derive(Error, Debug)]
pub enum ZephyrError {
    /// A registration was attempted with an empty name.
    #[error("you must provide a name to register a {registry}")]
    InvalidName {
        /// The registry that rejected the name (e.g. "condition").
        registry: &'static str,
    },

    /// A condition was dispatched by a name that was never registered.
    #[error("`{name}` is not a valid condition")]
    InvalidCondition {
        /// The unknown condition name.
        name: String,
    },

    /// A payload was neither a message, an error, nor a plugin factory.
    #[error("invalid payload: {message}")]
    InvalidPayload {
        /// Description of what was expected.
        message: String,
    },

    /// A collaborator injected at construction has the wrong type.
    #[error("dependency `{dependency}` is not an instance of {expected}")]
    DependencyMismatch {
        /// The dependency slot name.
        dependency: String,
        /// The type the slot expects.
        expected: &'static str,
    },

    /// A route or guard pattern failed to compile.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The pattern as written.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A filter stage was requested by a name other than `before`/`after`.
    #[error("`{name}` is not a valid filter type")]
    UnknownFilter {
        /// The requested stage name.
        name: String,
    },

    /// A helper was called by a name that was never registered.
    #[error("call to undefined helper `{name}`")]
    UnknownHelper {
        /// The requested helper name.
        name: String,
    },

    /// An external collaborator (view, store) reported a failure.
    #[error("{collaborator} failed: {message}")]
    Collaborator {
        /// The collaborator that failed.
        collaborator: &'static str,
        /// Failure description.
        message: String,
    },

    /// A business or runtime failure raised from a route handler.
    #[error(transparent)]
    Application(#[from] AppError),
}

impl ZephyrError {
    /// Creates an invalid name error for the given registry.
    #[must_use]
    pub fn invalid_name(registry: &'static str) -> Self {
        Self::InvalidName { registry }
    }

    /// Creates an invalid condition error.
    #[must_use]
    pub fn invalid_condition(name: impl Into<String>) -> Self {
        Self::InvalidCondition { name: name.into() }
    }

    /// Creates an invalid payload error.
    #[must_use]
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            message: message.into(),
        }
    }

    /// Creates a dependency mismatch error.
    #[must_use]
    pub fn dependency_mismatch(dependency: impl Into<String>, expected: &'static str) -> Self {
        Self::DependencyMismatch {
            dependency: dependency.into(),
            expected,
        }
    }

    /// Creates an invalid pattern error.
    #[must_use]
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates an unknown filter error.
    #[must_use]
    pub fn unknown_filter(name: impl Into<String>) -> Self {
        Self::UnknownFilter { name: name.into() }
    }

    /// Creates an unknown helper error.
    #[must_use]
    pub fn unknown_helper(name: impl Into<String>) -> Self {
        Self::UnknownHelper { name: name.into() }
    }

    /// Creates a collaborator error.
    #[must_use]
    pub fn collaborator(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::Collaborator {
            collaborator,
            message: message.into(),
        }
    }

    /// Returns the kind name used to match error handlers.
    ///
    /// Application errors report their own kind; framework errors report
    /// the variant name.
    #[must_use]
    pub fn kind_name(&self) -> &str {
        match self {
            Self::InvalidName { .. } => "InvalidName",
            Self::InvalidCondition { .. } => "InvalidCondition",
            Self::InvalidPayload { .. } => "InvalidPayload",
            Self::DependencyMismatch { .. } => "DependencyMismatch",
            Self::InvalidPattern { .. } => "InvalidPattern",
            Self::UnknownFilter { .. } => "UnknownFilter",
            Self::UnknownHelper { .. } => "UnknownHelper",
            Self::Collaborator { .. } => "Collaborator",
            Self::Application(err) => err.kind(),
        }
    }

    /// Returns the numeric code carried by this error.
    ///
    /// Framework errors surfacing during a request are server faults and
    /// carry 500.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            Self::Application(err) => err.code(),
            _ => 500,
        }
    }
}

/// An application error of arbitrary kind.
///
/// Handlers raise these to hand a failure to the error registry. The kind
/// name is matched exactly against handlers registered by kind; the code is
/// matched against handlers registered by code.
///
/// # Example
///
/// ```
/// use zephyr_core::AppError;
///
/// let err = AppError::generic("test").with_code(403);
/// assert_eq!(err.kind(), "generic");
/// assert_eq!(err.message(), "test");
/// assert_eq!(err.code(), 403);
/// ```
#[derive(Error, Debug)]
#[error("{message}")]
pub struct AppError {
    kind: Cow<'static, str>,
    message: String,
    code: u16,
    trace: Option<String>,
    #[source]
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Creates an application error with an explicit kind name.
    ///
    /// A backtrace is captured here when backtraces are enabled for the
    /// process (`RUST_BACKTRACE`/`RUST_LIB_BACKTRACE`).
    #[must_use]
    pub fn new(kind: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            code: 0,
            trace: captured_trace(),
            source: None,
        }
    }

    /// Creates an application error of the generic kind.
    #[must_use]
    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(GENERIC_KIND, message)
    }

    /// Wraps any error, naming the kind after the error's type.
    ///
    /// ```
    /// use zephyr_core::AppError;
    ///
    /// let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
    /// let err = AppError::wrap(io);
    /// assert_eq!(err.kind(), "Error");
    /// assert_eq!(err.message(), "disk full");
    /// ```
    pub fn wrap<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            kind: Cow::Borrowed(short_type_name(std::any::type_name::<E>())),
            message: error.to_string(),
            code: 0,
            trace: captured_trace(),
            source: Some(anyhow::Error::new(error)),
        }
    }

    /// Sets the carried numeric code.
    #[must_use]
    pub fn with_code(mut self, code: u16) -> Self {
        self.code = code;
        self
    }

    /// Attaches an already-rendered trace.
    #[must_use]
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    /// Captures the current backtrace, if backtraces are enabled for the
    /// process (`RUST_BACKTRACE`/`RUST_LIB_BACKTRACE`).
    #[must_use]
    pub fn with_backtrace(mut self) -> Self {
        if let Some(trace) = captured_trace() {
            self.trace = Some(trace);
        }
        self
    }

    /// Attaches an underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the kind name.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the carried code (0 when none was set).
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// Returns the rendered trace, if one was captured.
    #[must_use]
    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }
}

// "std::io::error::Error" -> "Error", "app::Wrapper<u8>" -> "Wrapper"
fn captured_trace() -> Option<String> {
    let backtrace = Backtrace::capture();
    (backtrace.status() == BacktraceStatus::Captured).then(|| backtrace.to_string())
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
