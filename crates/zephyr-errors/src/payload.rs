//! Error payloads and the report handed to error handlers.

use std::any::Any;
use zephyr_core::{AppError, ZephyrError, ZephyrResult};

/// Kind name given to errors recovered from a panicking handler.
pub const PANIC_KIND: &str = "panic";

/// What was passed to [`ErrorRegistry::dispatch_error`](crate::ErrorRegistry::dispatch_error).
#[derive(Debug)]
pub enum ErrorPayload {
    /// A literal message; the code is supplied alongside it.
    Message(String),
    /// An error value carrying its own kind, message and code.
    Error(ZephyrError),
}

impl ErrorPayload {
    /// Converts a dynamically typed payload.
    ///
    /// Accepts `String`, `&'static str`, [`ZephyrError`] and [`AppError`].
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::InvalidPayload`] for anything else.
    pub fn from_any(payload: Box<dyn Any + Send>) -> ZephyrResult<Self> {
        let payload = match payload.downcast::<String>() {
            Ok(message) => return Ok(Self::Message(*message)),
            Err(other) => other,
        };
        let payload = match payload.downcast::<&'static str>() {
            Ok(message) => return Ok(Self::Message((*message).to_string())),
            Err(other) => other,
        };
        let payload = match payload.downcast::<ZephyrError>() {
            Ok(error) => return Ok(Self::Error(*error)),
            Err(other) => other,
        };
        match payload.downcast::<AppError>() {
            Ok(error) => Ok(Self::Error((*error).into())),
            Err(_) => Err(invalid()),
        }
    }

    /// Converts the payload of a caught panic into an error of kind
    /// [`PANIC_KIND`] carrying code 500. When backtraces are enabled for the
    /// process, the error carries the trace captured at the catch site.
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::InvalidPayload`] if the panic payload is not a
    /// string.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> ZephyrResult<Self> {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(other) => match other.downcast::<&'static str>() {
                Ok(message) => (*message).to_string(),
                Err(_) => return Err(invalid()),
            },
        };
        Ok(Self::Error(
            AppError::new(PANIC_KIND, message).with_code(500).into(),
        ))
    }
}

fn invalid() -> ZephyrError {
    ZephyrError::invalid_payload("errors must be a string or a valid error")
}

impl From<String> for ErrorPayload {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for ErrorPayload {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<ZephyrError> for ErrorPayload {
    fn from(error: ZephyrError) -> Self {
        Self::Error(error)
    }
}

impl From<AppError> for ErrorPayload {
    fn from(error: AppError) -> Self {
        Self::Error(error.into())
    }
}

/// The resolved view of a dispatched error, handed to error handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// Human readable message.
    pub message: String,
    /// Carried code (0 when none).
    pub code: u16,
    /// Kind name; `None` for literal messages.
    pub kind: Option<String>,
    /// Rendered backtrace, if one was captured.
    pub trace: Option<String>,
}

impl ErrorReport {
    /// Builds a report from a payload. `code` applies to literal messages
    /// only; errors carry their own.
    #[must_use]
    pub fn new(payload: &ErrorPayload, code: u16) -> Self {
        match payload {
            ErrorPayload::Message(message) => Self {
                message: message.clone(),
                code,
                kind: None,
                trace: None,
            },
            ErrorPayload::Error(error) => Self {
                message: error.to_string(),
                code: error.code(),
                kind: Some(error.kind_name().to_string()),
                trace: match error {
                    ZephyrError::Application(app) => app.trace().map(ToString::to_string),
                    _ => None,
                },
            },
        }
    }
}
