//! The error handler registry.
//!
//! Handlers are resolved in a fixed order:
//!
//! 1. a handler registered for the error's code
//! 2. a handler registered for the error's kind name (exact match)
//! 3. the default handler
//! 4. the built-in renderer
//!
//! Exactly one of them produces output for a dispatched error.

use crate::matcher::{ErrorMatcher, Slot};
use crate::payload::{ErrorPayload, ErrorReport};
use crate::render::{render, render_document, render_fragment, RenderOptions};
use crate::status::phrase_for;
use http::StatusCode;
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use zephyr_core::{RequestContext, ZephyrResult};

/// A type-erased error handler.
pub type ErrorHandler<S> =
    Arc<dyn Fn(&S, &mut RequestContext, &ErrorReport) -> ZephyrResult<()> + Send + Sync>;

/// Which handler produced the output for a dispatched error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The handler registered for this code.
    Code(u16),
    /// The handler registered for this kind name.
    Kind(String),
    /// The default handler.
    Default,
    /// The built-in renderer, either because nothing matched or because the
    /// resolved handler failed.
    BuiltIn,
}

/// Maps codes, kind names and a default to error handlers.
///
/// # Example
///
/// ```rust
/// use zephyr_core::{AppError, RequestContext};
/// use zephyr_errors::{ErrorRegistry, RenderOptions, Resolution};
/// use http::Method;
///
/// let mut errors: ErrorRegistry = ErrorRegistry::new();
/// errors
///     .add(400..=404, |_, ctx, report| {
///         ctx.write(&format!("client error {}", report.code));
///         Ok(())
///     })
///     .unwrap();
///
/// let mut ctx = RequestContext::new(Method::GET, "/");
/// let resolution = errors.dispatch_error(
///     &(),
///     &mut ctx,
///     AppError::generic("test").with_code(402),
///     0,
///     RenderOptions::default(),
/// );
/// assert_eq!(resolution, Resolution::Code(402));
/// assert_eq!(ctx.output(), "client error 402");
/// ```
pub struct ErrorRegistry<S = ()> {
    default: Option<ErrorHandler<S>>,
    codes: IndexMap<u16, ErrorHandler<S>>,
    kinds: IndexMap<String, ErrorHandler<S>>,
    exit: bool,
}

impl<S> Default for ErrorRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for ErrorRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            default: self.default.clone(),
            codes: self.codes.clone(),
            kinds: self.kinds.clone(),
            exit: self.exit,
        }
    }
}

impl<S> fmt::Debug for ErrorRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorRegistry")
            .field("default", &self.default.is_some())
            .field("codes", &self.codes.keys().collect::<Vec<_>>())
            .field("kinds", &self.kinds.keys().collect::<Vec<_>>())
            .field("exit", &self.exit)
            .finish()
    }
}

impl<S> ErrorRegistry<S> {
    /// Creates an empty registry. Exit is enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default: None,
            codes: IndexMap::new(),
            kinds: IndexMap::new(),
            exit: true,
        }
    }

    /// Registers `handler` for every slot `matcher` names.
    ///
    /// Later registrations for the same code, kind or default replace
    /// earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::InvalidName`](zephyr_core::ZephyrError::InvalidName)
    /// if any name is empty or the matcher names nothing. Nothing is
    /// registered in that case.
    pub fn add<M, F>(&mut self, matcher: M, handler: F) -> ZephyrResult<()>
    where
        M: Into<ErrorMatcher>,
        F: Fn(&S, &mut RequestContext, &ErrorReport) -> ZephyrResult<()> + Send + Sync + 'static,
    {
        let slots = matcher.into().slots()?;
        let handler: ErrorHandler<S> = Arc::new(handler);

        for slot in slots {
            tracing::debug!(slot = ?slot, "error handler registered");
            match slot {
                Slot::Default => self.default = Some(Arc::clone(&handler)),
                Slot::Code(code) => {
                    self.codes.insert(code, Arc::clone(&handler));
                }
                Slot::Kind(kind) => {
                    self.kinds.insert(kind, Arc::clone(&handler));
                }
            }
        }
        Ok(())
    }

    /// Registers the default handler, replacing any previous one.
    pub fn add_default<F>(&mut self, handler: F)
    where
        F: Fn(&S, &mut RequestContext, &ErrorReport) -> ZephyrResult<()> + Send + Sync + 'static,
    {
        self.default = Some(Arc::new(handler));
    }

    /// Dispatches an error or a literal message.
    ///
    /// `code` is used for literal messages; errors carry their own. When the
    /// code has a standard phrase, the response status is set to it.
    ///
    /// A resolved handler that fails or panics is logged and replaced by the
    /// built-in renderer. A layout that panics is replaced by the standalone
    /// document. Nothing unwinds out of this call.
    pub fn dispatch_error(
        &self,
        state: &S,
        ctx: &mut RequestContext,
        payload: impl Into<ErrorPayload>,
        code: u16,
        options: RenderOptions<'_>,
    ) -> Resolution {
        let report = ErrorReport::new(&payload.into(), code);
        tracing::warn!(
            error.kind = report.kind.as_deref().unwrap_or("message"),
            error.code = report.code,
            error.message = %report.message,
            "dispatching error"
        );

        if phrase_for(report.code).is_some() {
            if let Ok(status) = StatusCode::from_u16(report.code) {
                ctx.set_status(status);
            }
        }

        if let Some((resolution, handler)) = self.resolve(&report) {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(state, ctx, &report))) {
                Ok(Ok(())) => return resolution,
                Ok(Err(error)) => {
                    tracing::error!(
                        resolution = ?resolution,
                        error = %error,
                        "error handler failed, falling back to built-in page"
                    );
                }
                Err(_) => {
                    tracing::error!(
                        resolution = ?resolution,
                        "error handler panicked, falling back to built-in page"
                    );
                }
            }
        }

        let page = panic::catch_unwind(AssertUnwindSafe(|| render(&report, options)))
            .unwrap_or_else(|_| {
                tracing::error!("error layout panicked, rendering standalone page");
                render_document(&render_fragment(&report, options.backtrace))
            });
        ctx.write(&page);
        Resolution::BuiltIn
    }

    /// Dispatches a dynamically typed payload.
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::InvalidPayload`](zephyr_core::ZephyrError::InvalidPayload)
    /// if `payload` is neither a message nor an error.
    pub fn dispatch_any(
        &self,
        state: &S,
        ctx: &mut RequestContext,
        payload: Box<dyn Any + Send>,
        code: u16,
        options: RenderOptions<'_>,
    ) -> ZephyrResult<Resolution> {
        let payload = ErrorPayload::from_any(payload)?;
        Ok(self.dispatch_error(state, ctx, payload, code, options))
    }

    fn resolve(&self, report: &ErrorReport) -> Option<(Resolution, &ErrorHandler<S>)> {
        if let Some(handler) = self.codes.get(&report.code) {
            return Some((Resolution::Code(report.code), handler));
        }
        if let Some((kind, handler)) = report
            .kind
            .as_deref()
            .and_then(|kind| self.kinds.get_key_value(kind))
        {
            return Some((Resolution::Kind(kind.clone()), handler));
        }
        self.default
            .as_ref()
            .map(|handler| (Resolution::Default, handler))
    }

    /// Returns `true` if a handler is registered for `code`.
    #[must_use]
    pub fn has_code(&self, code: u16) -> bool {
        self.codes.contains_key(&code)
    }

    /// Returns `true` if a handler is registered for `kind`.
    #[must_use]
    pub fn has_kind(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Returns `true` if a default handler is registered.
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Sets whether the host should halt after an error was dispatched.
    pub fn set_exit(&mut self, exit: bool) {
        self.exit = exit;
    }

    /// Returns whether the host should halt after an error was dispatched.
    #[must_use]
    pub const fn get_exit(&self) -> bool {
        self.exit
    }
}
