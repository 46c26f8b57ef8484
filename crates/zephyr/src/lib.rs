//! # Zephyr
//!
//! **A minimalist request-dispatch engine**
//!
//! Applications are assembled from small registrations:
//!
//! - **Routes** matched in registration order, with named captures and a
//!   "try the next candidate" outcome ([`Flow::Pass`](zephyr_core::Flow::Pass))
//! - **Conditions** evaluated as guards inside route handlers
//! - **Before and after filters** run around every request
//! - **Error handlers** selected by code, kind name or default, with a
//!   built-in HTML page as the last resort
//!
//! ## Quick Start
//!
//! ```rust
//! use zephyr::prelude::*;
//!
//! let mut app = Application::new();
//! app.set_exit(false);
//!
//! app.before(None, |_, ctx| {
//!     ctx.write("<main>");
//!     Ok(())
//! })
//! .unwrap();
//! app.after(None, |_, ctx| {
//!     ctx.write("</main>");
//!     Ok(())
//! })
//! .unwrap();
//!
//! app.get(r"/posts/(?<id>\d+)", |_, ctx, captures| {
//!     ctx.write(&format!("post {}", &captures["id"]));
//!     Ok(Flow::Continue)
//! })
//! .unwrap();
//!
//! app.error(404, |_, ctx, report| {
//!     ctx.write(&report.message);
//!     Ok(())
//! })
//! .unwrap();
//!
//! assert_eq!(app.dispatch(Method::GET, "/posts/7").body, "<main>post 7</main>");
//! assert_eq!(app.dispatch(Method::GET, "/posts").body, "<main>404 - Not Found</main>");
//! ```
//!
//! ## Request lifecycle
//!
//! ```text
//! Request → before filters → router ─► handler → after filters → Response
//!                                  └─ Pass → next candidate
//! any error or panic ──────────────────────► error registry
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod builder;
mod view;

pub use app::{Application, Filter, Helper, AFTER, BEFORE, BUILTIN_HELPERS};
pub use builder::{ApplicationBuilder, Plugin, SETTINGS_DEPENDENCY, VIEW_DEPENDENCY};
pub use view::{NullView, TemplateVars, View};

// Re-export the member crates
pub use zephyr_config as config;
pub use zephyr_core as core;
pub use zephyr_errors as errors;
pub use zephyr_router as router;
pub use zephyr_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use zephyr::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Application, ApplicationBuilder, NullView, Plugin, TemplateVars, View};

    pub use zephyr_core::{
        guard, AppError, Flow, HandlerResult, RequestContext, Response, ZephyrError, ZephyrResult,
    };

    pub use zephyr_router::{Captures, Dispatch, Verb};

    pub use zephyr_errors::{ErrorMatcher, ErrorReport, Resolution};

    pub use zephyr_config::{ConfigLoader, Settings};

    pub use http::{Method, StatusCode};
}
