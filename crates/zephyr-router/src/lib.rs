//! Route table, path matcher and condition guards for Zephyr.
//!
//! Routes are matched by linear scan in registration order. There is no
//! specificity scoring: the first route whose verb and pattern match and
//! whose handler does not pass wins.
//!
//! # Features
//!
//! - **Literal paths**: byte-for-byte equality (`/admin/posts`)
//! - **Capturing patterns**: anchored regular expressions with named groups
//!   (`/admin/posts/(?<id>\d+)`)
//! - **Delimited patterns**: regular expressions used as written
//!   (`;^/admin/posts/(?<id>\d+);`), for prefix routes that run and pass
//! - **Guards**: named conditions evaluated from inside handlers
//!
//! # Example
//!
//! ```rust
//! use zephyr_core::{guard, Flow, RequestContext};
//! use zephyr_router::{Conditions, Dispatch, Router, Verb};
//! use http::{header::HOST, Method};
//!
//! let mut router: Router<Conditions> = Router::new();
//!
//! router
//!     .register(Verb::Get, "/", |conditions: &Conditions, ctx, _| {
//!         guard!(conditions.dispatch_condition(ctx, "host_name_is", &["admin.local"]));
//!         ctx.write("admin home");
//!         Ok(Flow::Continue)
//!     })
//!     .unwrap();
//! router
//!     .register(Verb::Get, "/", |_: &Conditions, ctx, _| {
//!         ctx.write("home");
//!         Ok(Flow::Continue)
//!     })
//!     .unwrap();
//!
//! let conditions = Conditions::new();
//! let mut ctx = RequestContext::new(Method::GET, "/").header(HOST, "www.local");
//! assert_eq!(router.dispatch(&conditions, &mut ctx).unwrap(), Dispatch::Handled { order: 1 });
//! assert_eq!(ctx.output(), "home");
//! ```

mod captures;
mod conditions;
mod pattern;
mod router;
mod verb;

pub use captures::Captures;
pub use conditions::{Conditions, Predicate, HOST_NAME_IS, USER_AGENT_MATCHES};
pub use pattern::{compile_delimited, compile_guard, PathPattern};
pub use router::{Dispatch, Route, RouteHandler, Router};
pub use verb::Verb;
