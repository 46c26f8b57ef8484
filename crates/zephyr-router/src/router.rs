//! The route table and matcher.
//!
//! Routes are kept in registration order and scanned linearly. Registration
//! order is the only tie-break; there is no specificity scoring. A handler
//! that returns [`Flow::Pass`] hands the request to the next candidate.

use http::Method;
use std::fmt;
use std::sync::Arc;
use zephyr_core::{Flow, HandlerResult, RequestContext, ZephyrResult};

use crate::captures::Captures;
use crate::pattern::PathPattern;
use crate::verb::Verb;

/// A type-erased route handler.
///
/// `S` is the state handed to every handler, typically the application that
/// owns the router.
pub type RouteHandler<S> =
    Arc<dyn Fn(&S, &mut RequestContext, &Captures) -> HandlerResult + Send + Sync>;

/// A registered route.
pub struct Route<S> {
    verb: Verb,
    pattern: PathPattern,
    handler: RouteHandler<S>,
    order: usize,
}

impl<S> Route<S> {
    /// Returns the route verb.
    #[must_use]
    pub const fn verb(&self) -> Verb {
        self.verb
    }

    /// Returns the route pattern.
    #[must_use]
    pub const fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Returns the registration order (0-based).
    #[must_use]
    pub const fn order(&self) -> usize {
        self.order
    }
}

impl<S> Clone for Route<S> {
    fn clone(&self) -> Self {
        Self {
            verb: self.verb,
            pattern: self.pattern.clone(),
            handler: Arc::clone(&self.handler),
            order: self.order,
        }
    }
}

impl<S> fmt::Debug for Route<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("verb", &self.verb)
            .field("pattern", &self.pattern)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// Outcome of a dispatch that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The route with this order accepted the request.
    Handled {
        /// Registration order of the accepting route.
        order: usize,
    },
    /// No route both matched and accepted the request.
    NotFound,
}

impl Dispatch {
    /// Returns `true` if a route accepted the request.
    #[must_use]
    pub const fn is_handled(self) -> bool {
        matches!(self, Self::Handled { .. })
    }
}

/// An ordered route table.
///
/// # Example
///
/// ```rust
/// use zephyr_core::{Flow, RequestContext};
/// use zephyr_router::{Dispatch, Router, Verb};
/// use http::Method;
///
/// let mut router: Router = Router::new();
/// router
///     .register(Verb::Get, r"/admin/posts/(?<id>\d+)", |_, ctx, captures| {
///         ctx.write(&captures["id"]);
///         Ok(Flow::Continue)
///     })
///     .unwrap();
///
/// let mut ctx = RequestContext::new(Method::GET, "/admin/posts/5");
/// assert!(router.dispatch(&(), &mut ctx).unwrap().is_handled());
/// assert_eq!(ctx.output(), "5");
///
/// let mut ctx = RequestContext::new(Method::GET, "/admin/posts/abc");
/// assert_eq!(router.dispatch(&(), &mut ctx).unwrap(), Dispatch::NotFound);
/// ```
pub struct Router<S = ()> {
    routes: Vec<Route<S>>,
}

impl<S> Default for Router<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for Router<S> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.clone(),
        }
    }
}

impl<S> fmt::Debug for Router<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("routes", &self.routes).finish()
    }
}

impl<S> Router<S> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registers a route for `pattern` and returns its order.
    ///
    /// `(verb, pattern)` need not be unique.
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::InvalidPattern`](zephyr_core::ZephyrError::InvalidPattern)
    /// if the path is a regular expression that does not compile.
    pub fn register<F>(&mut self, verb: Verb, pattern: &str, handler: F) -> ZephyrResult<usize>
    where
        F: Fn(&S, &mut RequestContext, &Captures) -> HandlerResult + Send + Sync + 'static,
    {
        let pattern = PathPattern::parse(pattern)?;
        Ok(self.register_pattern(verb, pattern, Arc::new(handler)))
    }

    /// Registers a route with an already-compiled pattern.
    pub fn register_pattern(
        &mut self,
        verb: Verb,
        pattern: PathPattern,
        handler: RouteHandler<S>,
    ) -> usize {
        let order = self.routes.len();
        tracing::debug!(verb = %verb, pattern = %pattern, order, "route registered");
        self.routes.push(Route {
            verb,
            pattern,
            handler,
            order,
        });
        order
    }

    /// Dispatches the context's own method and path.
    pub fn dispatch(&self, state: &S, ctx: &mut RequestContext) -> ZephyrResult<Dispatch> {
        let method = ctx.method().clone();
        let path = ctx.path().to_owned();
        self.dispatch_as(state, ctx, &method, &path)
    }

    /// Dispatches an explicit method and path inside `ctx`.
    ///
    /// This is the synthetic entry point used for internal forwarding: the
    /// matched handler writes into `ctx` whatever path was requested.
    ///
    /// Candidates are tried in registration order. A handler returning
    /// [`Flow::Pass`] moves matching on to the next candidate; any error is
    /// returned unchanged.
    pub fn dispatch_as(
        &self,
        state: &S,
        ctx: &mut RequestContext,
        method: &Method,
        path: &str,
    ) -> ZephyrResult<Dispatch> {
        for route in &self.routes {
            if !route.verb.matches(method) {
                continue;
            }
            let Some(captures) = route.pattern.matches(path) else {
                continue;
            };

            match (route.handler)(state, ctx, &captures)? {
                Flow::Continue => {
                    tracing::trace!(order = route.order, pattern = %route.pattern, "route handled");
                    return Ok(Dispatch::Handled { order: route.order });
                }
                Flow::Pass => {
                    tracing::trace!(order = route.order, pattern = %route.pattern, "route passed");
                }
            }
        }

        tracing::debug!(method = %method, path, "no route matched");
        Ok(Dispatch::NotFound)
    }

    /// Returns the routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Route<S>] {
        &self.routes
    }

    /// Returns the number of routes registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use zephyr_core::{AppError, ZephyrError};

    fn echo(text: &'static str) -> impl Fn(&(), &mut RequestContext, &Captures) -> HandlerResult {
        move |_, ctx, _| {
            ctx.write(text);
            Ok(Flow::Continue)
        }
    }

    fn run(router: &Router, method: Method, path: &str) -> (Dispatch, String) {
        let mut ctx = RequestContext::new(method, path);
        let dispatch = router.dispatch(&(), &mut ctx).unwrap();
        (dispatch, ctx.take_output())
    }

    #[test]
    fn test_router_new() {
        let router: Router = Router::new();
        assert!(router.is_empty());
        assert_eq!(router.len(), 0);
    }

    #[test]
    fn test_register_assigns_increasing_order() {
        let mut router: Router = Router::new();
        assert_eq!(router.register(Verb::Get, "/a", echo("a")).unwrap(), 0);
        assert_eq!(router.register(Verb::Get, "/a", echo("b")).unwrap(), 1);
        assert_eq!(router.len(), 2);
        assert_eq!(router.routes()[1].order(), 1);
    }

    #[test]
    fn test_register_rejects_bad_regex() {
        let mut router: Router = Router::new();
        let err = router
            .register(Verb::Get, r"/posts/(?<id>\d+", echo("x"))
            .unwrap_err();
        assert!(matches!(err, ZephyrError::InvalidPattern { .. }));
        assert!(router.is_empty());
    }

    #[test]
    fn test_literal_match() {
        let mut router: Router = Router::new();
        router.register(Verb::Get, "/admin/posts", echo("index")).unwrap();

        assert_eq!(
            run(&router, Method::GET, "/admin/posts"),
            (Dispatch::Handled { order: 0 }, "index".to_string())
        );
        assert_eq!(run(&router, Method::GET, "/admin/posts/").0, Dispatch::NotFound);
    }

    #[test]
    fn test_capture_reaches_handler() {
        let mut router: Router = Router::new();
        router
            .register(Verb::Get, r"/admin/posts/(?<id>\d+)", |_, ctx, captures| {
                ctx.write(&captures["id"]);
                Ok(Flow::Continue)
            })
            .unwrap();

        assert_eq!(run(&router, Method::GET, "/admin/posts/5").1, "5");
        assert_eq!(run(&router, Method::GET, "/admin/posts/abc").0, Dispatch::NotFound);
    }

    #[test]
    fn test_method_filtering() {
        let mut router: Router = Router::new();
        router.register(Verb::Post, "/admin/posts", echo("create")).unwrap();

        assert_eq!(run(&router, Method::GET, "/admin/posts").0, Dispatch::NotFound);
        assert_eq!(run(&router, Method::POST, "/admin/posts").1, "create");
    }

    #[test]
    fn test_any_matches_every_method() {
        let mut router: Router = Router::new();
        router.register(Verb::Any, "/ping", echo("pong")).unwrap();

        for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
            assert_eq!(run(&router, method, "/ping").1, "pong");
        }
    }

    #[test]
    fn test_first_registered_wins() {
        let mut router: Router = Router::new();
        router.register(Verb::Get, r"/posts/(?<id>.+)", echo("generic")).unwrap();
        router.register(Verb::Get, "/posts/new", echo("new")).unwrap();

        assert_eq!(
            run(&router, Method::GET, "/posts/new"),
            (Dispatch::Handled { order: 0 }, "generic".to_string())
        );
    }

    #[test]
    fn test_pass_moves_to_next_candidate() {
        let mut router: Router = Router::new();
        router
            .register(Verb::Any, r";^/admin/posts/(?<id>\d+);", |_, ctx, captures| {
                ctx.write(&format!("load {};", &captures["id"]));
                Ok(Flow::Pass)
            })
            .unwrap();
        router
            .register(Verb::Get, r";^/admin/posts/(?<id>\d+)/edit$;", echo("edit"))
            .unwrap();

        assert_eq!(
            run(&router, Method::GET, "/admin/posts/7/edit"),
            (Dispatch::Handled { order: 1 }, "load 7;edit".to_string())
        );
    }

    #[test]
    fn test_all_candidates_pass_is_not_found() {
        let mut router: Router = Router::new();
        router.register(Verb::Get, "/a", |_, _, _| Ok(Flow::Pass)).unwrap();
        router.register(Verb::Get, "/a", |_, _, _| Ok(Flow::Pass)).unwrap();

        assert_eq!(run(&router, Method::GET, "/a").0, Dispatch::NotFound);
    }

    #[test]
    fn test_errors_propagate_unchanged_and_stop_matching() {
        let reached = Arc::new(AtomicUsize::new(0));
        let mut router: Router = Router::new();
        router
            .register(Verb::Get, "/boom", |_, _, _| {
                Err(AppError::new("Exception", "Something bad happened").into())
            })
            .unwrap();
        let counter = Arc::clone(&reached);
        router
            .register(Verb::Get, "/boom", move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Flow::Continue)
            })
            .unwrap();

        let mut ctx = RequestContext::new(Method::GET, "/boom");
        let err = router.dispatch(&(), &mut ctx).unwrap_err();
        assert_eq!(err.kind_name(), "Exception");
        assert_eq!(err.to_string(), "Something bad happened");
        assert_eq!(reached.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dispatch_as_uses_explicit_path() {
        let mut router: Router = Router::new();
        router.register(Verb::Get, "/admin/posts", echo("index")).unwrap();

        let mut ctx = RequestContext::new(Method::GET, "/admin");
        let dispatch = router
            .dispatch_as(&(), &mut ctx, &Method::GET, "/admin/posts")
            .unwrap();
        assert!(dispatch.is_handled());
        assert_eq!(ctx.output(), "index");
        assert_eq!(ctx.path(), "/admin");
    }

    #[test]
    fn test_state_is_passed_to_handlers() {
        struct Blog {
            title: &'static str,
        }

        let mut router: Router<Blog> = Router::new();
        router
            .register(Verb::Get, "/", |blog: &Blog, ctx, _| {
                ctx.write(blog.title);
                Ok(Flow::Continue)
            })
            .unwrap();

        let mut ctx = RequestContext::new(Method::GET, "/");
        router.dispatch(&Blog { title: "My Blog" }, &mut ctx).unwrap();
        assert_eq!(ctx.output(), "My Blog");
    }

    #[test]
    fn test_router_clone_shares_handlers() {
        let mut router: Router = Router::new();
        router.register(Verb::Get, "/a", echo("a")).unwrap();

        let cloned = router.clone();
        assert_eq!(run(&cloned, Method::GET, "/a").1, "a");
        assert!(format!("{cloned:?}").contains("Literal(\"/a\")"));
    }
}
