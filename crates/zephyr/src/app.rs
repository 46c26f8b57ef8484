//! The dispatch orchestrator.
//!
//! An [`Application`] owns every registry a request touches: routes,
//! conditions, before and after filters, helpers and error handlers. It is
//! populated during bootstrap and only read while serving, so a fully built
//! application can be shared across threads.
//!
//! ```text
//! run ─► before filters ─► router ─► after filters ─► Response
//!                │            │
//!                └── error ───┴──► error registry
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use http::header::{HeaderValue, LOCATION};
use http::{Method, StatusCode};
use serde_json::Value;
use zephyr_config::Settings;
use zephyr_core::{
    ClosureChain, Flow, HandlerResult, RequestContext, Response, ZephyrError, ZephyrResult,
};
use zephyr_errors::{
    message_for_code, ErrorMatcher, ErrorPayload, ErrorRegistry, ErrorReport, RenderOptions,
    Resolution,
};
use zephyr_router::{Captures, Conditions, Dispatch, Router, Verb};
use zephyr_telemetry::{log_request_complete, log_request_error, log_request_start};

use crate::builder::ApplicationBuilder;
use crate::view::{NullView, TemplateVars, View, ViewLayout};

/// Name of the filter stage run before routing.
pub const BEFORE: &str = "before";

/// Name of the filter stage run after routing.
pub const AFTER: &str = "after";

/// Application verbs reported by [`Application::helpers`] after the
/// registered helper names.
pub const BUILTIN_HELPERS: [&str; 18] = [
    "get", "delete", "put", "post", "any", "before", "after", "config", "template", "display",
    "fetch", "pass", "helper", "run", "error", "condition", "redirect", "partial",
];

/// A before or after filter.
pub type Filter = Arc<dyn Fn(&Application, &mut RequestContext) -> ZephyrResult<()> + Send + Sync>;

/// A named helper.
pub type Helper =
    Arc<dyn Fn(&Application, &mut RequestContext, &[Value]) -> ZephyrResult<Value> + Send + Sync>;

enum Failure {
    Error(ZephyrError),
    Panic(Box<dyn Any + Send>),
}

// Why a lifecycle stage stopped early.
enum Interrupted {
    NotFound,
    Failed(Failure),
}

impl From<ZephyrError> for Interrupted {
    fn from(error: ZephyrError) -> Self {
        Self::Failed(Failure::Error(error))
    }
}

/// The dispatch orchestrator.
///
/// # Example
///
/// ```rust
/// use zephyr::prelude::*;
///
/// let mut app = Application::new();
/// app.set_exit(false);
/// app.get(r"/admin/posts/(?<id>\d+)", |_, ctx, captures| {
///     ctx.write(&captures["id"]);
///     Ok(Flow::Continue)
/// })
/// .unwrap();
///
/// let response = app.dispatch(Method::GET, "/admin/posts/5");
/// assert_eq!(response.body, "5");
///
/// let response = app.dispatch(Method::GET, "/admin/posts/abc");
/// assert_eq!(response.status, StatusCode::NOT_FOUND);
/// ```
pub struct Application {
    router: Router<Application>,
    conditions: Conditions,
    before: ClosureChain<Filter>,
    after: ClosureChain<Filter>,
    helpers: ClosureChain<Helper>,
    errors: ErrorRegistry<Application>,
    settings: Settings,
    view: Box<dyn View>,
    vars: TemplateVars,
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("routes", &self.router.len())
            .field("conditions", &self.conditions)
            .field("before", &self.before.names().collect::<Vec<_>>())
            .field("after", &self.after.names().collect::<Vec<_>>())
            .field("helpers", &self.helpers.names().collect::<Vec<_>>())
            .field("errors", &self.errors)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Application {
    /// Creates an application with default settings and no view engine.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(Settings::default(), Box::new(NullView))
    }

    /// Returns a builder for applications with collaborators and plugins.
    #[must_use]
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    pub(crate) fn with_parts(settings: Settings, view: Box<dyn View>) -> Self {
        let mut errors = ErrorRegistry::new();
        errors.set_exit(settings.errors.exit);

        Self {
            router: Router::new(),
            conditions: Conditions::new(),
            before: ClosureChain::new("filter"),
            after: ClosureChain::new("filter"),
            helpers: ClosureChain::new("helper"),
            errors,
            settings,
            view,
            vars: TemplateVars::new(),
        }
    }

    // ==================== Routes ====================

    /// Registers a route and returns its order.
    pub fn route<F>(&mut self, verb: Verb, pattern: &str, handler: F) -> ZephyrResult<usize>
    where
        F: Fn(&Application, &mut RequestContext, &Captures) -> HandlerResult + Send + Sync + 'static,
    {
        self.router.register(verb, pattern, handler)
    }

    /// Registers a `GET` route.
    pub fn get<F>(&mut self, pattern: &str, handler: F) -> ZephyrResult<usize>
    where
        F: Fn(&Application, &mut RequestContext, &Captures) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Verb::Get, pattern, handler)
    }

    /// Registers a `POST` route.
    pub fn post<F>(&mut self, pattern: &str, handler: F) -> ZephyrResult<usize>
    where
        F: Fn(&Application, &mut RequestContext, &Captures) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Verb::Post, pattern, handler)
    }

    /// Registers a `PUT` route.
    pub fn put<F>(&mut self, pattern: &str, handler: F) -> ZephyrResult<usize>
    where
        F: Fn(&Application, &mut RequestContext, &Captures) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Verb::Put, pattern, handler)
    }

    /// Registers a `DELETE` route.
    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> ZephyrResult<usize>
    where
        F: Fn(&Application, &mut RequestContext, &Captures) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Verb::Delete, pattern, handler)
    }

    /// Registers a route for every method.
    pub fn any<F>(&mut self, pattern: &str, handler: F) -> ZephyrResult<usize>
    where
        F: Fn(&Application, &mut RequestContext, &Captures) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Verb::Any, pattern, handler)
    }

    /// Returns the route table.
    #[must_use]
    pub const fn router(&self) -> &Router<Application> {
        &self.router
    }

    /// The skip signal as a handler result: try the next candidate route.
    pub const fn pass() -> HandlerResult {
        Ok(Flow::Pass)
    }

    // ==================== Request lifecycle ====================

    /// Runs a synthetic request through the full lifecycle.
    pub fn dispatch(&self, method: Method, path: &str) -> Response {
        self.run(RequestContext::new(method, path))
    }

    /// Runs a request through the full lifecycle.
    ///
    /// Before filters, routing and after filters run in that order. Any
    /// error or panic is handed to the error registry; after filters run on
    /// that branch too. A request no route accepted is dispatched as a 404.
    pub fn run(&self, mut ctx: RequestContext) -> Response {
        let span = tracing::info_span!(
            "dispatch",
            request_id = %ctx.request_id(),
            http.method = %ctx.method(),
            http.path = %ctx.path(),
        );
        let _enter = span.enter();
        let start = Instant::now();
        log_request_start!(ctx.request_id(), ctx.method(), ctx.path());

        let mut halted = false;

        let routed = self.guarded(&mut ctx, |app, ctx| {
            app.run_filters(ctx, BEFORE)?;
            match app.router.dispatch(app, ctx)? {
                Dispatch::Handled { order } => {
                    tracing::debug!(route.order = order, "request handled");
                }
                Dispatch::NotFound => {
                    app.error_code(ctx, 404);
                    return Err(Interrupted::NotFound);
                }
            }
            Ok(())
        });
        match routed {
            Ok(()) => {}
            Err(Interrupted::NotFound) => halted = self.errors.get_exit(),
            Err(Interrupted::Failed(failure)) => halted |= self.fail(&mut ctx, failure),
        }

        if let Err(Interrupted::Failed(failure)) =
            self.guarded(&mut ctx, |app, ctx| Ok(app.run_filters(ctx, AFTER)?))
        {
            halted |= self.fail(&mut ctx, failure);
        }

        let status = ctx.status().unwrap_or(StatusCode::OK).as_u16();
        let duration_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        log_request_complete!(ctx.request_id(), status, duration_us);

        ctx.into_response(halted)
    }

    /// Re-enters the router with another method and path inside the current
    /// request.
    pub fn forward(
        &self,
        ctx: &mut RequestContext,
        method: &Method,
        path: &str,
    ) -> ZephyrResult<Dispatch> {
        tracing::debug!(http.method = %method, http.path = path, "forwarding request");
        self.router.dispatch_as(self, ctx, method, path)
    }

    fn guarded<F>(&self, ctx: &mut RequestContext, stage: F) -> Result<(), Interrupted>
    where
        F: FnOnce(&Self, &mut RequestContext) -> Result<(), Interrupted>,
    {
        match panic::catch_unwind(AssertUnwindSafe(|| stage(self, ctx))) {
            Ok(outcome) => outcome,
            Err(payload) => Err(Interrupted::Failed(Failure::Panic(payload))),
        }
    }

    fn fail(&self, ctx: &mut RequestContext, failure: Failure) -> bool {
        let payload = match failure {
            Failure::Error(error) => {
                log_request_error!(ctx.request_id(), error);
                ErrorPayload::from(error)
            }
            Failure::Panic(payload) => {
                tracing::error!(request_id = %ctx.request_id(), "handler panicked");
                ErrorPayload::from_panic(payload).unwrap_or_else(ErrorPayload::from)
            }
        };
        self.dispatch_error(ctx, payload, 0);
        self.errors.get_exit()
    }

    // ==================== Filters ====================

    /// Appends a before filter and returns the name it was stored under.
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::InvalidName`] if `name` is `Some("")`.
    pub fn before<F>(&mut self, name: Option<&str>, filter: F) -> ZephyrResult<String>
    where
        F: Fn(&Application, &mut RequestContext) -> ZephyrResult<()> + Send + Sync + 'static,
    {
        self.before
            .add(name, Arc::new(filter), None)
            .map(ToString::to_string)
    }

    /// Appends an after filter and returns the name it was stored under.
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::InvalidName`] if `name` is `Some("")`.
    pub fn after<F>(&mut self, name: Option<&str>, filter: F) -> ZephyrResult<String>
    where
        F: Fn(&Application, &mut RequestContext) -> ZephyrResult<()> + Send + Sync + 'static,
    {
        self.after
            .add(name, Arc::new(filter), None)
            .map(ToString::to_string)
    }

    /// Returns the before filters.
    #[must_use]
    pub const fn before_filters(&self) -> &ClosureChain<Filter> {
        &self.before
    }

    /// Returns the after filters.
    #[must_use]
    pub const fn after_filters(&self) -> &ClosureChain<Filter> {
        &self.after
    }

    /// Runs every filter of `stage` (`"before"` or `"after"`) in insertion
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::UnknownFilter`] for any other stage name, or
    /// the first error a filter fails with.
    pub fn run_filters(&self, ctx: &mut RequestContext, stage: &str) -> ZephyrResult<()> {
        let chain = match stage {
            BEFORE => &self.before,
            AFTER => &self.after,
            other => return Err(ZephyrError::unknown_filter(other)),
        };
        chain.run_all(|entry| (entry.handler())(self, ctx))
    }

    // ==================== Conditions ====================

    /// Registers a condition, replacing any previous one with that name.
    pub fn condition<F>(&mut self, name: &str, predicate: F) -> ZephyrResult<()>
    where
        F: Fn(&RequestContext, &[&str]) -> ZephyrResult<bool> + Send + Sync + 'static,
    {
        self.conditions.add(name, predicate)
    }

    /// Evaluates a condition; use with [`guard!`](zephyr_core::guard) inside
    /// a route handler.
    pub fn dispatch_condition(
        &self,
        ctx: &RequestContext,
        name: &str,
        args: &[&str],
    ) -> ZephyrResult<Flow> {
        self.conditions.dispatch_condition(ctx, name, args)
    }

    /// Returns the condition registry.
    #[must_use]
    pub const fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    // ==================== Errors ====================

    /// Registers an error handler for a code, code range, kind name, set of
    /// kind names, or [`ErrorMatcher::Default`].
    pub fn error<M, F>(&mut self, matcher: M, handler: F) -> ZephyrResult<()>
    where
        M: Into<ErrorMatcher>,
        F: Fn(&Application, &mut RequestContext, &ErrorReport) -> ZephyrResult<()>
            + Send
            + Sync
            + 'static,
    {
        self.errors.add(matcher, handler)
    }

    /// Dispatches an error or a literal message carrying `code`.
    pub fn dispatch_error(
        &self,
        ctx: &mut RequestContext,
        payload: impl Into<ErrorPayload>,
        code: u16,
    ) -> Resolution {
        let layout = ViewLayout(self.view.as_ref());
        let options = RenderOptions {
            backtrace: self.settings.errors.backtrace,
            layout: Some(&layout),
        };
        self.errors.dispatch_error(self, ctx, payload, code, options)
    }

    /// Dispatches the standard message for `code`.
    ///
    /// The message is `"{code} - {phrase}"` for codes with a standard
    /// phrase and `"An Error Occurred."` otherwise.
    pub fn error_code(&self, ctx: &mut RequestContext, code: u16) -> Resolution {
        self.dispatch_error(ctx, message_for_code(code), code)
    }

    /// Sets whether responses produced by the error boundary ask the host
    /// to halt.
    pub fn set_exit(&mut self, exit: bool) {
        self.errors.set_exit(exit);
    }

    /// Returns whether responses produced by the error boundary ask the
    /// host to halt.
    #[must_use]
    pub fn get_exit(&self) -> bool {
        self.errors.get_exit()
    }

    /// Returns the error registry.
    #[must_use]
    pub const fn errors(&self) -> &ErrorRegistry<Application> {
        &self.errors
    }

    // ==================== Helpers ====================

    /// Registers a named helper.
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::InvalidName`] if `name` is empty.
    pub fn helper<F>(&mut self, name: &str, helper: F) -> ZephyrResult<()>
    where
        F: Fn(&Application, &mut RequestContext, &[Value]) -> ZephyrResult<Value>
            + Send
            + Sync
            + 'static,
    {
        self.helpers.add(Some(name), Arc::new(helper), None)?;
        Ok(())
    }

    /// Calls the helper registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::UnknownHelper`] if no helper has that name,
    /// or whatever the helper fails with.
    pub fn call_helper(
        &self,
        ctx: &mut RequestContext,
        name: &str,
        args: &[Value],
    ) -> ZephyrResult<Value> {
        let helper = self
            .helpers
            .get(name)
            .ok_or_else(|| ZephyrError::unknown_helper(name))?;
        helper(self, ctx, args)
    }

    /// Returns the registered helper names followed by the application's
    /// own verbs.
    #[must_use]
    pub fn helpers(&self) -> Vec<&str> {
        self.helpers
            .all()
            .into_keys()
            .chain(BUILTIN_HELPERS)
            .collect()
    }

    // ==================== Responses ====================

    /// Sets a `Location` header and a redirect status (302 by default).
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::InvalidPayload`] if `url` is not a valid
    /// header value or `status` is not a valid status code.
    pub fn redirect(
        &self,
        ctx: &mut RequestContext,
        url: &str,
        status: Option<u16>,
    ) -> ZephyrResult<()> {
        let location = HeaderValue::from_str(url)
            .map_err(|e| ZephyrError::invalid_payload(format!("invalid redirect url: {e}")))?;
        let status = StatusCode::from_u16(status.unwrap_or(302))
            .map_err(|e| ZephyrError::invalid_payload(format!("invalid redirect status: {e}")))?;

        ctx.set_header(LOCATION, location);
        ctx.set_status(status);
        Ok(())
    }

    // ==================== View ====================

    /// Renders `template` and wraps it in the layout when one exists.
    ///
    /// `vars` take precedence over application variables.
    pub fn fetch(&self, template: &str, vars: &TemplateVars) -> ZephyrResult<String> {
        let contents = self.partial(template, vars)?;
        if self.view.layout_exists() {
            self.view.fetch_layout(&contents)
        } else {
            Ok(contents)
        }
    }

    /// Renders `template` without the layout.
    pub fn partial(&self, template: &str, vars: &TemplateVars) -> ZephyrResult<String> {
        let mut merged = self.vars.clone();
        merged.extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.view.fetch(template, &merged)
    }

    /// Writes the output of [`Application::fetch`] to the request.
    pub fn display(
        &self,
        ctx: &mut RequestContext,
        template: &str,
        vars: &TemplateVars,
    ) -> ZephyrResult<()> {
        let page = self.fetch(template, vars)?;
        ctx.write(&page);
        Ok(())
    }

    /// Returns `true` if the view has a layout.
    #[must_use]
    pub fn layout_exists(&self) -> bool {
        self.view.layout_exists()
    }

    /// Wraps `contents` in the view's layout.
    pub fn fetch_layout(&self, contents: &str) -> ZephyrResult<String> {
        self.view.fetch_layout(contents)
    }

    /// Sets an application template variable.
    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Returns an application template variable.
    #[must_use]
    pub fn var(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Returns `true` if the template variable is set.
    #[must_use]
    pub fn has_var(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Removes a template variable, returning its value.
    pub fn unset_var(&mut self, name: &str) -> Option<Value> {
        self.vars.shift_remove(name)
    }

    // ==================== Configuration ====================

    /// Returns the settings.
    #[must_use]
    pub const fn config(&self) -> &Settings {
        &self.settings
    }

    /// Returns the settings for modification.
    pub fn config_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::HOST;
    use zephyr_core::{guard, AppError};

    fn app() -> Application {
        let mut app = Application::new();
        app.set_exit(false);
        app
    }

    fn ctx() -> RequestContext {
        RequestContext::new(Method::GET, "/")
    }

    #[test]
    fn test_run_order() {
        let mut app = app();
        app.before(Some("test1"), |_, ctx| {
            ctx.write("before1");
            Ok(())
        })
        .unwrap();
        app.before(Some("test2"), |_, ctx| {
            ctx.write("before2");
            Ok(())
        })
        .unwrap();
        app.after(Some("test1"), |_, ctx| {
            ctx.write("after1");
            Ok(())
        })
        .unwrap();
        app.after(Some("test2"), |_, ctx| {
            ctx.write("after2");
            Ok(())
        })
        .unwrap();
        app.get("/", |_, ctx, _| {
            ctx.write("contents");
            Ok(Flow::Continue)
        })
        .unwrap();

        let response = app.dispatch(Method::GET, "/");
        assert_eq!(response.body, "before1before2contentsafter1after2");
        assert_eq!(response.status, StatusCode::OK);
        assert!(!response.halted);
    }

    #[test]
    fn test_run_filters_by_name() {
        let mut app = app();
        for text in ["test1", "test2"] {
            app.before(None, move |_, ctx| {
                ctx.write(text);
                Ok(())
            })
            .unwrap();
        }

        let mut ctx = ctx();
        app.run_filters(&mut ctx, "before").unwrap();
        assert_eq!(ctx.output(), "test1test2");

        let err = app.run_filters(&mut ctx, "DOES NOT EXIST").unwrap_err();
        assert!(err.to_string().contains("is not a valid filter type"));
    }

    #[test]
    fn test_generated_filter_names() {
        let mut app = app();
        let first = app.before(None, |_, _| Ok(())).unwrap();
        let second = app.before(None, |_, _| Ok(())).unwrap();
        assert_eq!(first, "filter_0");
        assert_eq!(second, "filter_1");
        assert!(app.before_filters().has("filter_1"));
        assert!(matches!(
            app.after(Some(""), |_, _| Ok(())),
            Err(ZephyrError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_run_with_error_dispatches_it() {
        let mut app = app();
        app.get("/", |_, _, _| {
            Err(AppError::new("Exception", "Something bad happened").into())
        })
        .unwrap();
        app.error("Exception", |_, ctx, report| {
            ctx.write(&format!("caught: {}", report.message));
            Ok(())
        })
        .unwrap();

        let response = app.dispatch(Method::GET, "/");
        assert_eq!(response.body, "caught: Something bad happened");
    }

    #[test]
    fn test_after_filters_run_on_error_branch() {
        let mut app = app();
        app.get("/", |_, _, _| Err(AppError::generic("boom").into()))
            .unwrap();
        app.error(ErrorMatcher::Default, |_, ctx, _| {
            ctx.write("error;");
            Ok(())
        })
        .unwrap();
        app.after(None, |_, ctx| {
            ctx.write("after");
            Ok(())
        })
        .unwrap();

        assert_eq!(app.dispatch(Method::GET, "/").body, "error;after");
    }

    #[test]
    fn test_failing_before_filter_skips_routing() {
        let mut app = app();
        app.before(None, |_, _| Err(AppError::generic("denied").with_code(403).into()))
            .unwrap();
        app.get("/", |_, ctx, _| {
            ctx.write("contents");
            Ok(Flow::Continue)
        })
        .unwrap();
        app.error(403, |_, ctx, _| {
            ctx.write("forbidden");
            Ok(())
        })
        .unwrap();

        let response = app.dispatch(Method::GET, "/");
        assert_eq!(response.body, "forbidden");
        assert_eq!(response.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_not_found_dispatches_404() {
        let mut app = app();
        app.error(404, |_, ctx, report| {
            ctx.write(&report.message);
            Ok(())
        })
        .unwrap();

        let response = app.dispatch(Method::GET, "/missing");
        assert_eq!(response.body, "404 - Not Found");
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_halted_follows_exit() {
        let mut app = Application::new();
        assert!(app.get_exit());
        assert!(app.dispatch(Method::GET, "/missing").halted);

        app.set_exit(false);
        assert!(!app.dispatch(Method::GET, "/missing").halted);
    }

    #[test]
    fn test_exit_seeds_from_settings() {
        let mut settings = Settings::default();
        settings.errors.exit = false;
        let app = Application::with_parts(settings, Box::new(NullView));
        assert!(!app.get_exit());
    }

    #[test]
    fn test_panic_is_dispatched() {
        let mut app = app();
        app.get("/", |_, _, _| panic!("handler exploded")).unwrap();
        app.error("panic", |_, ctx, report| {
            ctx.write(&format!("{}:{}", report.message, report.code));
            Ok(())
        })
        .unwrap();

        let response = app.dispatch(Method::GET, "/");
        assert_eq!(response.body, "handler exploded:500");
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_panicking_error_handler_stays_inside_run() {
        let mut app = app();
        app.config_mut().errors.backtrace = false;
        app.get("/", |_, _, _| Err(AppError::generic("boom").into()))
            .unwrap();
        app.error(ErrorMatcher::Default, |_, _, _| panic!("error handler exploded"))
            .unwrap();
        app.after(None, |_, ctx| {
            ctx.write("|after");
            Ok(())
        })
        .unwrap();

        let response = panic::catch_unwind(AssertUnwindSafe(|| app.dispatch(Method::GET, "/")))
            .expect("panic escaped the error boundary");
        assert_eq!(
            response.body,
            "<!DOCTYPE html><html><head><title>An error occurred</title></head><body><h1>boom</h1></body></html>|after"
        );
    }

    #[test]
    fn test_builtin_page_shows_captured_backtrace() {
        let enabled = std::backtrace::Backtrace::capture().status()
            == std::backtrace::BacktraceStatus::Captured;
        let mut app = app();
        app.get("/", |_, _, _| panic!("handler exploded")).unwrap();

        let body = app.dispatch(Method::GET, "/").body;
        assert!(body.contains("<h1>handler exploded</h1>"));
        assert_eq!(body.contains("<pre><code>"), enabled);

        app.config_mut().errors.backtrace = false;
        assert!(!app.dispatch(Method::GET, "/").body.contains("<pre><code>"));
    }

    #[test]
    fn test_guard_through_application() {
        let mut app = app();
        app.get("/", |app, ctx, _| {
            guard!(app.dispatch_condition(ctx, "host_name_is", &["www.test.com"]));
            ctx.write("test host");
            Ok(Flow::Continue)
        })
        .unwrap();
        app.get("/", |_, ctx, _| {
            ctx.write("other host");
            Ok(Flow::Continue)
        })
        .unwrap();

        let matching = RequestContext::new(Method::GET, "/").header(HOST, "www.test.com");
        assert_eq!(app.run(matching).body, "test host");

        let other = RequestContext::new(Method::GET, "/").header(HOST, "www.wontmatch.com");
        assert_eq!(app.run(other).body, "other host");
    }

    #[test]
    fn test_pass() {
        assert_eq!(Application::pass().unwrap(), Flow::Pass);
    }

    #[test]
    fn test_forward() {
        let mut app = app();
        app.get("/old", |app, ctx, _| {
            app.forward(ctx, &Method::GET, "/new")?;
            Ok(Flow::Continue)
        })
        .unwrap();
        app.get("/new", |_, ctx, _| {
            ctx.write(&format!("new page for {}", ctx.path()));
            Ok(Flow::Continue)
        })
        .unwrap();

        assert_eq!(app.dispatch(Method::GET, "/old").body, "new page for /old");
    }

    #[test]
    fn test_redirect() {
        let app = app();
        let mut ctx = ctx();
        app.redirect(&mut ctx, "http://www.example.com/", None).unwrap();
        assert_eq!(ctx.response_headers()[LOCATION], "http://www.example.com/");
        assert_eq!(ctx.status(), Some(StatusCode::FOUND));

        app.redirect(&mut ctx, "/moved", Some(301)).unwrap();
        assert_eq!(ctx.status(), Some(StatusCode::MOVED_PERMANENTLY));

        assert!(app.redirect(&mut ctx, "bad\nurl", None).is_err());
    }

    #[test]
    fn test_helpers() {
        let mut app = app();
        app.helper("test_helper", |_, _, args| {
            let name = args.first().and_then(Value::as_str).unwrap_or_default();
            Ok(Value::from(format!("hello {name}")))
        })
        .unwrap();

        let mut ctx = ctx();
        let greeting = app
            .call_helper(&mut ctx, "test_helper", &[Value::from("test")])
            .unwrap();
        assert_eq!(greeting, "hello test");

        let err = app.call_helper(&mut ctx, "this_will_fail", &[]).unwrap_err();
        assert!(matches!(err, ZephyrError::UnknownHelper { .. }));
        assert!(matches!(
            app.helper("", |_, _, _| Ok(Value::Null)),
            Err(ZephyrError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_helpers_list() {
        let mut app = app();
        app.helper("test1", |_, _, _| Ok(Value::Null)).unwrap();
        app.helper("test2", |_, _, _| Ok(Value::Null)).unwrap();

        let expected = [
            "test1", "test2", "get", "delete", "put", "post", "any", "before", "after", "config",
            "template", "display", "fetch", "pass", "helper", "run", "error", "condition",
            "redirect", "partial",
        ];
        assert_eq!(app.helpers(), expected);
    }

    #[test]
    fn test_error_code_messages() {
        let app = app();

        let mut ctx = ctx();
        assert_eq!(app.error_code(&mut ctx, 404), Resolution::BuiltIn);
        assert!(ctx.output().contains("<h1>404 - Not Found</h1>"));
        assert_eq!(ctx.status(), Some(StatusCode::NOT_FOUND));

        let mut ctx = RequestContext::new(Method::GET, "/");
        app.error_code(&mut ctx, 999);
        assert!(ctx.output().contains("<h1>An Error Occurred.</h1>"));
        assert_eq!(ctx.status(), None);
    }

    #[test]
    fn test_template_vars() {
        let mut app = app();
        app.set_var("this_is_a", "test");
        assert!(app.has_var("this_is_a"));
        assert_eq!(app.var("this_is_a"), Some(&Value::from("test")));
        assert_eq!(app.unset_var("this_is_a"), Some(Value::from("test")));
        assert!(!app.has_var("this_is_a"));
    }

    #[test]
    fn test_config_access() {
        let mut app = app();
        app.config_mut().set("a key", "a value").unwrap();
        assert_eq!(app.config().get_str("a key").as_deref(), Some("a value"));
        assert_eq!(app.config().get_str("view.layout").as_deref(), Some("layout"));
    }

    #[test]
    fn test_application_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Application>();
    }
}
