//! The condition registry.
//!
//! Conditions are named predicates over the current request. They are
//! invoked from inside route handlers as guards: a predicate that returns
//! `false` yields [`Flow::Pass`] and the matcher tries the next candidate.

use crate::pattern::compile_guard;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use zephyr_core::{Flow, RequestContext, ZephyrError, ZephyrResult};

/// A type-erased condition predicate.
pub type Predicate = Arc<dyn Fn(&RequestContext, &[&str]) -> ZephyrResult<bool> + Send + Sync>;

/// Name of the built-in user agent guard.
pub const USER_AGENT_MATCHES: &str = "user_agent_matches";

/// Name of the built-in host guard.
pub const HOST_NAME_IS: &str = "host_name_is";

/// Named predicates used as route guards.
///
/// Two conditions exist from construction:
///
/// - `user_agent_matches(pattern)` accepts when the `User-Agent` header
///   matches `pattern` (delimited like `/firefox/i`, or a bare expression)
/// - `host_name_is(hostname)` accepts when the `Host` header equals
///   `hostname` exactly
///
/// # Example
///
/// ```rust
/// use zephyr_core::{Flow, RequestContext};
/// use zephyr_router::Conditions;
/// use http::{header::HOST, Method};
///
/// let conditions = Conditions::new();
/// let ctx = RequestContext::new(Method::GET, "/").header(HOST, "www.test.com");
///
/// let flow = conditions.dispatch_condition(&ctx, "host_name_is", &["www.test.com"]).unwrap();
/// assert_eq!(flow, Flow::Continue);
///
/// let flow = conditions.dispatch_condition(&ctx, "host_name_is", &["www.wontmatch.com"]).unwrap();
/// assert_eq!(flow, Flow::Pass);
/// ```
#[derive(Clone)]
pub struct Conditions {
    predicates: IndexMap<String, Predicate>,
}

impl Default for Conditions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Conditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conditions")
            .field("names", &self.predicates.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Conditions {
    /// Creates a registry holding the built-in conditions.
    #[must_use]
    pub fn new() -> Self {
        let mut predicates: IndexMap<String, Predicate> = IndexMap::new();
        predicates.insert(USER_AGENT_MATCHES.to_string(), Arc::new(user_agent_matches));
        predicates.insert(HOST_NAME_IS.to_string(), Arc::new(host_name_is));
        Self { predicates }
    }

    /// Creates a registry with no conditions at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            predicates: IndexMap::new(),
        }
    }

    /// Registers a predicate under `name`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::InvalidName`] if `name` is empty.
    pub fn add<F>(&mut self, name: &str, predicate: F) -> ZephyrResult<()>
    where
        F: Fn(&RequestContext, &[&str]) -> ZephyrResult<bool> + Send + Sync + 'static,
    {
        if name.is_empty() {
            return Err(ZephyrError::invalid_name("condition"));
        }
        tracing::debug!(condition = name, "condition registered");
        self.predicates.insert(name.to_string(), Arc::new(predicate));
        Ok(())
    }

    /// Evaluates the condition `name` against the current request.
    ///
    /// Returns [`Flow::Pass`] when the predicate declines.
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::InvalidCondition`] if no condition is
    /// registered under `name`, or whatever the predicate itself fails with.
    pub fn dispatch_condition(
        &self,
        ctx: &RequestContext,
        name: &str,
        args: &[&str],
    ) -> ZephyrResult<Flow> {
        let predicate = self
            .predicates
            .get(name)
            .ok_or_else(|| ZephyrError::invalid_condition(name))?;

        let flow = Flow::from_bool(predicate(ctx, args)?);
        if flow.is_pass() {
            tracing::trace!(condition = name, "condition declined");
        }
        Ok(flow)
    }

    /// Returns `true` if a condition is registered under `name`.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Returns the registered condition names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.predicates.keys().map(String::as_str)
    }

    /// Returns the number of registered conditions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Returns `true` if no conditions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

fn first_arg<'a>(condition: &str, args: &[&'a str]) -> ZephyrResult<&'a str> {
    args.first().copied().ok_or_else(|| {
        ZephyrError::invalid_payload(format!("`{condition}` expects one argument"))
    })
}

fn user_agent_matches(ctx: &RequestContext, args: &[&str]) -> ZephyrResult<bool> {
    let pattern = compile_guard(first_arg(USER_AGENT_MATCHES, args)?)?;
    Ok(ctx.user_agent().is_some_and(|agent| pattern.is_match(agent)))
}

fn host_name_is(ctx: &RequestContext, args: &[&str]) -> ZephyrResult<bool> {
    let expected = first_arg(HOST_NAME_IS, args)?;
    Ok(ctx.host() == Some(expected))
}
