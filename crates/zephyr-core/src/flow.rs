//! The skip sentinel.
//!
//! Route handlers and condition guards report whether the current candidate
//! route accepted the request. [`Flow::Pass`] means "abandon this candidate
//! and try the next one"; the matcher is the only place that acts on it.

use crate::ZephyrResult;

/// Outcome of a route handler or condition guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// The candidate accepted the request; carry on normally.
    #[default]
    Continue,
    /// The candidate declined; the matcher moves on to the next one.
    Pass,
}

impl Flow {
    /// Returns `true` for [`Flow::Pass`].
    #[must_use]
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Maps a predicate result onto a flow: `false` passes.
    #[must_use]
    pub const fn from_bool(accepted: bool) -> Self {
        if accepted {
            Self::Continue
        } else {
            Self::Pass
        }
    }
}

impl From<bool> for Flow {
    fn from(accepted: bool) -> Self {
        Self::from_bool(accepted)
    }
}

impl From<()> for Flow {
    fn from((): ()) -> Self {
        Self::Continue
    }
}

/// Result returned by route handlers.
pub type HandlerResult = ZephyrResult<Flow>;

/// Evaluates a guard and returns `Ok(Flow::Pass)` from the enclosing
/// handler if it declined.
///
/// The guard expression must be a `ZephyrResult<Flow>`; errors propagate
/// with `?`.
///
/// ```
/// use zephyr_core::{guard, Flow, HandlerResult, ZephyrResult};
///
/// fn is_admin(admin: bool) -> ZephyrResult<Flow> {
///     Ok(Flow::from_bool(admin))
/// }
///
/// fn handler(admin: bool) -> HandlerResult {
///     guard!(is_admin(admin));
///     Ok(Flow::Continue)
/// }
///
/// assert_eq!(handler(false).unwrap(), Flow::Pass);
/// assert_eq!(handler(true).unwrap(), Flow::Continue);
/// ```
#[macro_export]
macro_rules! guard {
    ($flow:expr) => {
        if $crate::Flow::is_pass($flow?) {
            return ::core::result::Result::Ok($crate::Flow::Pass);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ZephyrError;

    fn guarded(flow: ZephyrResult<Flow>, reached: &mut bool) -> HandlerResult {
        guard!(flow);
        *reached = true;
        Ok(Flow::Continue)
    }

    #[test]
    fn test_default_is_continue() {
        assert_eq!(Flow::default(), Flow::Continue);
    }

    #[test]
    fn test_from_bool() {
        assert_eq!(Flow::from(true), Flow::Continue);
        assert_eq!(Flow::from(false), Flow::Pass);
        assert_eq!(Flow::from(()), Flow::Continue);
    }

    #[test]
    fn test_guard_passes_without_running_body() {
        let mut reached = false;
        let result = guarded(Ok(Flow::Pass), &mut reached).unwrap();
        assert!(result.is_pass());
        assert!(!reached);
    }

    #[test]
    fn test_guard_continues() {
        let mut reached = false;
        let result = guarded(Ok(Flow::Continue), &mut reached).unwrap();
        assert_eq!(result, Flow::Continue);
        assert!(reached);
    }

    #[test]
    fn test_guard_propagates_errors() {
        let mut reached = false;
        let result = guarded(Err(ZephyrError::invalid_condition("nope")), &mut reached);
        assert!(matches!(result, Err(ZephyrError::InvalidCondition { .. })));
        assert!(!reached);
    }
}
