//! Route verbs.
//!
//! A route is registered for one of four HTTP methods or for any method.

use http::Method;
use std::fmt;
use std::str::FromStr;
use zephyr_core::ZephyrError;

/// The method selector of a route.
///
/// # Example
///
/// ```rust
/// use zephyr_router::Verb;
/// use http::Method;
///
/// assert!(Verb::Get.matches(&Method::GET));
/// assert!(!Verb::Get.matches(&Method::POST));
/// assert!(Verb::Any.matches(&Method::PATCH));
/// assert_eq!("delete".parse::<Verb>().unwrap(), Verb::Delete);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// Matches every method.
    Any,
}

impl Verb {
    /// All verbs, in registration-surface order.
    pub const ALL: [Verb; 5] = [Verb::Get, Verb::Post, Verb::Put, Verb::Delete, Verb::Any];

    /// Returns `true` if a request with `method` may be handled by this verb.
    #[must_use]
    pub fn matches(self, method: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::Get => *method == Method::GET,
            Self::Post => *method == Method::POST,
            Self::Put => *method == Method::PUT,
            Self::Delete => *method == Method::DELETE,
        }
    }

    /// Returns the concrete method, or `None` for [`Verb::Any`].
    #[must_use]
    pub fn method(self) -> Option<Method> {
        match self {
            Self::Get => Some(Method::GET),
            Self::Post => Some(Method::POST),
            Self::Put => Some(Method::PUT),
            Self::Delete => Some(Method::DELETE),
            Self::Any => None,
        }
    }

    /// Returns the verb token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Any => "ANY",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ZephyrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ZephyrError::invalid_payload(format!("`{s}` is not a route verb")))
    }
}

impl TryFrom<&Method> for Verb {
    type Error = ZephyrError;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}
