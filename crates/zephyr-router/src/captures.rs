//! Named capture storage.
//!
//! Captures extracted from a path pattern are stored inline for the common
//! case of a handful of groups, avoiding a heap allocation per match.

use smallvec::SmallVec;
use std::ops::Index;

/// Maximum number of captures stored inline (stack allocated).
const INLINE_CAPTURES: usize = 4;

/// Named captures extracted from a matched path.
///
/// Names are unique; inserting an existing name replaces its value in place.
/// Iteration follows insertion order.
///
/// # Example
///
/// ```rust
/// use zephyr_router::Captures;
///
/// let mut captures = Captures::new();
/// captures.insert("id", "5");
/// captures.insert("action", "edit");
///
/// assert_eq!(captures.get("id"), Some("5"));
/// assert_eq!(&captures["action"], "edit");
/// assert_eq!(captures.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Captures {
    inner: SmallVec<[(String, String); INLINE_CAPTURES]>,
}

impl Captures {
    /// Creates an empty capture set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a capture, replacing the value of an existing name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.inner.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.inner.push((name, value)),
        }
    }

    /// Returns the value captured under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if a capture named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns true if there are no captures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of captures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl Index<&str> for Captures {
    type Output = str;

    /// # Panics
    ///
    /// Panics if no capture named `name` exists.
    fn index(&self, name: &str) -> &str {
        self.get(name)
            .unwrap_or_else(|| panic!("no capture named `{name}`"))
    }
}

impl<'a> IntoIterator for &'a Captures {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Captures {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut captures = Self::new();
        for (name, value) in iter {
            captures.insert(name, value);
        }
        captures
    }
}
