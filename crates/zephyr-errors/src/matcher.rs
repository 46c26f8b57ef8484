//! Error matchers.

use std::ops::RangeInclusive;
use zephyr_core::{ZephyrError, ZephyrResult};

/// Selects which errors a handler is registered for.
///
/// Kind names that are entirely ASCII digits are treated as codes, so
/// `"403"` and `403` register the same handler.
///
/// ```rust
/// use zephyr_errors::ErrorMatcher;
///
/// assert_eq!(ErrorMatcher::from(403), ErrorMatcher::Code(403));
/// assert_eq!(ErrorMatcher::from(400..=404), ErrorMatcher::Range(400..=404));
/// assert_eq!(ErrorMatcher::from("Exception"), ErrorMatcher::Kind("Exception".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorMatcher {
    /// The fallback handler; at most one is active.
    Default,
    /// A single code.
    Code(u16),
    /// A list of codes.
    Codes(Vec<u16>),
    /// A closed range of codes.
    Range(RangeInclusive<u16>),
    /// A single error kind name.
    Kind(String),
    /// A list of error kind names.
    Kinds(Vec<String>),
}

/// A single registration slot a matcher expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot {
    Default,
    Code(u16),
    Kind(String),
}

impl ErrorMatcher {
    /// Expands the matcher into registration slots.
    pub(crate) fn slots(self) -> ZephyrResult<Vec<Slot>> {
        let slots = match self {
            Self::Default => vec![Slot::Default],
            Self::Code(code) => vec![Slot::Code(code)],
            Self::Codes(codes) => codes.into_iter().map(Slot::Code).collect(),
            Self::Range(range) => range.map(Slot::Code).collect(),
            Self::Kind(name) => vec![name_slot(name)?],
            Self::Kinds(names) => names
                .into_iter()
                .map(name_slot)
                .collect::<ZephyrResult<_>>()?,
        };

        if slots.is_empty() {
            return Err(ZephyrError::invalid_name("error handler"));
        }
        Ok(slots)
    }
}

fn name_slot(name: String) -> ZephyrResult<Slot> {
    if name.is_empty() {
        return Err(ZephyrError::invalid_name("error handler"));
    }
    if name.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(code) = name.parse() {
            return Ok(Slot::Code(code));
        }
    }
    Ok(Slot::Kind(name))
}

impl From<u16> for ErrorMatcher {
    fn from(code: u16) -> Self {
        Self::Code(code)
    }
}

impl From<RangeInclusive<u16>> for ErrorMatcher {
    fn from(range: RangeInclusive<u16>) -> Self {
        Self::Range(range)
    }
}

impl From<Vec<u16>> for ErrorMatcher {
    fn from(codes: Vec<u16>) -> Self {
        Self::Codes(codes)
    }
}

impl<const N: usize> From<[u16; N]> for ErrorMatcher {
    fn from(codes: [u16; N]) -> Self {
        Self::Codes(codes.to_vec())
    }
}

impl From<&str> for ErrorMatcher {
    fn from(name: &str) -> Self {
        Self::Kind(name.to_string())
    }
}

impl From<String> for ErrorMatcher {
    fn from(name: String) -> Self {
        Self::Kind(name)
    }
}

impl From<Vec<String>> for ErrorMatcher {
    fn from(names: Vec<String>) -> Self {
        Self::Kinds(names)
    }
}

impl From<Vec<&str>> for ErrorMatcher {
    fn from(names: Vec<&str>) -> Self {
        Self::Kinds(names.into_iter().map(ToString::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ErrorMatcher {
    fn from(names: [&str; N]) -> Self {
        Self::Kinds(names.iter().map(ToString::to_string).collect())
    }
}
