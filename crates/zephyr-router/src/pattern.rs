//! Path patterns.
//!
//! A route path is interpreted in one of three ways:
//!
//! | Route | Kind | Matching |
//! |---|---|---|
//! | `/admin/posts` | literal | byte-for-byte equality |
//! | `/admin/posts/(?<id>\d+)` | capturing | regex anchored to the whole path |
//! | `;^/admin/posts/(?<id>\d+);` | delimited | regex exactly as written |
//!
//! A delimited path starts with a punctuation delimiter and ends with the
//! same delimiter (or its closing bracket), optionally followed by flags
//! (`i`, `m`, `s`, `x`, `U`). Its author controls anchoring, which allows
//! prefix routes that run ahead of more specific ones and then pass.
//!
//! Paths are opaque: no trailing-slash normalization and no URL decoding.

use crate::captures::Captures;
use regex::Regex;
use std::fmt;
use zephyr_core::{ZephyrError, ZephyrResult};

const FLAGS: &str = "imsxU";

/// A compiled route pattern.
///
/// # Example
///
/// ```rust
/// use zephyr_router::PathPattern;
///
/// let pattern = PathPattern::parse(r"/admin/posts/(?<id>\d+)").unwrap();
/// let captures = pattern.matches("/admin/posts/5").unwrap();
/// assert_eq!(captures.get("id"), Some("5"));
///
/// assert!(pattern.matches("/admin/posts/abc").is_none());
/// assert!(pattern.matches("/admin/posts/5/edit").is_none());
/// ```
#[derive(Clone)]
pub enum PathPattern {
    /// Matches one path exactly.
    Literal(String),
    /// Matches with a regular expression.
    Regex {
        /// The path as registered.
        source: String,
        /// The compiled expression.
        regex: Regex,
    },
}

impl PathPattern {
    /// Parses a route path.
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::InvalidPattern`] if a regular expression path
    /// does not compile.
    pub fn parse(route: &str) -> ZephyrResult<Self> {
        match compile_delimited(route, false) {
            Some(Ok(regex)) => {
                return Ok(Self::Regex {
                    source: route.to_string(),
                    regex,
                })
            }
            // A leading `(` or `[` may open a group rather than a delimiter.
            Some(Err(delimited)) => return Self::anchored(route).map_err(|_| delimited),
            None => {}
        }

        if has_named_group(route) {
            return Self::anchored(route);
        }

        Ok(Self::Literal(route.to_string()))
    }

    /// Creates a literal pattern without inspecting the path.
    #[must_use]
    pub fn literal(path: impl Into<String>) -> Self {
        Self::Literal(path.into())
    }

    /// Compiles `route` as a regular expression anchored to the whole path.
    pub fn anchored(route: &str) -> ZephyrResult<Self> {
        let regex = Regex::new(&format!("^(?:{route})$"))
            .map_err(|e| ZephyrError::invalid_pattern(route, e))?;
        Ok(Self::Regex {
            source: route.to_string(),
            regex,
        })
    }

    /// Matches `path`, returning the named captures on success.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<Captures> {
        match self {
            Self::Literal(literal) => (literal == path).then(Captures::new),
            Self::Regex { regex, .. } => {
                let found = regex.captures(path)?;
                let mut captures = Captures::new();
                for name in regex.capture_names().flatten() {
                    if let Some(value) = found.name(name) {
                        captures.insert(name, value.as_str());
                    }
                }
                Some(captures)
            }
        }
    }

    /// Returns the path as registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(literal) => literal,
            Self::Regex { source, .. } => source,
        }
    }

    /// Returns `true` for literal patterns.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => f.debug_tuple("Literal").field(literal).finish(),
            Self::Regex { source, .. } => f.debug_tuple("Regex").field(source).finish(),
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiles a delimited regular expression such as `/test\/agent 1\.0/i`.
///
/// Returns `None` when `source` is not delimited. A `/` delimiter is only
/// recognised when `allow_slash` is set, since route paths start with `/`.
pub fn compile_delimited(source: &str, allow_slash: bool) -> Option<ZephyrResult<Regex>> {
    let (body, flags) = split_delimited(source, allow_slash)?;
    let expression = if flags.is_empty() {
        body.to_string()
    } else {
        format!("(?{flags}){body}")
    };
    Some(Regex::new(&expression).map_err(|e| ZephyrError::invalid_pattern(source, e)))
}

/// Compiles a guard expression: delimited (any delimiter, `/` included) or
/// a bare regular expression.
///
/// A source that only looks delimited, such as `(Firefox)/(\d+)` or
/// `.*Mobile.`, is compiled as a bare expression when the delimited reading
/// does not compile.
pub fn compile_guard(source: &str) -> ZephyrResult<Regex> {
    let bare = || Regex::new(source).map_err(|e| ZephyrError::invalid_pattern(source, e));
    match compile_delimited(source, true) {
        Some(Ok(regex)) => Ok(regex),
        Some(Err(delimited)) => bare().map_err(|_| delimited),
        None => bare(),
    }
}

fn split_delimited(source: &str, allow_slash: bool) -> Option<(&str, &str)> {
    let open = source.chars().next()?;
    if open.is_alphanumeric() || open.is_whitespace() || open == '\\' {
        return None;
    }
    if open == '/' && !allow_slash {
        return None;
    }

    let close = match open {
        '(' => ')',
        '{' => '}',
        '[' => ']',
        '<' => '>',
        other => other,
    };

    let rest = &source[open.len_utf8()..];
    let end = rest.rfind(close)?;
    let (body, flags) = (&rest[..end], &rest[end + close.len_utf8()..]);
    if body.is_empty() || !flags.chars().all(|c| FLAGS.contains(c)) {
        return None;
    }
    Some((body, flags))
}

fn has_named_group(source: &str) -> bool {
    source.contains("(?P<")
        || source
            .match_indices("(?<")
            .any(|(at, open)| !matches!(source[at + open.len()..].chars().next(), Some('=' | '!')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_literal() {
        let pattern = PathPattern::parse("/admin/posts").unwrap();
        assert!(pattern.is_literal());
        assert!(pattern.matches("/admin/posts").unwrap().is_empty());
        assert!(pattern.matches("/admin/posts/").is_none());
        assert!(pattern.matches("/Admin/posts").is_none());
    }

    #[test]
    fn test_literal_is_not_decoded() {
        let pattern = PathPattern::parse("/a b").unwrap();
        assert!(pattern.matches("/a%20b").is_none());
        assert!(pattern.matches("/a b").is_some());
    }

    #[test]
    fn test_capturing_is_anchored() {
        let pattern = PathPattern::parse(r"/admin/posts/(?<id>\d+)").unwrap();
        assert!(!pattern.is_literal());
        assert_eq!(pattern.matches("/admin/posts/5").unwrap().get("id"), Some("5"));
        assert!(pattern.matches("/x/admin/posts/5").is_none());
        assert!(pattern.matches("/admin/posts/5/edit").is_none());
    }

    #[test]
    fn test_python_style_group() {
        let pattern = PathPattern::parse(r"/tags/(?P<tag>[a-z]+)").unwrap();
        assert_eq!(pattern.matches("/tags/rust").unwrap().get("tag"), Some("rust"));
    }

    #[test]
    fn test_multiple_captures_in_order() {
        let pattern =
            PathPattern::parse(r"/(?<year>\d{4})/(?<month>\d{2})/(?<slug>[\w-]+)").unwrap();
        let captures = pattern.matches("/2010/07/hello-world").unwrap();
        let pairs: Vec<_> = captures.iter().collect();
        assert_eq!(
            pairs,
            [("year", "2010"), ("month", "07"), ("slug", "hello-world")]
        );
    }

    #[test]
    fn test_delimited_is_used_as_written() {
        let prefix = PathPattern::parse(r";^/admin/posts/(?<id>\d+);").unwrap();
        assert_eq!(
            prefix.matches("/admin/posts/5/edit").unwrap().get("id"),
            Some("5")
        );

        let exact = PathPattern::parse(r";^/admin/posts/(?<id>\d+)$;").unwrap();
        assert!(exact.matches("/admin/posts/5/edit").is_none());
        assert!(exact.matches("/admin/posts/5").is_some());
    }

    #[test]
    fn test_delimited_flags() {
        let pattern = PathPattern::parse("#^/about$#i").unwrap();
        assert!(pattern.matches("/ABOUT").is_some());
    }

    #[test]
    fn test_bracket_delimiters() {
        let pattern = PathPattern::parse(r"{^/files/(?<name>.+)$}").unwrap();
        assert_eq!(
            pattern.matches("/files/a/b.txt").unwrap().get("name"),
            Some("a/b.txt")
        );
    }

    #[test]
    fn test_invalid_regex_is_rejected_at_parse() {
        let err = PathPattern::parse(r"/posts/(?<id>\d+").unwrap_err();
        assert!(matches!(err, ZephyrError::InvalidPattern { .. }));

        let err = PathPattern::parse(";(unclosed;").unwrap_err();
        assert!(matches!(err, ZephyrError::InvalidPattern { .. }));
    }

    #[test]
    fn test_lookbehind_syntax_is_not_a_named_group() {
        assert!(!has_named_group("/a(?<=b)"));
        assert!(!has_named_group("/a(?<!b)"));
        assert!(has_named_group("/a(?<b>c)"));
    }

    #[test]
    fn test_compile_guard() {
        let delimited = compile_guard(r"/test\/agent 1\.0/").unwrap();
        assert!(delimited.is_match("test/agent 1.0"));

        let bare = compile_guard(r"^Mozilla/5\.0").unwrap();
        assert!(bare.is_match("Mozilla/5.0 (X11)"));

        let insensitive = compile_guard("/firefox/i").unwrap();
        assert!(insensitive.is_match("Mozilla Firefox"));

        assert!(compile_guard("(").is_err());
    }

    #[test]
    fn test_guard_falls_back_to_bare_regex() {
        let agent = "Firefox/115 Mobile!";
        for source in [r"(Firefox)/(\d+)", ".*Mobile.", "[A-Z]irefox/[0-9]"] {
            let regex = compile_guard(source).unwrap();
            assert!(regex.is_match(agent), "{source} should match");
        }
        assert!(!compile_guard("[A-Z]hrome/[0-9]").unwrap().is_match(agent));
    }

    #[test]
    fn test_leading_group_is_anchored() {
        let pattern = PathPattern::parse("(?<a>x)/(?<b>y)").unwrap();
        let captures = pattern.matches("x/y").unwrap();
        assert_eq!(captures.get("a"), Some("x"));
        assert_eq!(captures.get("b"), Some("y"));
        assert!(pattern.matches("x/y/z").is_none());
    }

    #[test]
    fn test_debug_hides_compiled_regex() {
        let pattern = PathPattern::parse(r"/p/(?<id>\d+)").unwrap();
        assert_eq!(format!("{pattern:?}"), r#"Regex("/p/(?<id>\\d+)")"#);
    }

    proptest! {
        #[test]
        fn literal_matches_only_itself(path in "/[a-z0-9/_.-]{0,24}", other in "/[a-z0-9/_.-]{0,24}") {
            let pattern = PathPattern::literal(path.clone());
            prop_assert!(pattern.matches(&path).is_some());
            prop_assert_eq!(pattern.matches(&other).is_some(), path == other);
        }

        #[test]
        fn digit_capture_roundtrips(id in 0u64..1_000_000) {
            let pattern = PathPattern::parse(r"/admin/posts/(?<id>\d+)").unwrap();
            let path = format!("/admin/posts/{id}");
            let expected = id.to_string();
            let captures = pattern.matches(&path).unwrap();
            prop_assert_eq!(captures.get("id"), Some(expected.as_str()));
        }
    }
}
