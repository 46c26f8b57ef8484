//! Standard status phrases.
//!
//! The table covers 400–417 and 500–505 only. Its wording is part of the
//! error page contract, so it is kept here rather than taken from
//! [`http::StatusCode::canonical_reason`], whose phrases differ for 413,
//! 414 and 416.

/// Message used when a code has no standard phrase.
pub const GENERIC_MESSAGE: &str = "An Error Occurred.";

const PHRASES: [(u16, &str); 24] = [
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (402, "Payment Required"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (405, "Method Not Allowed"),
    (406, "Not Acceptable"),
    (407, "Proxy Authentication Required"),
    (408, "Request Timeout"),
    (409, "Conflict"),
    (410, "Gone"),
    (411, "Length Required"),
    (412, "Precondition Failed"),
    (413, "Request Entity Too Large"),
    (414, "Request-URI Too Long"),
    (415, "Unsupported Media Type"),
    (416, "Requested Range Not Satisfiable"),
    (417, "Expectation Failed"),
    (500, "Internal Server Error"),
    (501, "Not Implemented"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
    (504, "Gateway Timeout"),
    (505, "HTTP Version Not Supported"),
];

/// Returns the standard phrase for `code`, if it has one.
///
/// ```rust
/// use zephyr_errors::phrase_for;
///
/// assert_eq!(phrase_for(404), Some("Not Found"));
/// assert_eq!(phrase_for(999), None);
/// ```
#[must_use]
pub fn phrase_for(code: u16) -> Option<&'static str> {
    PHRASES
        .binary_search_by_key(&code, |(c, _)| *c)
        .ok()
        .map(|index| PHRASES[index].1)
}

/// Returns the message dispatched for a bare status code:
/// `"{code} - {phrase}"`, or [`GENERIC_MESSAGE`] for unknown codes.
#[must_use]
pub fn message_for_code(code: u16) -> String {
    match phrase_for(code) {
        Some(phrase) => format!("{code} - {phrase}"),
        None => GENERIC_MESSAGE.to_string(),
    }
}
