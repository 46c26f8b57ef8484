//! # Zephyr Errors
//!
//! The error registry maps status codes, error kind names and a default to
//! error handlers, and falls back to a built-in HTML page:
//!
//! ```text
//! <!DOCTYPE html><html><head><title>An error occurred</title></head>
//! <body><h1>{message}</h1>[<pre><code>{trace}</code></pre>]</body></html>
//! ```
//!
//! When the host has a layout, only the fragment inside `<body>` is
//! rendered and wrapped through the layout instead.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod matcher;
mod payload;
mod registry;
mod render;
mod status;

pub use matcher::ErrorMatcher;
pub use payload::{ErrorPayload, ErrorReport, PANIC_KIND};
pub use registry::{ErrorHandler, ErrorRegistry, Resolution};
pub use render::{render, render_document, render_fragment, Layout, RenderOptions};
pub use status::{message_for_code, phrase_for, GENERIC_MESSAGE};
