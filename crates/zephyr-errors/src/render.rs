//! The built-in error page.

use crate::payload::ErrorReport;
use zephyr_core::ZephyrResult;

/// A page layout the built-in renderer can wrap its fragment in.
pub trait Layout {
    /// Returns `true` if a layout template is available.
    fn layout_exists(&self) -> bool;

    /// Renders `contents` inside the layout.
    fn fetch_layout(&self, contents: &str) -> ZephyrResult<String>;
}

/// Options for the built-in renderer.
#[derive(Clone, Copy, Default)]
pub struct RenderOptions<'a> {
    /// Append the backtrace block when the error carries a trace.
    pub backtrace: bool,
    /// Layout to wrap the fragment in, if one is available.
    pub layout: Option<&'a dyn Layout>,
}

impl std::fmt::Debug for RenderOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderOptions")
            .field("backtrace", &self.backtrace)
            .field("layout", &self.layout.is_some())
            .finish()
    }
}

/// Renders the body fragment: the message heading and, optionally, the
/// backtrace block.
#[must_use]
pub fn render_fragment(report: &ErrorReport, backtrace: bool) -> String {
    let mut fragment = format!("<h1>{}</h1>", report.message);
    if backtrace {
        if let Some(trace) = &report.trace {
            fragment.push_str("<pre><code>");
            fragment.push_str(trace);
            fragment.push_str("</code></pre>");
        }
    }
    fragment
}

/// Renders the standalone error document around a fragment.
#[must_use]
pub fn render_document(fragment: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>An error occurred</title></head><body>{fragment}</body></html>"
    )
}

/// Renders the built-in error page.
///
/// The fragment goes through the layout when one exists; if the layout
/// fails, the standalone document is used instead.
///
/// ```rust
/// use zephyr_errors::{render, ErrorReport, RenderOptions};
///
/// let report = ErrorReport { message: "test".into(), code: 0, kind: None, trace: None };
/// assert_eq!(
///     render(&report, RenderOptions::default()),
///     "<!DOCTYPE html><html><head><title>An error occurred</title></head><body><h1>test</h1></body></html>"
/// );
/// ```
#[must_use]
pub fn render(report: &ErrorReport, options: RenderOptions<'_>) -> String {
    let fragment = render_fragment(report, options.backtrace);

    if let Some(layout) = options.layout.filter(|layout| layout.layout_exists()) {
        match layout.fetch_layout(&fragment) {
            Ok(page) => return page,
            Err(error) => {
                tracing::error!(error = %error, "error layout failed, rendering standalone page");
            }
        }
    }

    render_document(&fragment)
}
