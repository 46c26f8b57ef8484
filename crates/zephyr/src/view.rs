//! The view collaborator.
//!
//! Template rendering is left to an external engine. The application only
//! needs to fetch a template with variables and, optionally, wrap contents
//! in a layout; the built-in error page uses the same layout.

use indexmap::IndexMap;
use serde_json::Value;
use zephyr_core::{ZephyrError, ZephyrResult};
use zephyr_errors::Layout;

/// Variables handed to a template.
pub type TemplateVars = IndexMap<String, Value>;

/// A template engine.
///
/// # Example
///
/// ```rust
/// use zephyr::{TemplateVars, View};
/// use zephyr_core::ZephyrResult;
///
/// struct Greeting;
///
/// impl View for Greeting {
///     fn fetch(&self, template: &str, vars: &TemplateVars) -> ZephyrResult<String> {
///         let name = vars.get("name").and_then(|v| v.as_str()).unwrap_or("world");
///         Ok(format!("{template}: hello {name}"))
///     }
/// }
///
/// let mut vars = TemplateVars::new();
/// vars.insert("name".into(), "zephyr".into());
/// assert_eq!(Greeting.fetch("index", &vars).unwrap(), "index: hello zephyr");
/// ```
pub trait View: Send + Sync {
    /// Renders `template` with `vars`.
    fn fetch(&self, template: &str, vars: &TemplateVars) -> ZephyrResult<String>;

    /// Returns `true` if a layout template is available.
    fn layout_exists(&self) -> bool {
        false
    }

    /// Renders `contents` inside the layout.
    fn fetch_layout(&self, contents: &str) -> ZephyrResult<String> {
        Ok(contents.to_string())
    }
}

/// The view used when no engine was configured.
///
/// It has no layout, and fetching any template fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullView;

impl View for NullView {
    fn fetch(&self, template: &str, _vars: &TemplateVars) -> ZephyrResult<String> {
        Err(ZephyrError::collaborator(
            "view",
            format!("no view engine configured to render `{template}`"),
        ))
    }
}

/// Presents a [`View`] as the error page layout.
pub(crate) struct ViewLayout<'a>(pub(crate) &'a dyn View);

impl Layout for ViewLayout<'_> {
    fn layout_exists(&self) -> bool {
        self.0.layout_exists()
    }

    fn fetch_layout(&self, contents: &str) -> ZephyrResult<String> {
        self.0.fetch_layout(contents)
    }
}
