//! Application construction.
//!
//! Collaborators and plugins are collected on an [`ApplicationBuilder`] and
//! applied once, in [`ApplicationBuilder::build`]. Plugins only ever touch
//! the application they are built into.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use zephyr_config::Settings;
use zephyr_core::{ZephyrError, ZephyrResult};

use crate::app::Application;
use crate::view::{NullView, View};

/// Dependency slot holding the [`View`] (`Box<dyn View>`).
pub const VIEW_DEPENDENCY: &str = "view";

/// Dependency slot holding the [`Settings`].
pub const SETTINGS_DEPENDENCY: &str = "settings";

/// A plugin: extends an application before it starts serving.
pub type Plugin = Arc<dyn Fn(&mut Application) -> ZephyrResult<()> + Send + Sync>;

/// Builds an [`Application`].
///
/// # Example
///
/// ```rust
/// use zephyr::prelude::*;
/// use serde_json::Value;
///
/// let app = Application::builder()
///     .register("greeter", |app| {
///         app.helper("greet", |_, _, _| Ok(Value::from("hello")))
///     })
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(app.helpers()[0], "greet");
/// ```
#[derive(Default)]
pub struct ApplicationBuilder {
    settings: Option<Settings>,
    view: Option<Box<dyn View>>,
    plugins: IndexMap<String, Plugin>,
}

impl fmt::Debug for ApplicationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationBuilder")
            .field("settings", &self.settings)
            .field("view", &self.view.is_some())
            .field("plugins", &self.plugins.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ApplicationBuilder {
    /// Creates a builder with default settings and no view engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the settings.
    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Sets the view engine.
    #[must_use]
    pub fn view(mut self, view: impl View + 'static) -> Self {
        self.view = Some(Box::new(view));
        self
    }

    /// Injects a collaborator from a dynamically typed source.
    ///
    /// The `"view"` slot takes a `Box<dyn View>`, the `"settings"` slot a
    /// [`Settings`].
    ///
    /// ```rust
    /// use zephyr::Application;
    /// use zephyr_core::ZephyrError;
    ///
    /// let err = Application::builder()
    ///     .dependency("view", Box::new("not a view"))
    ///     .unwrap_err();
    /// assert!(matches!(err, ZephyrError::DependencyMismatch { .. }));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::DependencyMismatch`] if `value` has the wrong
    /// type for the slot, and [`ZephyrError::InvalidPayload`] for an unknown
    /// slot.
    pub fn dependency(mut self, name: &str, value: Box<dyn Any>) -> ZephyrResult<Self> {
        match name {
            VIEW_DEPENDENCY => {
                let view = value
                    .downcast::<Box<dyn View>>()
                    .map_err(|_| ZephyrError::dependency_mismatch(name, "dyn View"))?;
                self.view = Some(*view);
            }
            SETTINGS_DEPENDENCY => {
                let settings = value
                    .downcast::<Settings>()
                    .map_err(|_| ZephyrError::dependency_mismatch(name, "Settings"))?;
                self.settings = Some(*settings);
            }
            other => {
                return Err(ZephyrError::invalid_payload(format!(
                    "`{other}` is not a known dependency"
                )))
            }
        }
        Ok(self)
    }

    /// Registers a plugin under `name`, replacing any plugin with that name.
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::InvalidName`] if `name` is empty.
    pub fn register<F>(self, name: &str, plugin: F) -> ZephyrResult<Self>
    where
        F: Fn(&mut Application) -> ZephyrResult<()> + Send + Sync + 'static,
    {
        self.register_plugin(name, Arc::new(plugin))
    }

    /// Registers a plugin from a dynamically typed source. The payload must
    /// be a [`Plugin`].
    ///
    /// # Errors
    ///
    /// Returns [`ZephyrError::InvalidName`] if `name` is empty and
    /// [`ZephyrError::InvalidPayload`] if `plugin` is not a [`Plugin`].
    pub fn register_any(self, name: &str, plugin: Box<dyn Any>) -> ZephyrResult<Self> {
        if name.is_empty() {
            return Err(ZephyrError::invalid_name("plugin"));
        }
        let plugin = plugin.downcast::<Plugin>().map_err(|_| {
            ZephyrError::invalid_payload("you must provide a callable plugin factory")
        })?;
        self.register_plugin(name, *plugin)
    }

    fn register_plugin(mut self, name: &str, plugin: Plugin) -> ZephyrResult<Self> {
        if name.is_empty() {
            return Err(ZephyrError::invalid_name("plugin"));
        }
        tracing::debug!(plugin = name, "plugin registered");
        self.plugins.insert(name.to_string(), plugin);
        Ok(self)
    }

    /// Removes the plugin registered under `name`, if any.
    #[must_use]
    pub fn unregister(mut self, name: &str) -> Self {
        self.plugins.shift_remove(name);
        self
    }

    /// Returns `true` if a plugin is registered under `name`.
    #[must_use]
    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Builds the application: defaults first, then every plugin in
    /// registration order.
    ///
    /// # Errors
    ///
    /// Returns the first error a plugin fails with.
    pub fn build(self) -> ZephyrResult<Application> {
        let settings = self.settings.unwrap_or_default();
        let view = self.view.unwrap_or_else(|| Box::new(NullView));
        let mut app = Application::with_parts(settings, view);

        for (name, plugin) in &self.plugins {
            tracing::debug!(plugin = %name, "applying plugin");
            plugin(&mut app)?;
        }
        Ok(app)
    }
}
