//! Plugin registration and discovery.
//!
//! [`PlistPluginRegistry`] holds the specialized plist plugins, ordered by priority,
//! plus exactly one fallback plugin that accepts every document. A process-wide
//! instance is available through [`get_plist_plugin_registry`].

use crate::core::dispatch::{Dispatch, dispatch};
use crate::extractors::DefaultPlugin;
use crate::plugins::PlistPlugin;
use crate::types::PlistDocument;
use crate::{PlistSiftError, Result};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Validate a plugin name before registration.
///
/// # Rules
///
/// - Name cannot be empty
/// - Name cannot contain whitespace
fn validate_plugin_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(PlistSiftError::validation("Plugin name cannot be empty"));
    }

    if name.contains(char::is_whitespace) {
        return Err(PlistSiftError::validation(format!(
            "Plugin name '{}' cannot contain whitespace",
            name
        )));
    }

    Ok(())
}

/// Registry for plist plugins.
///
/// Specialized plugins are kept per priority in registration order. The fallback
/// plugin is stored apart from them so the registry can never be without one.
///
/// # Example
///
/// ```rust
/// use plistsift::plugins::registry::PlistPluginRegistry;
///
/// let registry = PlistPluginRegistry::new();
/// assert!(registry.list().contains(&"DefaultPlugin".to_string()));
/// assert_eq!(registry.get_all().len(), 1);
/// ```
pub struct PlistPluginRegistry {
    plugins: BTreeMap<i32, IndexMap<String, Arc<dyn PlistPlugin>>>,
    fallback: Arc<dyn PlistPlugin>,
}

impl PlistPluginRegistry {
    /// Create a registry whose only plugin is the built-in [`DefaultPlugin`].
    pub fn new() -> Self {
        Self {
            plugins: BTreeMap::new(),
            fallback: Arc::new(DefaultPlugin::new()),
        }
    }

    /// Create a registry with a custom fallback plugin.
    ///
    /// The fallback is tried after every specialized plugin and must accept any
    /// document: an empty path pattern and no required keys.
    ///
    /// # Errors
    ///
    /// Returns `PlistSiftError::Validation` if the plugin's name is invalid or it
    /// declares a path pattern or required keys, and any error from `initialize()`.
    pub fn with_fallback(fallback: Arc<dyn PlistPlugin>) -> Result<Self> {
        validate_plugin_name(fallback.name())?;

        if !fallback.plist_path().is_empty() || !fallback.plist_keys().is_empty() {
            return Err(PlistSiftError::validation(format!(
                "Fallback plugin '{}' must accept every plist (no path pattern, no required keys)",
                fallback.name()
            )));
        }

        fallback.initialize()?;

        Ok(Self {
            plugins: BTreeMap::new(),
            fallback,
        })
    }

    /// Register a specialized plugin.
    ///
    /// A plugin with the same name is replaced. The new plugin is in place before the
    /// replaced one is shut down, so a failing `shutdown()` is reported without losing
    /// either registration.
    ///
    /// # Errors
    ///
    /// - `PlistSiftError::Validation` - invalid name, or the fallback's name
    /// - any error from the plugin's `initialize()` method
    pub fn register(&mut self, plugin: Arc<dyn PlistPlugin>) -> Result<()> {
        let name = plugin.name().to_string();
        let priority = plugin.priority();

        validate_plugin_name(&name)?;

        if name == self.fallback.name() {
            return Err(PlistSiftError::validation(format!(
                "Plugin name '{}' is reserved for the fallback plugin",
                name
            )));
        }

        plugin.initialize()?;

        let replaced = self.take(&name);
        self.plugins.entry(priority).or_default().insert(name, plugin);

        if let Some(replaced) = replaced {
            replaced.shutdown()?;
        }

        Ok(())
    }

    /// Look up a plugin by name, the fallback included.
    pub fn get(&self, name: &str) -> Result<Arc<dyn PlistPlugin>> {
        if name == self.fallback.name() {
            return Ok(Arc::clone(&self.fallback));
        }

        self.plugins
            .values()
            .find_map(|plugins| plugins.get(name))
            .cloned()
            .ok_or_else(|| PlistSiftError::Plugin {
                message: format!("Plist plugin '{}' not registered", name),
                plugin_name: name.to_string(),
            })
    }

    /// The plugin used when no specialized plugin accepts a document.
    pub fn fallback(&self) -> Arc<dyn PlistPlugin> {
        Arc::clone(&self.fallback)
    }

    /// Returns `true` if a plugin with this name is registered, the fallback included.
    pub fn contains(&self, name: &str) -> bool {
        name == self.fallback.name() || self.plugins.values().any(|plugins| plugins.contains_key(name))
    }

    /// All plugins in dispatch order.
    ///
    /// Specialized plugins come first, highest priority first and in registration
    /// order within a priority. The fallback is always last, so the result is never
    /// empty.
    pub fn get_all(&self) -> Vec<Arc<dyn PlistPlugin>> {
        let mut result = self.specialized();
        result.push(Arc::clone(&self.fallback));
        result
    }

    /// Specialized plugins only, in dispatch order.
    pub fn specialized(&self) -> Vec<Arc<dyn PlistPlugin>> {
        let mut result = Vec::with_capacity(self.len());

        for (_priority, plugins) in self.plugins.iter().rev() {
            for plugin in plugins.values() {
                result.push(Arc::clone(plugin));
            }
        }

        result
    }

    /// List all registered plugin names in dispatch order, the fallback last.
    pub fn list(&self) -> Vec<String> {
        self.get_all().iter().map(|plugin| plugin.name().to_string()).collect()
    }

    /// Number of plugins, the fallback included.
    pub fn len(&self) -> usize {
        self.plugins.values().map(IndexMap::len).sum::<usize>() + 1
    }

    /// Always `false`: the fallback plugin is always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Remove a specialized plugin, calling its `shutdown()` method.
    ///
    /// Unknown names are ignored.
    ///
    /// # Errors
    ///
    /// Returns `PlistSiftError::Validation` when asked to remove the fallback, and any
    /// error from the plugin's `shutdown()`.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        if name == self.fallback.name() {
            return Err(PlistSiftError::validation(format!(
                "Fallback plugin '{}' cannot be removed",
                name
            )));
        }

        if let Some(plugin) = self.take(name) {
            plugin.shutdown()?;
        }

        Ok(())
    }

    /// Detach a specialized plugin without shutting it down.
    fn take(&mut self, name: &str) -> Option<Arc<dyn PlistPlugin>> {
        let mut taken: Option<Arc<dyn PlistPlugin>> = None;

        for plugins in self.plugins.values_mut() {
            if let Some(plugin) = plugins.shift_remove(name)
                && taken.is_none()
            {
                taken = Some(plugin);
            }
        }

        self.plugins.retain(|_, plugins| !plugins.is_empty());

        taken
    }

    /// Shutdown and remove every specialized plugin. The fallback stays.
    pub fn shutdown_all(&mut self) -> Result<()> {
        let names: Vec<String> = self
            .plugins
            .values()
            .flat_map(|plugins| plugins.keys().cloned())
            .collect();

        for name in names {
            self.remove(&name)?;
        }

        Ok(())
    }

    /// Run a document through this registry's plugins.
    pub fn dispatch(&self, document: &PlistDocument) -> Result<Dispatch> {
        dispatch(&document.filename, &document.top_level, &self.get_all())
    }
}

impl Default for PlistPluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global plist plugin registry singleton.
pub static PLIST_PLUGIN_REGISTRY: Lazy<Arc<RwLock<PlistPluginRegistry>>> =
    Lazy::new(|| Arc::new(RwLock::new(PlistPluginRegistry::new())));

/// Get the global plist plugin registry.
pub fn get_plist_plugin_registry() -> Arc<RwLock<PlistPluginRegistry>> {
    PLIST_PLUGIN_REGISTRY.clone()
}
