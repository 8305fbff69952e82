//! Plist plugin trait.
//!
//! This module defines the contract a forensic plist plugin implements, plus
//! helpers for managing plugins in the global registry.

use crate::Result;
use crate::error::{PlistSiftError, RejectionReason, WrongPlistPlugin};
use crate::plugins::Plugin;
use crate::types::{Dictionary, PlistEvent};
use std::sync::Arc;

/// Trait for plist plugins.
///
/// A plugin declares which plists it understands through a filename pattern
/// ([`plist_path`](Self::plist_path)) and a set of top-level keys that must all be
/// present ([`plist_keys`](Self::plist_keys)). The provided [`matches`](Self::matches)
/// checks both; [`get_entries`](Self::get_entries) turns an accepted document into
/// timeline events.
///
/// # Priority System
///
/// The dispatcher tries plugins from the highest priority value down and stops at
/// the first one that accepts. The registry's fallback plugin is always tried last.
/// Default priority is 50.
///
/// # Example
///
/// ```rust
/// use plistsift::plugins::{Plugin, PlistPlugin};
/// use plistsift::{Dictionary, PlistEvent, Result};
///
/// struct SoftwareUpdatePlugin;
///
/// impl Plugin for SoftwareUpdatePlugin {
///     fn name(&self) -> &str { "SoftwareUpdatePlugin" }
///     fn version(&self) -> String { "1.0.0".to_string() }
///     fn initialize(&self) -> Result<()> { Ok(()) }
///     fn shutdown(&self) -> Result<()> { Ok(()) }
/// }
///
/// impl PlistPlugin for SoftwareUpdatePlugin {
///     fn plist_path(&self) -> &str {
///         "com.apple.SoftwareUpdate.plist"
///     }
///
///     fn plist_keys(&self) -> &[&str] {
///         &["LastFullSuccessfulDate", "LastSuccessfulDate"]
///     }
///
///     fn get_entries(&self, top_level: &Dictionary) -> Result<Vec<PlistEvent>> {
///         Ok(top_level
///             .get("LastFullSuccessfulDate")
///             .and_then(|value| value.as_date())
///             .map(|date| PlistEvent::from_date("/", "LastFullSuccessfulDate", date))
///             .into_iter()
///             .collect())
///     }
/// }
///
/// let plugin = SoftwareUpdatePlugin;
/// let mut top = Dictionary::new();
/// top.insert("LastFullSuccessfulDate".to_string(), "never".into());
/// top.insert("LastSuccessfulDate".to_string(), "never".into());
///
/// assert!(plugin.matches("/Library/Preferences/com.apple.softwareupdate.plist", &top).is_ok());
/// assert!(plugin.matches("com.apple.bluetooth.plist", &top).is_err());
/// ```
pub trait PlistPlugin: Plugin {
    /// Filename pattern this plugin handles.
    ///
    /// Compared case-insensitively against the document's filename, which only has to
    /// contain it. An empty pattern matches every filename.
    fn plist_path(&self) -> &str;

    /// Top-level keys that must all be present, compared case-sensitively.
    fn plist_keys(&self) -> &[&str];

    /// Dispatch priority. Higher values are tried first.
    fn priority(&self) -> i32 {
        50
    }

    /// Extract timeline events from an accepted document.
    ///
    /// Only called after [`matches`](Self::matches) succeeded. Event order is up to
    /// the plugin.
    fn get_entries(&self, top_level: &Dictionary) -> Result<Vec<PlistEvent>>;

    /// Decide whether this plugin applies to a document.
    ///
    /// # Errors
    ///
    /// Returns [`WrongPlistPlugin`] when the filename does not contain
    /// [`plist_path`](Self::plist_path) or when any of
    /// [`plist_keys`](Self::plist_keys) is missing. Extra keys are ignored.
    fn matches(&self, filename: &str, top_level: &Dictionary) -> std::result::Result<(), WrongPlistPlugin> {
        let reason = if !filename.to_lowercase().contains(&self.plist_path().to_lowercase()) {
            Some(RejectionReason::FilenameMismatch)
        } else {
            let missing: Vec<String> = self
                .plist_keys()
                .iter()
                .filter(|key| !top_level.contains_key(**key))
                .map(|key| key.to_string())
                .collect();
            (!missing.is_empty()).then_some(RejectionReason::MissingKeys(missing))
        };

        match reason {
            None => Ok(()),
            Some(reason) => Err(WrongPlistPlugin {
                filename: filename.to_string(),
                plugin_name: self.name().to_string(),
                expected_path: self.plist_path().to_string(),
                required_keys: self.plist_keys().iter().map(|key| key.to_string()).collect(),
                present_keys: top_level.keys().cloned().collect(),
                reason,
            }),
        }
    }

    /// Match, then extract.
    ///
    /// # Errors
    ///
    /// A rejection surfaces as `PlistSiftError::WrongPlistPlugin` and no extraction is
    /// attempted. Errors from [`get_entries`](Self::get_entries) are returned as-is.
    fn process(&self, filename: &str, top_level: &Dictionary) -> Result<Vec<PlistEvent>> {
        self.matches(filename, top_level)?;
        self.get_entries(top_level)
    }
}

/// Register a plist plugin with the global registry.
///
/// # Errors
///
/// - `PlistSiftError::Validation` - invalid name, or the name of the fallback plugin
/// - any error from the plugin's `initialize()` method
pub fn register_plist_plugin(plugin: Arc<dyn PlistPlugin>) -> Result<()> {
    use crate::plugins::registry::get_plist_plugin_registry;

    let registry = get_plist_plugin_registry();
    let mut registry = registry
        .write()
        .map_err(|e| PlistSiftError::LockPoisoned(format!("Plist plugin registry lock poisoned: {}", e)))?;

    registry.register(plugin)
}

/// Unregister a plist plugin by name, calling its `shutdown()` method.
///
/// Unknown names are ignored.
pub fn unregister_plist_plugin(name: &str) -> Result<()> {
    use crate::plugins::registry::get_plist_plugin_registry;

    let registry = get_plist_plugin_registry();
    let mut registry = registry
        .write()
        .map_err(|e| PlistSiftError::LockPoisoned(format!("Plist plugin registry lock poisoned: {}", e)))?;

    registry.remove(name)
}

/// List the names of all plugins in the global registry, fallback included.
pub fn list_plist_plugins() -> Result<Vec<String>> {
    use crate::plugins::registry::get_plist_plugin_registry;

    let registry = get_plist_plugin_registry();
    let registry = registry
        .read()
        .map_err(|e| PlistSiftError::LockPoisoned(format!("Plist plugin registry lock poisoned: {}", e)))?;

    Ok(registry.list())
}

/// Remove every specialized plugin from the global registry.
///
/// The fallback plugin stays in place.
pub fn clear_plist_plugins() -> Result<()> {
    use crate::plugins::registry::get_plist_plugin_registry;

    let registry = get_plist_plugin_registry();
    let mut registry = registry
        .write()
        .map_err(|e| PlistSiftError::LockPoisoned(format!("Plist plugin registry lock poisoned: {}", e)))?;

    registry.shutdown_all()
}

/// All plugins in dispatch order: specialized plugins by priority, then the fallback.
///
/// Registers the built-in plugins on first use. The result is never empty.
pub fn get_plist_plugins() -> Result<Vec<Arc<dyn PlistPlugin>>> {
    use crate::plugins::registry::get_plist_plugin_registry;

    crate::extractors::ensure_initialized()?;

    let registry = get_plist_plugin_registry();
    let registry = registry
        .read()
        .map_err(|e| PlistSiftError::LockPoisoned(format!("Plist plugin registry lock poisoned: {}", e)))?;

    Ok(registry.get_all())
}
