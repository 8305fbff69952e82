//! Plugin dispatch.
//!
//! Runs a decoded plist through an ordered list of plugins. The first plugin whose
//! [`matches`](crate::plugins::PlistPlugin::matches) accepts the document extracts
//! its events, and no other plugin runs. Rejections are expected and only logged.
//!
//! # Functions
//!
//! - [`dispatch`] - Dispatch against an explicit plugin list
//! - [`dispatch_document`] - Dispatch against the global registry
//! - [`dispatch_with_config`] - Dispatch against the global registry, filtered by [`ParserConfig`]

use crate::core::config::ParserConfig;
use crate::extractors::DefaultPlugin;
use crate::plugins::PlistPlugin;
use crate::plugins::registry::{PlistPluginRegistry, get_plist_plugin_registry};
use crate::types::{Dictionary, PlistDocument, PlistEvent};
use crate::{PlistSiftError, Result};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of dispatching one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dispatch {
    /// Name of the plugin that accepted the document.
    pub plugin_name: String,
    /// Events extracted by that plugin.
    pub events: Vec<PlistEvent>,
}

/// Try `plugins` in order and extract with the first one that accepts the document.
///
/// Pass the plugins in dispatch order with a catch-all plugin last, as
/// [`PlistPluginRegistry::get_all`](crate::plugins::registry::PlistPluginRegistry::get_all)
/// returns them.
///
/// # Errors
///
/// - `PlistSiftError::Configuration` if `plugins` is empty, or if every plugin
///   rejected the document (the list had no catch-all plugin)
/// - any error from the accepting plugin's `get_entries()`
///
/// A plugin rejection never escapes this function as `WrongPlistPlugin`.
pub fn dispatch(filename: &str, top_level: &Dictionary, plugins: &[Arc<dyn PlistPlugin>]) -> Result<Dispatch> {
    if plugins.is_empty() {
        return Err(PlistSiftError::Configuration(
            "No plist plugins available for dispatch".to_string(),
        ));
    }

    for plugin in plugins {
        match plugin.matches(filename, top_level) {
            Ok(()) => {
                tracing::debug!("Plist plugin '{}' accepted {}", plugin.name(), filename);
                let events = plugin.get_entries(top_level)?;
                tracing::debug!(
                    "Plist plugin '{}' extracted {} events from {}",
                    plugin.name(),
                    events.len(),
                    filename
                );
                return Ok(Dispatch {
                    plugin_name: plugin.name().to_string(),
                    events,
                });
            }
            Err(rejection) => {
                tracing::debug!("{}", rejection);
            }
        }
    }

    Err(PlistSiftError::Configuration(format!(
        "No plist plugin accepted {} and no fallback plugin was supplied",
        filename
    )))
}

/// Dispatch a document against the global registry.
///
/// Built-in plugins are registered on first use.
///
/// # Example
///
/// ```rust
/// use plistsift::core::dispatch::dispatch_document;
/// use plistsift::{Dictionary, PlistDocument};
///
/// # fn main() -> plistsift::Result<()> {
/// let document = PlistDocument::new("unknown.plist", Dictionary::new());
/// let result = dispatch_document(&document)?;
/// assert_eq!(result.plugin_name, "DefaultPlugin");
/// # Ok(())
/// # }
/// ```
pub fn dispatch_document(document: &PlistDocument) -> Result<Dispatch> {
    let plugins = crate::plugins::get_plist_plugins()?;
    dispatch(&document.filename, &document.top_level, &plugins)
}

/// Dispatch a document against the global registry, honouring `config`.
///
/// Specialized plugins rejected by [`ParserConfig::is_plugin_enabled`] are skipped.
/// The fallback always takes part; when it is the built-in [`DefaultPlugin`] it walks
/// `config.default_plugin_depth` levels.
///
/// # Errors
///
/// Returns `PlistSiftError::Validation` if `config` is invalid, plus everything
/// [`dispatch`] returns.
pub fn dispatch_with_config(document: &PlistDocument, config: &ParserConfig) -> Result<Dispatch> {
    config.validate()?;
    crate::extractors::ensure_initialized()?;

    let (specialized, fallback) = {
        let registry = get_plist_plugin_registry();
        let registry = registry
            .read()
            .map_err(|e| PlistSiftError::LockPoisoned(format!("Plist plugin registry lock poisoned: {}", e)))?;

        for warning in config_warnings(config, &registry) {
            tracing::warn!("{}", warning);
        }

        (registry.specialized(), registry.fallback())
    };

    let mut plugins: Vec<Arc<dyn PlistPlugin>> = specialized
        .into_iter()
        .filter(|plugin| config.is_plugin_enabled(plugin.name()))
        .collect();

    let fallback: Arc<dyn PlistPlugin> = if fallback.name() == DefaultPlugin::NAME {
        Arc::new(DefaultPlugin::with_max_depth(config.default_plugin_depth))
    } else {
        fallback
    };
    plugins.push(fallback);

    dispatch(&document.filename, &document.top_level, &plugins)
}

/// Problems with `config` that dispatch works around rather than rejects.
fn config_warnings(config: &ParserConfig, registry: &PlistPluginRegistry) -> Vec<String> {
    let fallback = registry.fallback();
    let mut warnings = Vec::new();

    for name in &config.disabled_plugins {
        if name == fallback.name() {
            warnings.push(format!("Fallback plugin '{}' cannot be disabled, ignoring", name));
        } else if !registry.contains(name) {
            warnings.push(format!("Disabled plist plugin '{}' is not registered", name));
        }
    }

    for name in config.plugins.iter().flatten() {
        if name == fallback.name() {
            warnings.push(format!(
                "Fallback plugin '{}' does not need to be allowed, it always runs",
                name
            ));
        } else if !registry.contains(name) {
            warnings.push(format!("Allowed plist plugin '{}' is not registered", name));
        }
    }

    warnings
}
