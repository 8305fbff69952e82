//! Built-in plist plugins.
//!
//! [`DefaultPlugin`] is the fallback every registry carries. The specialized
//! plugins here are registered with the global registry on first use.

use crate::Result;
use crate::plugins::registry::get_plist_plugin_registry;
use once_cell::sync::Lazy;
use std::sync::Arc;

pub mod bluetooth;
pub mod default;

pub use bluetooth::BluetoothPlugin;
pub use default::{DEFAULT_MAX_DEPTH, DefaultPlugin};

/// Lazy-initialized flag that ensures built-in plugins are registered exactly once.
static PLUGINS_INITIALIZED: Lazy<Result<()>> = Lazy::new(register_default_plugins);

/// Ensure built-in plugins are registered.
///
/// Registration happens once per process. Plugins removed afterwards (through
/// `unregister_plist_plugin` or `clear_plist_plugins`) stay removed; call
/// [`register_default_plugins`] to bring them back.
pub fn ensure_initialized() -> Result<()> {
    PLUGINS_INITIALIZED
        .as_ref()
        .map(|_| ())
        .map_err(|e| crate::PlistSiftError::Plugin {
            message: format!("Failed to register built-in plist plugins: {}", e),
            plugin_name: "built-in-plugins".to_string(),
        })
}

/// Register all built-in specialized plugins with the global registry.
///
/// Called automatically on first dispatch. Explicit calling is optional.
///
/// # Example
///
/// ```rust
/// use plistsift::extractors::register_default_plugins;
///
/// # fn main() -> plistsift::Result<()> {
/// register_default_plugins()?;
/// # Ok(())
/// # }
/// ```
pub fn register_default_plugins() -> Result<()> {
    let registry = get_plist_plugin_registry();
    let mut registry = registry
        .write()
        .map_err(|e| crate::PlistSiftError::LockPoisoned(format!("Plist plugin registry lock poisoned: {}", e)))?;

    registry.register(Arc::new(BluetoothPlugin::new()))?;

    Ok(())
}
