//! Base plugin trait definition.
//!
//! All plugins implement [`Plugin`], which provides identification and lifecycle
//! hooks. The plist-specific contract lives in [`crate::plugins::PlistPlugin`].

use crate::Result;

/// Base trait that all plugins must implement.
///
/// # Thread Safety
///
/// Plugins are shared as `Arc<dyn PlistPlugin>` and must be `Send + Sync`.
///
/// # Example
///
/// ```rust
/// use plistsift::plugins::Plugin;
/// use plistsift::Result;
///
/// struct InstallHistoryPlugin;
///
/// impl Plugin for InstallHistoryPlugin {
///     fn name(&self) -> &str {
///         "InstallHistoryPlugin"
///     }
///
///     fn version(&self) -> String {
///         "1.0.0".to_string()
///     }
///
///     fn initialize(&self) -> Result<()> {
///         Ok(())
///     }
///
///     fn shutdown(&self) -> Result<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    /// Returns the unique name/identifier for this plugin.
    ///
    /// The name must be non-empty and contain no whitespace. Built-in plist
    /// plugins use CamelCase names such as `"DefaultPlugin"`.
    fn name(&self) -> &str;

    /// Returns the semantic version of this plugin.
    fn version(&self) -> String;

    /// Initialize the plugin.
    ///
    /// Called once when the plugin is registered. The plugin is not registered if
    /// this returns an error.
    fn initialize(&self) -> Result<()>;

    /// Shutdown the plugin.
    ///
    /// Called when the plugin is removed from a registry.
    fn shutdown(&self) -> Result<()>;

    /// Optional plugin description for debugging and logging.
    fn description(&self) -> &str {
        ""
    }

    /// Optional plugin author information.
    fn author(&self) -> &str {
        ""
    }
}
