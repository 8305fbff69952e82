//! Plugin system for interpreting specific plists.
//!
//! # Plugin Types
//!
//! - [`Plugin`] - Base trait that all plugins must implement
//! - [`PlistPlugin`] - Decides whether a plist applies and extracts its events
//!
//! # Lifecycle Pattern
//!
//! Plugins are stored in `Arc<dyn PlistPlugin>` for thread-safe shared access:
//!
//! ```rust
//! use plistsift::plugins::{Plugin, PlistPlugin};
//! use plistsift::plugins::registry::PlistPluginRegistry;
//! use plistsift::{Dictionary, PlistDocument, PlistEvent, Result};
//! use std::sync::Arc;
//!
//! struct LoginWindowPlugin;
//!
//! impl Plugin for LoginWindowPlugin {
//!     fn name(&self) -> &str { "LoginWindowPlugin" }
//!     fn version(&self) -> String { "1.0.0".to_string() }
//!     fn initialize(&self) -> Result<()> { Ok(()) }
//!     fn shutdown(&self) -> Result<()> { Ok(()) }
//! }
//!
//! impl PlistPlugin for LoginWindowPlugin {
//!     fn plist_path(&self) -> &str { "com.apple.loginwindow.plist" }
//!     fn plist_keys(&self) -> &[&str] { &["lastUserName"] }
//!     fn get_entries(&self, _top_level: &Dictionary) -> Result<Vec<PlistEvent>> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! // 1. Create the registry (DefaultPlugin is installed as fallback)
//! let mut registry = PlistPluginRegistry::new();
//!
//! // 2. Register (calls initialize internally)
//! registry.register(Arc::new(LoginWindowPlugin))?;
//!
//! // 3. Dispatch
//! let mut top = Dictionary::new();
//! top.insert("lastUserName".to_string(), "admin".into());
//! let document = PlistDocument::new("/Library/Preferences/com.apple.loginwindow.plist", top);
//! assert_eq!(registry.dispatch(&document)?.plugin_name, "LoginWindowPlugin");
//! # Ok::<(), plistsift::PlistSiftError>(())
//! ```
//!
//! # Safety and Threading
//!
//! Plugins must be `Send + Sync` and are called through `&self`. They keep no state
//! between calls to `matches`, `get_entries` or `process`.

mod plist;
pub mod registry;
mod traits;

pub use plist::{
    PlistPlugin, clear_plist_plugins, get_plist_plugins, list_plist_plugins, register_plist_plugin,
    unregister_plist_plugin,
};
pub use traits::Plugin;
