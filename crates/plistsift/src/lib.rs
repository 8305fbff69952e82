//! plistsift - plugin-driven timeline extraction from Apple property lists
//!
//! plistsift takes an already decoded plist, finds the plugin that understands it,
//! and returns the timeline events that plugin extracts. Plugins declare a filename
//! pattern and the top-level keys they need; a fallback plugin handles everything
//! else.
//!
//! # Quick Start
//!
//! ```rust
//! use plistsift::{PlistDocument, dispatch_document};
//!
//! # fn main() -> plistsift::Result<()> {
//! let json = br#"{
//!     "DeviceCache": {
//!         "44-00-00-00-00-02": {
//!             "Name": "test-macpro",
//!             "LastInquiryUpdate": {"$date": "2012-11-02T01:43:28Z"}
//!         }
//!     },
//!     "PairedDevices": []
//! }"#;
//! let document = PlistDocument::from_json_slice("com.apple.bluetooth.plist", json)?;
//!
//! let result = dispatch_document(&document)?;
//! assert_eq!(result.plugin_name, "BluetoothPlugin");
//! assert_eq!(result.events.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Types** (`types`): the decoded value tree, documents, and events
//! - **Traversal** (`traversal`): depth-bounded key search over nested dictionaries
//! - **Plugin System** (`plugins`): the plugin contract and registry
//! - **Built-in Plugins** (`extractors`): fallback and specialized plugins
//! - **Core** (`core`): dispatch and configuration

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod extractors;
pub mod plugins;
pub mod traversal;
pub mod types;

pub use error::{PlistSiftError, RejectionReason, Result, WrongPlistPlugin};
pub use types::*;

pub use crate::core::config::ParserConfig;
pub use crate::core::dispatch::{Dispatch, dispatch, dispatch_document, dispatch_with_config};

pub use traversal::{RecurseKey, TraversalEntry, get_keys, get_keys_with_depth, recurse_key};

pub use plugins::registry::get_plist_plugin_registry;
pub use plugins::{PlistPlugin, Plugin, get_plist_plugins};
