//! Core dispatch orchestration module.
//!
//! - **Dispatch** (`dispatch`): picks the plugin that handles a document and runs it
//! - **Configuration** (`config`): loading and discovering `ParserConfig`
//!
//! # Example
//!
//! ```rust
//! use plistsift::core::config::ParserConfig;
//! use plistsift::core::dispatch::dispatch_with_config;
//! use plistsift::{Dictionary, PlistDocument};
//!
//! # fn main() -> plistsift::Result<()> {
//! let config = ParserConfig::default();
//! let document = PlistDocument::new("com.apple.finder.plist", Dictionary::new());
//! let result = dispatch_with_config(&document, &config)?;
//! println!("{} produced {} events", result.plugin_name, result.events.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatch;

pub use config::ParserConfig;
pub use dispatch::{Dispatch, dispatch, dispatch_document, dispatch_with_config};
