//! Error types for plistsift.
//!
//! All fallible operations return [`PlistSiftError`] through the crate-wide
//! [`Result`] alias. Errors are built with `thiserror` and keep their source chain.
//!
//! # Error Handling Philosophy
//!
//! **Plugin rejection is recoverable:**
//! - `PlistSiftError::WrongPlistPlugin` means "this plugin does not apply to this
//!   document". The dispatcher consumes it and moves on to the next plugin. It only
//!   reaches callers that invoke a single plugin's `process` directly.
//!
//! **Setup problems are fatal:**
//! - `Configuration` - no plugin could possibly handle a document (empty plugin set)
//! - `Validation` - invalid plugin names, unreadable or malformed config files
//!
//! **System errors bubble up unchanged:**
//! - `Io` (from `std::io::Error`)
//!
//! # Example
//!
//! ```rust
//! use plistsift::{PlistSiftError, Result};
//!
//! fn load(path: &str) -> Result<String> {
//!     let content = std::fs::read_to_string(path)?;
//!     if content.is_empty() {
//!         return Err(PlistSiftError::validation(format!("Config file is empty: {}", path)));
//!     }
//!     Ok(content)
//! }
//! ```
use std::fmt;
use thiserror::Error;

/// Result type alias using `PlistSiftError`.
pub type Result<T> = std::result::Result<T, PlistSiftError>;

/// Main error type for all plistsift operations.
#[derive(Debug, Error)]
pub enum PlistSiftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    WrongPlistPlugin(#[from] WrongPlistPlugin),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Plugin error in '{plugin_name}': {message}")]
    Plugin { message: String, plugin_name: String },

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("{0}")]
    Other(String),
}

impl PlistSiftError {
    /// Create a Validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Create a Validation error with source
    pub fn validation_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a Serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization {
            message: message.into(),
            source: None,
        }
    }

    /// Create a Serialization error with source
    pub fn serialization_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Serialization {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns `true` for a plugin rejection, which the dispatcher treats as "try the next plugin".
    pub fn is_wrong_plugin(&self) -> bool {
        matches!(self, Self::WrongPlistPlugin(_))
    }
}

impl From<serde_json::Error> for PlistSiftError {
    fn from(err: serde_json::Error) -> Self {
        PlistSiftError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// Why a plugin declined a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// The filename does not contain the plugin's path pattern.
    FilenameMismatch,
    /// One or more required top-level keys are absent.
    MissingKeys(Vec<String>),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::FilenameMismatch => write!(f, "filename does not match"),
            RejectionReason::MissingKeys(keys) => write!(f, "missing required keys [{}]", keys.join(", ")),
        }
    }
}

/// A plugin does not apply to a given plist.
///
/// Carries everything needed to explain the rejection: the filename, the plugin and
/// what it expected, and the keys the document actually had at its top level.
#[derive(Debug, Clone, Error)]
#[error("Wrong plist plugin '{plugin_name}' for '{filename}' ({reason}; expected path '{expected_path}', keys {required_keys:?})")]
pub struct WrongPlistPlugin {
    pub filename: String,
    pub plugin_name: String,
    pub expected_path: String,
    pub required_keys: Vec<String>,
    pub present_keys: Vec<String>,
    pub reason: RejectionReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection(reason: RejectionReason) -> WrongPlistPlugin {
        WrongPlistPlugin {
            filename: "wrong_file.plist".to_string(),
            plugin_name: "BluetoothPlugin".to_string(),
            expected_path: "com.apple.bluetooth.plist".to_string(),
            required_keys: vec!["DeviceCache".to_string(), "PairedDevices".to_string()],
            present_keys: vec!["DeviceCache".to_string()],
            reason,
        }
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlistSiftError = io_err.into();
        assert!(matches!(err, PlistSiftError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_validation_error() {
        let err = PlistSiftError::validation("invalid input");
        assert_eq!(err.to_string(), "Validation error: invalid input");
    }

    #[test]
    fn test_validation_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::InvalidInput, "bad param");
        let err = PlistSiftError::validation_with_source("invalid input", source);
        assert_eq!(err.to_string(), "Validation error: invalid input");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_serialization_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad format");
        let err = PlistSiftError::serialization_with_source("JSON parse error", source);
        assert_eq!(err.to_string(), "Serialization error: JSON parse error");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: PlistSiftError = json_err.into();
        assert!(matches!(err, PlistSiftError::Serialization { .. }));
    }

    #[test]
    fn test_configuration_error() {
        let err = PlistSiftError::Configuration("no plist plugins registered".to_string());
        assert_eq!(err.to_string(), "Configuration error: no plist plugins registered");
        assert!(!err.is_wrong_plugin());
    }

    #[test]
    fn test_plugin_error() {
        let err = PlistSiftError::Plugin {
            message: "extraction failed".to_string(),
            plugin_name: "BluetoothPlugin".to_string(),
        };
        assert_eq!(err.to_string(), "Plugin error in 'BluetoothPlugin': extraction failed");
    }

    #[test]
    fn test_wrong_plugin_filename_message() {
        let err = rejection(RejectionReason::FilenameMismatch);
        let message = err.to_string();
        assert!(message.contains("BluetoothPlugin"));
        assert!(message.contains("wrong_file.plist"));
        assert!(message.contains("filename does not match"));
    }

    #[test]
    fn test_wrong_plugin_missing_keys_message() {
        let err = rejection(RejectionReason::MissingKeys(vec!["PairedDevices".to_string()]));
        assert!(err.to_string().contains("missing required keys [PairedDevices]"));
    }

    #[test]
    fn test_wrong_plugin_converts_transparently() {
        let inner = rejection(RejectionReason::FilenameMismatch);
        let expected = inner.to_string();
        let err: PlistSiftError = inner.into();
        assert!(err.is_wrong_plugin());
        assert_eq!(err.to_string(), expected);
    }
}
