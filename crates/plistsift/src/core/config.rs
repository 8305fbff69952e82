//! Configuration loading and management.
//!
//! [`ParserConfig`] controls which plist plugins take part in dispatch and how deep
//! the fallback plugin walks. It can be loaded from TOML, YAML, or JSON files, or
//! discovered as `plistsift.toml` in the current directory or one of its parents.

use crate::extractors::default::DEFAULT_MAX_DEPTH;
use crate::{PlistSiftError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the file searched for by [`ParserConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "plistsift.toml";

/// Plist parsing configuration.
///
/// # Example
///
/// ```rust
/// use plistsift::core::config::ParserConfig;
///
/// let config = ParserConfig::default();
/// assert_eq!(config.default_plugin_depth, 15);
/// assert!(config.is_plugin_enabled("BluetoothPlugin"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// How many dictionary levels the fallback plugin searches for timestamps
    #[serde(default = "default_plugin_depth")]
    pub default_plugin_depth: usize,

    /// Specialized plugins that never take part in dispatch
    #[serde(default)]
    pub disabled_plugins: Vec<String>,

    /// Only these specialized plugins take part in dispatch (None = all)
    #[serde(default)]
    pub plugins: Option<Vec<String>>,
}

fn default_plugin_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_plugin_depth: default_plugin_depth(),
            disabled_plugins: Vec::new(),
            plugins: None,
        }
    }
}

impl ParserConfig {
    /// Whether a specialized plugin may be tried during dispatch.
    ///
    /// The fallback plugin is not subject to this check.
    pub fn is_plugin_enabled(&self, name: &str) -> bool {
        if self.disabled_plugins.iter().any(|disabled| disabled == name) {
            return false;
        }

        match &self.plugins {
            Some(allowed) => allowed.iter().any(|allowed| allowed == name),
            None => true,
        }
    }

    /// Check the configuration for values that cannot work.
    ///
    /// # Errors
    ///
    /// Returns `PlistSiftError::Validation` if `default_plugin_depth` is 0.
    pub fn validate(&self) -> Result<()> {
        if self.default_plugin_depth == 0 {
            return Err(PlistSiftError::validation("default_plugin_depth must be at least 1"));
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `PlistSiftError::Validation` if the file can't be read, is invalid TOML,
    /// or fails [`validate`](Self::validate).
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| PlistSiftError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        let config: Self = serde_yaml_ng::from_str(&content)
            .map_err(|e| PlistSiftError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| PlistSiftError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, picking the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns `PlistSiftError::Validation` for extensions other than `toml`, `yaml`,
    /// `yml` and `json`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(PlistSiftError::validation(format!(
                "Unsupported config file format: {}",
                path.display()
            ))),
        }
    }

    /// Discover configuration file in parent directories.
    ///
    /// Searches for `plistsift.toml` in the current directory and its parents.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir().map_err(PlistSiftError::Io)?;
        Self::discover_from(&current)
    }

    /// Same as [`discover`](Self::discover), starting from `start` instead of the
    /// current directory.
    pub fn discover_from(start: impl AsRef<Path>) -> Result<Option<Self>> {
        let mut current = Some(start.as_ref());

        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                return Ok(Some(Self::from_toml_file(candidate)?));
            }
            current = dir.parent();
        }

        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| PlistSiftError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
