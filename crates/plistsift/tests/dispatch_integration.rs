//! End-to-end dispatch through the global plugin registry.

use anyhow::Result;
use plistsift::extractors::BluetoothPlugin;
use plistsift::plugins::{clear_plist_plugins, list_plist_plugins, register_plist_plugin, unregister_plist_plugin};
use plistsift::{
    Dictionary, ParserConfig, PlistDocument, PlistEvent, PlistPlugin, PlistValue, Plugin, dispatch_document,
    dispatch_with_config, get_keys,
};
use serial_test::serial;
use std::sync::Arc;
use std::thread;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const BLUETOOTH_JSON: &[u8] = br#"{
    "DeviceCache": {
        "44-00-00-00-00-04": {
            "Name": "Apple Magic Trackpad 2",
            "LastInquiryUpdate": {"$date": "2012-11-02T01:43:28.261762Z"},
            "LastNameUpdate": {"$date": "2012-11-02T01:13:17Z"}
        },
        "44-00-00-00-00-02": {
            "Name": "test-macpro",
            "LastInquiryUpdate": {"$date": "2012-11-02T01:43:28Z"},
            "ClockOffset": 28180
        }
    },
    "PairedDevices": ["44-00-00-00-00-04"]
}"#;

struct LoginWindowPlugin;

impl Plugin for LoginWindowPlugin {
    fn name(&self) -> &str {
        "LoginWindowPlugin"
    }

    fn version(&self) -> String {
        "1.0.0".to_string()
    }

    fn initialize(&self) -> plistsift::Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> plistsift::Result<()> {
        Ok(())
    }
}

impl PlistPlugin for LoginWindowPlugin {
    fn plist_path(&self) -> &str {
        "com.apple.loginwindow.plist"
    }

    fn plist_keys(&self) -> &[&str] {
        &["lastUserName", "lastLoginTime"]
    }

    fn get_entries(&self, top_level: &Dictionary) -> plistsift::Result<Vec<PlistEvent>> {
        let found = get_keys(top_level, &["lastUserName", "lastLoginTime"]);
        let user = found.get("lastUserName").and_then(|value| value.as_str()).unwrap_or("unknown");

        Ok(found
            .get("lastLoginTime")
            .and_then(|value| value.as_date())
            .map(|date| {
                PlistEvent::from_date("/lastLoginTime", "lastLoginTime", date)
                    .with_description(format!("Last login by {}", user))
            })
            .into_iter()
            .collect())
    }
}

fn loginwindow_document() -> Result<PlistDocument> {
    let json = br#"{
        "lastUserName": "admin",
        "lastLoginTime": {"$date": "2013-05-01T10:00:00Z"},
        "RetriesUntilHint": 3
    }"#;
    Ok(PlistDocument::from_json_slice(
        "/Library/Preferences/com.apple.loginwindow.plist",
        json,
    )?)
}

#[test]
#[serial]
fn test_bluetooth_plist_goes_to_bluetooth_plugin() -> Result<()> {
    init_tracing();

    let document = PlistDocument::from_json_slice("/Library/Preferences/com.apple.Bluetooth.plist", BLUETOOTH_JSON)?;
    let result = dispatch_document(&document)?;

    assert_eq!(result.plugin_name, "BluetoothPlugin");
    assert_eq!(result.events.len(), 3);

    let discovery = result
        .events
        .iter()
        .find(|event| event.root == "/DeviceCache/44-00-00-00-00-04" && event.key == "LastInquiryUpdate")
        .expect("trackpad discovery event");
    assert_eq!(discovery.timestamp, 1_351_820_608_261_762);
    assert_eq!(
        discovery.description.as_deref(),
        Some("Bluetooth discovery: Apple Magic Trackpad 2 (paired)")
    );

    Ok(())
}

#[test]
#[serial]
fn test_unknown_plist_falls_back_to_default_plugin() -> Result<()> {
    init_tracing();

    let document = PlistDocument::from_json_slice("com.example.unknown.plist", BLUETOOTH_JSON)?;
    let result = dispatch_document(&document)?;

    assert_eq!(result.plugin_name, "DefaultPlugin");
    assert_eq!(result.events.len(), 3);
    assert!(result.events.iter().all(|event| event.root == "/DeviceCache"));

    Ok(())
}

#[test]
#[serial]
fn test_registered_plugin_takes_part_in_dispatch() -> Result<()> {
    init_tracing();

    register_plist_plugin(Arc::new(LoginWindowPlugin))?;

    let result = dispatch_document(&loginwindow_document()?)?;
    assert_eq!(result.plugin_name, "LoginWindowPlugin");
    assert_eq!(result.events.len(), 1);
    assert_eq!(result.events[0].description.as_deref(), Some("Last login by admin"));

    unregister_plist_plugin("LoginWindowPlugin")?;

    let result = dispatch_document(&loginwindow_document()?)?;
    assert_eq!(result.plugin_name, "DefaultPlugin");

    Ok(())
}

#[test]
#[serial]
fn test_disabled_plugin_is_skipped() -> Result<()> {
    init_tracing();

    let document = PlistDocument::from_json_slice("com.apple.bluetooth.plist", BLUETOOTH_JSON)?;
    let config = ParserConfig {
        disabled_plugins: vec!["BluetoothPlugin".to_string(), "DefaultPlugin".to_string()],
        ..Default::default()
    };

    let result = dispatch_with_config(&document, &config)?;
    assert_eq!(result.plugin_name, "DefaultPlugin");
    assert_eq!(result.events.len(), 3);

    Ok(())
}

#[test]
#[serial]
fn test_config_file_limits_fallback_depth() -> Result<()> {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("plistsift.toml");
    std::fs::write(
        &path,
        r#"
default_plugin_depth = 2
plugins = []
"#,
    )?;

    let config = ParserConfig::from_file(&path)?;
    assert_eq!(config.default_plugin_depth, 2);
    assert!(!config.is_plugin_enabled("BluetoothPlugin"));

    // Device timestamps sit three levels down, beyond the configured depth.
    let document = PlistDocument::from_json_slice("com.apple.bluetooth.plist", BLUETOOTH_JSON)?;
    let result = dispatch_with_config(&document, &config)?;
    assert_eq!(result.plugin_name, "DefaultPlugin");
    assert!(result.events.is_empty());

    Ok(())
}

#[test]
#[serial]
fn test_invalid_config_is_rejected() -> Result<()> {
    let document = PlistDocument::new("com.apple.bluetooth.plist", Dictionary::new());
    let config = ParserConfig {
        default_plugin_depth: 0,
        ..Default::default()
    };

    let err = dispatch_with_config(&document, &config).unwrap_err();
    assert!(matches!(err, plistsift::PlistSiftError::Validation { .. }));

    Ok(())
}

#[test]
#[serial]
fn test_rejections_never_escape_dispatch() -> Result<()> {
    let mut top = Dictionary::new();
    top.insert("DeviceCache".to_string(), PlistValue::from("not a dictionary"));

    // Bluetooth filename but missing PairedDevices: Bluetooth rejects, fallback accepts.
    let result = dispatch_document(&PlistDocument::new("com.apple.bluetooth.plist", top))?;
    assert_eq!(result.plugin_name, "DefaultPlugin");
    assert!(result.events.is_empty());

    Ok(())
}

#[test]
#[serial]
fn test_concurrent_dispatch() -> Result<()> {
    let document = Arc::new(PlistDocument::from_json_slice(
        "com.apple.bluetooth.plist",
        BLUETOOTH_JSON,
    )?);
    let expected = dispatch_document(&document)?;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let document = Arc::clone(&document);
            thread::spawn(move || dispatch_document(&document))
        })
        .collect();

    for handle in handles {
        let result = handle.join().expect("dispatch thread panicked")?;
        assert_eq!(result, expected);
    }

    Ok(())
}

#[test]
#[serial]
fn test_unregistered_builtin_stays_unregistered() -> Result<()> {
    init_tracing();

    let document = PlistDocument::from_json_slice("com.apple.bluetooth.plist", BLUETOOTH_JSON)?;
    assert_eq!(dispatch_document(&document)?.plugin_name, "BluetoothPlugin");

    unregister_plist_plugin("BluetoothPlugin")?;
    assert_eq!(dispatch_document(&document)?.plugin_name, "DefaultPlugin");
    assert_eq!(dispatch_document(&document)?.plugin_name, "DefaultPlugin");

    clear_plist_plugins()?;
    assert_eq!(dispatch_document(&document)?.plugin_name, "DefaultPlugin");
    assert_eq!(list_plist_plugins()?, vec!["DefaultPlugin".to_string()]);

    register_plist_plugin(Arc::new(BluetoothPlugin::new()))?;
    assert_eq!(dispatch_document(&document)?.plugin_name, "BluetoothPlugin");

    Ok(())
}

#[test]
#[serial]
fn test_date_like_strings_are_not_events() -> Result<()> {
    let json = br#"{
        "Comment": "2012-11-02T01:43:28Z",
        "Installed": {"$date": "2013-06-01T12:00:00Z"},
        "Icon": {"$data": "iVBORw=="}
    }"#;
    let document = PlistDocument::from_json_slice("com.example.app.plist", json)?;
    assert_eq!(document.top_level["Comment"].kind(), "string");
    assert_eq!(document.top_level["Icon"].kind(), "data");

    let result = dispatch_document(&document)?;
    assert_eq!(result.plugin_name, "DefaultPlugin");
    assert_eq!(result.events.len(), 1);
    assert_eq!(result.events[0].key, "Installed");

    let reloaded = PlistDocument::from_json_slice("com.example.app.plist", &serde_json::to_vec(&document.top_level)?)?;
    assert_eq!(reloaded, document);

    Ok(())
}
