//! Bluetooth device cache plugin (`com.apple.bluetooth.plist`).

use crate::Result;
use crate::plugins::{Plugin, PlistPlugin};
use crate::traversal::get_keys;
use crate::types::{Dictionary, PlistEvent, PlistValue};
use std::collections::HashSet;

/// Per-device timestamp fields and how each one is described.
const DEVICE_TIMESTAMPS: &[(&str, &str)] = &[
    ("LastInquiryUpdate", "Bluetooth discovery"),
    ("LastNameUpdate", "Device name set"),
    ("LastServicesUpdate", "Services updated"),
];

/// Reports when known Bluetooth devices were discovered, renamed, or had their
/// services refreshed.
///
/// Devices live under `DeviceCache`, keyed by hardware address. Addresses listed in
/// `PairedDevices` are reported as paired.
#[derive(Debug, Clone, Default)]
pub struct BluetoothPlugin;

impl BluetoothPlugin {
    pub const NAME: &'static str = "BluetoothPlugin";

    pub fn new() -> Self {
        Self
    }
}

impl Plugin for BluetoothPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn description(&self) -> &str {
        "Bluetooth device cache timestamps"
    }
}

impl PlistPlugin for BluetoothPlugin {
    fn plist_path(&self) -> &str {
        "com.apple.bluetooth.plist"
    }

    fn plist_keys(&self) -> &[&str] {
        &["DeviceCache", "PairedDevices"]
    }

    fn get_entries(&self, top_level: &Dictionary) -> Result<Vec<PlistEvent>> {
        let found = get_keys(top_level, &["DeviceCache", "PairedDevices"]);

        let paired: HashSet<&str> = found
            .get("PairedDevices")
            .and_then(|value| value.as_array())
            .map(|devices| devices.iter().filter_map(PlistValue::as_str).collect())
            .unwrap_or_default();

        let Some(cache) = found.get("DeviceCache").and_then(|value| value.as_dictionary()) else {
            tracing::debug!("Bluetooth DeviceCache is not a dictionary, no events extracted");
            return Ok(Vec::new());
        };

        let mut events = Vec::new();

        for (address, device) in cache {
            let Some(device) = device.as_dictionary() else {
                tracing::debug!(
                    "Skipping Bluetooth device {}: expected dictionary, found {}",
                    address,
                    device.kind()
                );
                continue;
            };

            let name = device.get("Name").and_then(PlistValue::as_str).unwrap_or("unknown");
            let state = if paired.contains(address.as_str()) {
                "paired"
            } else {
                "unpaired"
            };
            let root = format!("/DeviceCache/{}", address);

            for (key, label) in DEVICE_TIMESTAMPS {
                match device.get(*key) {
                    Some(PlistValue::Date(date)) => events.push(
                        PlistEvent::from_date(root.as_str(), *key, date)
                            .with_description(format!("{}: {} ({})", label, name, state)),
                    ),
                    Some(other) => tracing::debug!(
                        "Skipping {} of Bluetooth device {}: expected date, found {}",
                        key,
                        address,
                        other.kind()
                    ),
                    None => {}
                }
            }
        }

        Ok(events)
    }
}
