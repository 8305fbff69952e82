//! Fallback plugin used when no specialized plugin accepts a plist.

use crate::Result;
use crate::plugins::{Plugin, PlistPlugin};
use crate::traversal::recurse_key;
use crate::types::{Dictionary, PlistEvent};

/// How many dictionary levels [`DefaultPlugin`] searches unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 15;

/// Catch-all plugin: accepts every plist and reports every date it can find.
///
/// Each `Date` value within `max_depth` levels becomes one event whose root is the
/// top-level key it was found under.
#[derive(Debug, Clone)]
pub struct DefaultPlugin {
    max_depth: usize,
}

impl Default for DefaultPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultPlugin {
    pub const NAME: &'static str = "DefaultPlugin";

    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Plugin for DefaultPlugin {
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
        "Extracts every date value from plists no other plugin handles"
    }
}

impl PlistPlugin for DefaultPlugin {
    fn plist_path(&self) -> &str {
        ""
    }

    fn plist_keys(&self) -> &[&str] {
        &[]
    }

    fn priority(&self) -> i32 {
        i32::MIN
    }

    fn get_entries(&self, top_level: &Dictionary) -> Result<Vec<PlistEvent>> {
        let events = recurse_key(top_level, self.max_depth)
            .filter_map(|entry| {
                entry
                    .value
                    .as_date()
                    .map(|date| PlistEvent::from_date(format!("/{}", entry.root), entry.key, date))
            })
            .collect();

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlistValue;
    use chrono::{TimeZone, Utc};

    fn nested_dates() -> Dictionary {
        let installed = Utc.with_ymd_and_hms(2013, 6, 1, 12, 0, 0).unwrap();
        let updated = Utc.with_ymd_and_hms(2013, 7, 4, 8, 30, 0).unwrap();

        let mut deep = Dictionary::new();
        deep.insert("Updated".to_string(), PlistValue::Date(updated));
        deep.insert("Version".to_string(), PlistValue::from("1.2"));

        let mut app = Dictionary::new();
        app.insert("Details".to_string(), PlistValue::Dictionary(deep));

        let mut top = Dictionary::new();
        top.insert("Installed".to_string(), PlistValue::Date(installed));
        top.insert("App".to_string(), PlistValue::Dictionary(app));
        top.insert("Name".to_string(), PlistValue::from("Finder"));
        top
    }

    #[test]
    fn test_accepts_anything() {
        let plugin = DefaultPlugin::new();
        assert!(plugin.matches("whatever.PLIST", &Dictionary::new()).is_ok());
        assert!(plugin.matches("", &nested_dates()).is_ok());
    }

    #[test]
    fn test_extracts_all_dates() {
        let plugin = DefaultPlugin::new();
        let events = plugin.get_entries(&nested_dates()).unwrap();
        assert_eq!(events.len(), 2);

        let installed = events.iter().find(|event| event.key == "Installed").unwrap();
        assert_eq!(installed.root, "/Installed");
        assert_eq!(
            installed.timestamp,
            Utc.with_ymd_and_hms(2013, 6, 1, 12, 0, 0).unwrap().timestamp_micros()
        );

        let updated = events.iter().find(|event| event.key == "Updated").unwrap();
        assert_eq!(updated.root, "/App");
    }

    #[test]
    fn test_max_depth_limits_search() {
        let plugin = DefaultPlugin::with_max_depth(2);
        assert_eq!(plugin.max_depth(), 2);

        let events = plugin.get_entries(&nested_dates()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, "Installed");
    }

    #[test]
    fn test_no_dates_no_events() {
        let mut top = Dictionary::new();
        top.insert("Name".to_string(), PlistValue::from("Finder"));
        assert!(DefaultPlugin::new().get_entries(&top).unwrap().is_empty());
    }
}
