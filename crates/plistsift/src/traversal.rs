//! Depth-bounded traversal of nested plist dictionaries.
//!
//! [`recurse_key`] walks a dictionary level by level and lazily yields every key it
//! meets, tagged with the top-level key it was found under. [`get_keys`] and
//! [`get_keys_with_depth`] build on it to pull specific keys out of a document.
//!
//! Only dictionaries are descended into. Arrays and scalars are leaves.
//!
//! # Example
//!
//! ```rust
//! use plistsift::traversal::{get_keys_with_depth, recurse_key};
//! use plistsift::{Dictionary, PlistValue};
//!
//! let mut device = Dictionary::new();
//! device.insert("Name".to_string(), PlistValue::from("test-macpro"));
//! let mut cache = Dictionary::new();
//! cache.insert("44-00-00-00-00-02".to_string(), PlistValue::Dictionary(device));
//! let mut top = Dictionary::new();
//! top.insert("DeviceCache".to_string(), PlistValue::Dictionary(cache));
//!
//! assert_eq!(recurse_key(&top, 1).count(), 1);
//! assert_eq!(recurse_key(&top, 2).count(), 2);
//!
//! let found = get_keys_with_depth(&top, &["44-00-00-00-00-02"], 2);
//! let name = found["44-00-00-00-00-02"].as_dictionary().unwrap()["Name"].as_str();
//! assert_eq!(name, Some("test-macpro"));
//! ```

use crate::types::{Dictionary, PlistValue};
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::iter::FusedIterator;

/// One key discovered during a walk.
///
/// `root` is the top-level key the entry lives under. For top-level entries it equals `key`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraversalEntry<'a> {
    pub root: &'a str,
    pub key: &'a str,
    pub value: &'a PlistValue,
}

#[derive(Debug, Clone)]
struct Level<'a> {
    root: Option<&'a str>,
    entries: indexmap::map::Iter<'a, String, PlistValue>,
    remaining_depth: usize,
}

/// Lazy breadth-first walk over a dictionary, created by [`recurse_key`].
///
/// Nested dictionaries are queued when their parent key is yielded and are only
/// iterated once every entry of the current level has been produced. Dropping the
/// iterator early leaves the rest of the structure untouched.
#[derive(Debug, Clone)]
pub struct RecurseKey<'a> {
    current: Option<Level<'a>>,
    pending: VecDeque<Level<'a>>,
}

impl<'a> Iterator for RecurseKey<'a> {
    type Item = TraversalEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current.is_none() {
                self.current = Some(self.pending.pop_front()?);
            }

            let level = self.current.as_mut()?;

            let Some((key, value)) = level.entries.next() else {
                self.current = None;
                continue;
            };

            let root = level.root.unwrap_or(key.as_str());

            if level.remaining_depth > 1
                && let PlistValue::Dictionary(nested) = value
            {
                let remaining_depth = level.remaining_depth - 1;
                self.pending.push_back(Level {
                    root: Some(root),
                    entries: nested.iter(),
                    remaining_depth,
                });
            }

            return Some(TraversalEntry { root, key, value });
        }
    }
}

impl FusedIterator for RecurseKey<'_> {}

/// Walk `root` down to `depth` levels.
///
/// Depth 1 yields the top-level keys only. Each additional level adds the keys of
/// dictionaries found one level further down. A depth of 0 yields nothing.
pub fn recurse_key(root: &Dictionary, depth: usize) -> RecurseKey<'_> {
    let current = (depth > 0).then(|| Level {
        root: None,
        entries: root.iter(),
        remaining_depth: depth,
    });

    RecurseKey {
        current,
        pending: VecDeque::new(),
    }
}

/// Collect the top-level entries of `root` whose key is one of `keys`.
///
/// Equivalent to [`get_keys_with_depth`] with a depth of 1.
pub fn get_keys<'a, S: AsRef<str>>(root: &'a Dictionary, keys: &[S]) -> IndexMap<&'a str, &'a PlistValue> {
    get_keys_with_depth(root, keys, 1)
}

/// Collect every entry within `depth` levels whose key exactly matches one of `keys`.
///
/// Matching is case-sensitive. When the same key appears under several branches the
/// entry visited last wins. Keys that are never found are absent from the result.
pub fn get_keys_with_depth<'a, S: AsRef<str>>(
    root: &'a Dictionary,
    keys: &[S],
    depth: usize,
) -> IndexMap<&'a str, &'a PlistValue> {
    let mut found = IndexMap::new();

    for entry in recurse_key(root, depth) {
        if keys.iter().any(|wanted| wanted.as_ref() == entry.key) {
            found.insert(entry.key, entry.value);
        }
    }

    found
}
