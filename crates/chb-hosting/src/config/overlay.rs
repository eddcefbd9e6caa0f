//! In-memory configuration overlay
//!
//! An ordered sequence of key/value pairs merged into the host configuration
//! ahead of host construction. Later occurrences of a key override earlier
//! ones. Keys use `.`-separated paths matching the TOML section layout, and
//! a value may be absent entirely (bare-flag semantics).

use std::collections::BTreeMap;

use figment::value::{Dict, Num, Tag, Value};

/// Ordered key/value overlay applied after all other configuration sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverlay {
    pairs: Vec<(String, Option<String>)>,
}

impl ConfigOverlay {
    /// Create an empty overlay
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an overlay from an ordered pair sequence
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Option<String>)>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    /// Append one pair
    pub fn push(&mut self, key: impl Into<String>, value: Option<String>) {
        self.pairs.push((key.into(), value));
    }

    /// Append every pair of another overlay
    pub fn extend(&mut self, other: ConfigOverlay) {
        self.pairs.extend(other.pairs);
    }

    /// Whether the overlay holds no pairs
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The pairs in registration order, duplicates included
    pub fn pairs(&self) -> &[(String, Option<String>)] {
        &self.pairs
    }

    /// Collapse to a map; the last occurrence of each key wins.
    pub fn merged(&self) -> BTreeMap<String, Option<String>> {
        self.pairs.iter().cloned().collect()
    }

    /// Figment dictionary of the value-carrying entries, with `.`-separated
    /// keys expanded into nested sections. Valueless keys are omitted: they
    /// carry presence information only and stay visible through
    /// [`HostConfiguration`].
    pub(crate) fn to_dict(&self) -> Dict {
        let mut root = Dict::new();
        for (key, value) in self.merged() {
            let Some(value) = value else { continue };
            insert_nested(&mut root, &key, parse_scalar(&value));
        }
        root
    }
}

/// Overlay values arrive as strings; typed extraction needs booleans and
/// numbers as such, the same way the environment provider parses its values.
fn parse_scalar(raw: &str) -> Value {
    if let Ok(value) = raw.parse::<bool>() {
        return Value::Bool(Tag::Default, value);
    }
    if let Ok(value) = raw.parse::<i64>() {
        return Value::Num(Tag::Default, Num::I64(value));
    }
    if let Ok(value) = raw.parse::<f64>() {
        return Value::Num(Tag::Default, Num::F64(value));
    }
    Value::String(Tag::Default, raw.to_string())
}

fn insert_nested(dict: &mut Dict, key: &str, value: Value) {
    match key.split_once('.') {
        None => {
            dict.insert(key.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = dict
                .entry(head.to_string())
                .or_insert_with(|| Value::Dict(Tag::Default, Dict::new()));
            if !matches!(slot, Value::Dict(_, _)) {
                // A scalar written earlier under this section name loses to
                // the section: last write wins at every depth.
                *slot = Value::Dict(Tag::Default, Dict::new());
            }
            if let Value::Dict(_, inner) = slot {
                insert_nested(inner, rest, value);
            }
        }
    }
}

/// Raw key/value view of the merged overlay, resolvable from the host
/// catalog. Unlike the typed [`AppConfig`](crate::config::AppConfig), this
/// view preserves valueless keys.
#[derive(Debug, Clone, Default)]
pub struct HostConfiguration {
    entries: BTreeMap<String, Option<String>>,
}

impl HostConfiguration {
    /// Snapshot the merged state of an overlay
    pub fn from_overlay(overlay: &ConfigOverlay) -> Self {
        Self {
            entries: overlay.merged(),
        }
    }

    /// Value for `key`: `None` when absent, `Some(None)` when the key is
    /// present without a value.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries.get(key).map(|value| value.as_deref())
    }

    /// Whether `key` is present, with or without a value
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the view is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }
}
