//! In-process resource cache for paginated list fetches.
//!
//! Avoids re-crawling a resource within one client's lifetime when it is
//! requested again with the same filters. Entries are keyed by
//! [`ResourceKey`] (resource name plus every filter parameter) and never
//! expire; build a new client or call [`ResourceCache::invalidate_all`] for
//! fresh data.

use super::transport::Params;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Identity of a cached fetch: the resource plus its filter parameters.
///
/// Parameters are held in a sorted map, so two keys built from the same
/// filters in a different insertion order compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    resource: String,
    params: Vec<(String, String)>,
}

impl ResourceKey {
    pub fn new(resource: impl Into<String>, params: &Params) -> Self {
        Self {
            resource: resource.into(),
            params: params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource)?;
        for (i, (k, v)) in self.params.iter().enumerate() {
            write!(f, "{}{k}={v}", if i == 0 { "?" } else { "&" })?;
        }
        Ok(())
    }
}

/// Cache of fetched record sequences.
#[derive(Debug, Default)]
pub struct ResourceCache {
    entries: HashMap<ResourceKey, Vec<Value>>,
    /// Hits counter for diagnostics.
    hits: u64,
    /// Misses counter for diagnostics.
    misses: u64,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached sequence. Counts a hit or a miss.
    pub fn get(&mut self, key: &ResourceKey) -> Option<Vec<Value>> {
        match self.entries.get(key) {
            Some(records) => {
                self.hits += 1;
                Some(records.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store a fetched sequence, replacing any previous entry for `key`.
    pub fn put(&mut self, key: ResourceKey, records: Vec<Value>) {
        self.entries.insert(key, records);
    }

    /// Drop every entry.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Hit rate as a fraction (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
