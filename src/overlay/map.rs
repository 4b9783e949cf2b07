//! Concurrency-safe flat string map backing the overlay.

use std::collections::HashMap;

use dashmap::DashMap;

/// A flat `key -> value` store for environment entries.
///
/// Keys are unique and case-sensitive; values are arbitrary strings, the
/// empty string included. All operations are safe to call from multiple
/// threads without external locking, and none of them can fail: absence is
/// an [`Option`], never an error. Enumeration order is unspecified.
#[derive(Debug, Default, Clone)]
pub struct VarMap {
    inner: DashMap<String, String>,
}

impl VarMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, or `None` if absent.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(|entry| entry.value().clone())
    }

    /// Returns the value for `key`, or `default` if absent. Does not mutate.
    pub fn get_or(&self, key: &str, default: impl Into<String>) -> String {
        self.get(key).unwrap_or_else(|| default.into())
    }

    /// Inserts or replaces the value for `key`.
    pub fn store(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), value.into());
    }

    /// Removes `key` if present; no-op otherwise.
    pub fn delete(&self, key: &str) {
        self.inner.remove(key);
    }

    /// Visits every entry once, in no particular order, until `visit`
    /// returns `false`.
    ///
    /// Concurrent stores and deletes from other threads never corrupt the
    /// pass; whether an in-flight write is visible is last-writer-wins. The
    /// visitor must not mutate this map (a shard lock is held while it
    /// runs).
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&str, &str) -> bool,
    {
        for entry in self.inner.iter() {
            if !visit(entry.key().as_str(), entry.value().as_str()) {
                break;
            }
        }
    }

    /// Returns a detached copy of the contents. Mutating the result never
    /// affects this map.
    pub fn to_map(&self) -> HashMap<String, String> {
        let mut out = HashMap::with_capacity(self.len());
        self.range(|key, value| {
            out.insert(key.to_string(), value.to_string());
            true
        });
        out
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True when the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
