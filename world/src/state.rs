//! Small persistent counter store for per-level game values.

use std::collections::BTreeMap;

/// Named integer counters, for example player resources.
///
/// Missing counters read as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameState {
    counters: BTreeMap<String, i64>,
}

impl GameState {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of the counter.
    #[must_use]
    pub fn get(&self, name: &str) -> i64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Overwrites the counter.
    pub fn set(&mut self, name: impl Into<String>, value: i64) {
        let _ = self.counters.insert(name.into(), value);
    }

    /// Adds `delta` to the counter, saturating at the `i64` range, and
    /// returns the new value.
    pub fn add(&mut self, name: impl Into<String>, delta: i64) -> i64 {
        let value = self.counters.entry(name.into()).or_insert(0);
        *value = value.saturating_add(delta);
        *value
    }

    /// Iterator over all counters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.counters
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
    }

    /// Forgets every counter.
    pub fn reset(&mut self) {
        self.counters.clear();
    }
}
