//! In-process counter store, for tests and throwaway servers.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{CounterStore, Distribution, StoreError};

/// Counters held in a mutex-guarded map. Lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    /// scenario id -> option index -> count
    counts: Mutex<HashMap<String, HashMap<usize, u64>>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for MemoryCounterStore {
    fn increment(&self, scenario_id: &str, option_index: usize) -> Result<(), StoreError> {
        let mut counts = self.counts.lock().map_err(|_| StoreError::LockPoisoned)?;
        *counts
            .entry(scenario_id.to_string())
            .or_default()
            .entry(option_index)
            .or_default() += 1;
        Ok(())
    }

    fn distribution(&self, scenario_id: &str) -> Result<Distribution, StoreError> {
        let counts = self.counts.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(counts
            .get(scenario_id)
            .map(|options| Distribution::from_counts(options.iter().map(|(i, c)| (*i, *c))))
            .unwrap_or_default())
    }
}
