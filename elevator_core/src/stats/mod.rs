//! Aggregate choice statistics.
//!
//! Every recorded choice bumps one counter keyed by (scenario id, option index).
//! Reading a scenario back yields a [`Distribution`] with each option's share of
//! all recorded choices for that scenario.

mod memory;
mod sqlite;

pub use memory::*;
pub use sqlite::*;

use serde::Serialize;
use std::collections::BTreeMap;

/// Errors from a counter store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("counter store lock poisoned")]
    LockPoisoned,

    #[error("corrupt counter row for {scenario_id}: {detail}")]
    Corrupt { scenario_id: String, detail: String },
}

/// Storage for the (scenario, option) counters.
///
/// Implementations are shared across request tasks, so `increment` must be
/// atomic per key.
pub trait CounterStore: Send + Sync {
    /// Create the counter at 1, or add 1 to it.
    fn increment(&self, scenario_id: &str, option_index: usize) -> Result<(), StoreError>;

    /// Read every counter for a scenario. Empty when nothing was recorded.
    fn distribution(&self, scenario_id: &str) -> Result<Distribution, StoreError>;
}

/// One option's count and its share of the scenario total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptionShare {
    pub count: u64,
    /// 0.0 - 100.0
    pub percent: f64,
}

/// How often each option of a scenario has been chosen.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Distribution {
    shares: BTreeMap<usize, OptionShare>,
    total: u64,
}

impl Distribution {
    /// Build from raw (option index, count) pairs. A zero total gives an
    /// empty distribution.
    pub fn from_counts(counts: impl IntoIterator<Item = (usize, u64)>) -> Self {
        let counts: Vec<(usize, u64)> = counts.into_iter().collect();
        let total: u64 = counts.iter().map(|(_, c)| c).sum();
        if total == 0 {
            return Self::default();
        }

        let shares = counts
            .into_iter()
            .map(|(index, count)| {
                let percent = count as f64 * 100.0 / total as f64;
                (index, OptionShare { count, percent })
            })
            .collect();

        Self { shares, total }
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Sum of all counts for the scenario.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn get(&self, option_index: usize) -> Option<&OptionShare> {
        self.shares.get(&option_index)
    }

    /// Share of the given option, or `None` when it has never been chosen.
    pub fn percent_for(&self, option_index: usize) -> Option<f64> {
        self.get(option_index).map(|s| s.percent)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &OptionShare)> {
        self.shares.iter().map(|(i, s)| (*i, s))
    }
}
