//! Run state - everything a single player session carries between requests.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mechanics::{TraitDeltas, TraitScores};
use crate::scenarios::ScenarioId;

/// Shortest run a player can be dealt.
pub const MIN_RUN_LENGTH: usize = 5;

/// Longest run a player can be dealt.
pub const MAX_RUN_LENGTH: usize = 6;

/// Unique identifier for a run, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a nil run ID (used before any run has started).
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::nil()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A choice the player made, kept for the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedChoice {
    pub scenario_id: ScenarioId,
    pub option_index: usize,
}

/// Where a session is in the run lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    /// Index of the scenario currently shown.
    InProgress(usize),
    Complete,
}

/// Per-session run data.
///
/// A default value is a session that has not started a run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub run_id: RunId,

    /// Scenarios dealt for this run, in play order.
    pub scenario_ids: Vec<ScenarioId>,

    /// Position in `scenario_ids`. Never exceeds its length.
    pub current_index: usize,

    pub scores: TraitScores,

    pub choices: Vec<RecordedChoice>,
}

impl SessionState {
    /// Begin a fresh run over the given scenarios.
    pub fn new_run(scenario_ids: Vec<ScenarioId>) -> Self {
        Self {
            run_id: RunId::new(),
            scenario_ids,
            current_index: 0,
            scores: TraitScores::default(),
            choices: Vec::new(),
        }
    }

    /// Check if a run has been dealt.
    pub fn has_run(&self) -> bool {
        !self.scenario_ids.is_empty()
    }

    /// Number of scenarios in the run.
    pub fn total(&self) -> usize {
        self.scenario_ids.len()
    }

    /// Check if every dealt scenario has been answered.
    pub fn is_complete(&self) -> bool {
        self.has_run() && self.current_index >= self.scenario_ids.len()
    }

    pub fn phase(&self) -> RunPhase {
        if !self.has_run() {
            RunPhase::NotStarted
        } else if self.is_complete() {
            RunPhase::Complete
        } else {
            RunPhase::InProgress(self.current_index)
        }
    }

    /// The scenario the player should answer next, if any.
    pub fn current_scenario_id(&self) -> Option<&ScenarioId> {
        self.scenario_ids.get(self.current_index)
    }

    /// Apply a validated choice: add its deltas, record it, and advance.
    ///
    /// Callers check the scenario and option against the catalog first.
    /// Returns whether the run is now complete.
    pub fn record_choice(
        &mut self,
        scenario_id: ScenarioId,
        option_index: usize,
        deltas: &TraitDeltas,
    ) -> bool {
        self.scores.apply(deltas);
        self.choices.push(RecordedChoice {
            scenario_id,
            option_index,
        });
        self.current_index = (self.current_index + 1).min(self.scenario_ids.len());
        self.is_complete()
    }
}
