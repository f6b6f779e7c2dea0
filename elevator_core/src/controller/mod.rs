//! Run Controller - drives one player's run through the quiz.
//!
//! The lifecycle is `NotStarted -> InProgress(0..N-1) -> Complete`:
//! 1. **Start**: deal 5 or 6 distinct scenarios and reset scores
//! 2. **Current**: show the next card without its hidden scoring
//! 3. **Choose**: validate, count the choice globally, then update the session
//! 4. **Summary**: classify the scores and compare each choice with everyone else's
//!
//! The controller owns no session data. Every operation takes the caller's
//! `SessionState` explicitly.

mod views;

pub use views::*;

use elevator_rules::{
    Catalog, Scenario, ScenarioId, SessionState, MAX_RUN_LENGTH, MIN_RUN_LENGTH,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info};

use crate::stats::{CounterStore, StoreError};

/// Errors from run operations.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("no active run")]
    NoActiveRun,

    #[error("run is already complete")]
    RunComplete,

    #[error("expected a choice for scenario {expected}, got {received}")]
    ScenarioMismatch { expected: String, received: String },

    #[error("option {option_index} is out of range for scenario {scenario_id} ({option_count} options)")]
    InvalidOption {
        scenario_id: String,
        option_index: usize,
        option_count: usize,
    },

    #[error("unknown scenario {0}")]
    UnknownScenario(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Orchestrates runs against a fixed catalog and a shared counter store.
#[derive(Clone)]
pub struct RunController {
    catalog: Arc<Catalog>,
    store: Arc<dyn CounterStore>,
}

impl RunController {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn CounterStore>) -> Self {
        Self { catalog, store }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &dyn CounterStore {
        self.store.as_ref()
    }

    /// A scenario named by the session. Sessions can outlive a catalog
    /// reload, so a missing id is a run error rather than a catalog one.
    fn scenario(&self, id: &str) -> Result<&Scenario, RunError> {
        self.catalog
            .lookup(id)
            .map_err(|_| RunError::UnknownScenario(id.to_string()))
    }

    /// Deal a new run. Any previous session state is discarded by the caller
    /// replacing it with the returned value.
    pub fn start<R: Rng + ?Sized>(&self, rng: &mut R) -> SessionState {
        let run_length = rng.gen_range(MIN_RUN_LENGTH..=MAX_RUN_LENGTH);
        let scenario_ids: Vec<ScenarioId> = self
            .catalog
            .ids()
            .choose_multiple(rng, run_length)
            .map(|id| (*id).clone())
            .collect();

        let session = SessionState::new_run(scenario_ids);
        info!(run_id = %session.run_id, total = session.total(), "run started");
        session
    }

    /// The card the player should answer next.
    pub fn current(&self, session: &SessionState) -> Result<CurrentScenario, RunError> {
        let Some(scenario_id) = session.current_scenario_id() else {
            return Ok(CurrentScenario::Done);
        };

        let scenario = self.scenario(scenario_id.as_str())?;
        Ok(CurrentScenario::Active {
            index: session.current_index,
            total: session.total(),
            scenario: ScenarioView::from(scenario),
        })
    }

    /// Answer the current scenario.
    ///
    /// Nothing is changed unless every check passes and the counter write
    /// succeeds.
    pub fn choose(
        &self,
        session: &mut SessionState,
        scenario_id: &str,
        option_index: usize,
    ) -> Result<ChoiceOutcome, RunError> {
        if !session.has_run() {
            return Err(RunError::NoActiveRun);
        }
        let Some(expected) = session.current_scenario_id() else {
            return Err(RunError::RunComplete);
        };
        if expected.as_str() != scenario_id {
            return Err(RunError::ScenarioMismatch {
                expected: expected.to_string(),
                received: scenario_id.to_string(),
            });
        }

        let scenario = self.scenario(scenario_id)?;
        let option = scenario
            .option(option_index)
            .ok_or_else(|| RunError::InvalidOption {
                scenario_id: scenario_id.to_string(),
                option_index,
                option_count: scenario.options.len(),
            })?;

        self.store.increment(scenario_id, option_index)?;

        let next_done = session.record_choice(scenario.id.clone(), option_index, &option.traits);
        debug!(
            run_id = %session.run_id,
            scenario = scenario_id,
            option_index,
            index = session.current_index,
            "choice recorded"
        );
        if next_done {
            info!(
                run_id = %session.run_id,
                charisma = session.scores.charisma,
                karma = session.scores.karma,
                weird = session.scores.weird,
                "run complete"
            );
        }

        Ok(ChoiceOutcome::new(option, next_done))
    }

    /// Build the final report. Reads only.
    ///
    /// Percentages include the player's own choices, which were counted when
    /// they were made.
    pub fn summary(&self, session: &SessionState) -> Result<RunSummary, RunError> {
        if !session.has_run() {
            return Err(RunError::NoActiveRun);
        }

        let mut entries = Vec::with_capacity(session.choices.len());
        for choice in &session.choices {
            let scenario = self.scenario(choice.scenario_id.as_str())?;
            let option = scenario
                .option(choice.option_index)
                .ok_or_else(|| RunError::InvalidOption {
                    scenario_id: scenario.id.to_string(),
                    option_index: choice.option_index,
                    option_count: scenario.options.len(),
                })?;

            let distribution = self.store.distribution(scenario.id.as_str())?;

            entries.push(SummaryEntry {
                scenario_title: scenario.title.clone(),
                scenario_description: scenario.description.clone(),
                option_text: option.text.clone(),
                player_percent: distribution.percent_for(choice.option_index),
            });
        }

        let alignment = session.scores.alignment();
        Ok(RunSummary {
            scores: session.scores,
            alignment,
            alignment_label: alignment.label(),
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{Distribution, MemoryCounterStore};
    use elevator_rules::{RunPhase, Scenario, ScenarioOption, TraitDeltas, TraitScores};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn test_catalog() -> Arc<Catalog> {
        let scenarios = (0..8)
            .map(|i| {
                Scenario::new(format!("floor-{i}"), format!("Floor {i}"))
                    .with_description("The doors slide open.")
                    .with_image("floor.png")
                    .with_option(
                        ScenarioOption::new("Be kind")
                            .with_traits(TraitDeltas::new(1, 2, 0))
                            .with_consequence("Kind", "Someone smiles.", "smile.png"),
                    )
                    .with_option(
                        ScenarioOption::new("Be strange")
                            .with_traits(TraitDeltas::new(0, -1, 3))
                            .with_consequence("Strange", "Everyone stares.", "stare.png"),
                    )
            })
            .collect();
        Arc::new(Catalog::new(scenarios).unwrap())
    }

    fn controller() -> (RunController, Arc<MemoryCounterStore>) {
        let store = Arc::new(MemoryCounterStore::new());
        (RunController::new(test_catalog(), store.clone()), store)
    }

    fn current_id(session: &SessionState) -> String {
        session.current_scenario_id().unwrap().to_string()
    }

    /// A store whose writes always fail.
    struct BrokenStore;

    impl CounterStore for BrokenStore {
        fn increment(&self, _: &str, _: usize) -> Result<(), StoreError> {
            Err(StoreError::LockPoisoned)
        }

        fn distribution(&self, _: &str) -> Result<Distribution, StoreError> {
            Ok(Distribution::default())
        }
    }

    #[test]
    fn test_start_deals_five_or_six_distinct_scenarios() {
        let (controller, _) = controller();
        let mut rng = StdRng::seed_from_u64(7);
        let mut lengths = HashSet::new();

        for _ in 0..100 {
            let session = controller.start(&mut rng);
            assert!(session.total() == 5 || session.total() == 6);

            let unique: HashSet<_> = session.scenario_ids.iter().collect();
            assert_eq!(unique.len(), session.total());
            for id in &session.scenario_ids {
                assert!(controller.catalog().lookup(id.as_str()).is_ok());
            }
            lengths.insert(session.total());
        }

        assert_eq!(lengths.len(), 2, "both run lengths should occur");
    }

    #[test]
    fn test_restart_discards_previous_run() {
        let (controller, _) = controller();
        let mut rng = StdRng::seed_from_u64(1);

        let mut session = controller.start(&mut rng);
        let first = current_id(&session);
        controller.choose(&mut session, &first, 0).unwrap();
        let old_run = session.run_id;

        session = controller.start(&mut rng);
        assert_eq!(session.phase(), RunPhase::InProgress(0));
        assert!(session.choices.is_empty());
        assert_eq!(session.scores, TraitScores::default());
        assert_ne!(session.run_id, old_run);
    }

    #[test]
    fn test_current_hides_scoring() {
        let (controller, _) = controller();
        let session = controller.start(&mut StdRng::seed_from_u64(3));

        match controller.current(&session).unwrap() {
            CurrentScenario::Active {
                index,
                total,
                scenario,
            } => {
                assert_eq!(index, 0);
                assert_eq!(total, session.total());
                assert_eq!(scenario.id, current_id(&session));
                assert_eq!(scenario.options.len(), 2);
                assert_eq!(scenario.options[1].index, 1);
                assert_eq!(scenario.options[1].text, "Be strange");
            }
            CurrentScenario::Done => panic!("run should be active"),
        }
    }

    #[test]
    fn test_current_without_run_is_done() {
        let (controller, _) = controller();
        assert_eq!(
            controller.current(&SessionState::default()).unwrap(),
            CurrentScenario::Done
        );
    }

    #[test]
    fn test_full_run_reaches_complete() {
        let (controller, store) = controller();
        let mut session = controller.start(&mut StdRng::seed_from_u64(11));
        let total = session.total();

        for step in 0..total {
            let id = current_id(&session);
            let outcome = controller.choose(&mut session, &id, 0).unwrap();
            assert_eq!(outcome.consequence_title, "Kind");
            assert_eq!(outcome.next_done, step + 1 == total);
        }

        assert_eq!(session.current_index, total);
        assert_eq!(session.phase(), RunPhase::Complete);
        assert_eq!(controller.current(&session).unwrap(), CurrentScenario::Done);
        assert_eq!(session.scores, TraitScores::new(total as i32, 2 * total as i32, 0));

        for id in &session.scenario_ids {
            assert_eq!(store.distribution(id.as_str()).unwrap().total(), 1);
        }
    }

    #[test]
    fn test_choose_after_completion_fails() {
        let (controller, _) = controller();
        let mut session = controller.start(&mut StdRng::seed_from_u64(5));
        let ids: Vec<String> = session.scenario_ids.iter().map(|id| id.to_string()).collect();
        for id in &ids {
            controller.choose(&mut session, id, 1).unwrap();
        }

        let result = controller.choose(&mut session, &ids[0], 0);
        assert!(matches!(result, Err(RunError::RunComplete)));
    }

    #[test]
    fn test_choose_without_run_fails() {
        let (controller, _) = controller();
        let mut session = SessionState::default();
        assert!(matches!(
            controller.choose(&mut session, "floor-0", 0),
            Err(RunError::NoActiveRun)
        ));
    }

    #[test]
    fn test_invalid_option_changes_nothing() {
        let (controller, store) = controller();
        let mut session = controller.start(&mut StdRng::seed_from_u64(9));
        let before = session.clone();
        let id = current_id(&session);

        let result = controller.choose(&mut session, &id, 2);
        assert!(matches!(
            result,
            Err(RunError::InvalidOption { option_index: 2, option_count: 2, .. })
        ));
        assert_eq!(session, before);
        assert!(store.distribution(&id).unwrap().is_empty());
    }

    #[test]
    fn test_scenario_mismatch_changes_nothing() {
        let (controller, store) = controller();
        let mut session = controller.start(&mut StdRng::seed_from_u64(13));
        let before = session.clone();
        let other = session.scenario_ids[1].to_string();

        let result = controller.choose(&mut session, &other, 0);
        assert!(matches!(result, Err(RunError::ScenarioMismatch { .. })));
        assert_eq!(session, before);
        assert!(store.distribution(&other).unwrap().is_empty());
    }

    #[test]
    fn test_store_failure_leaves_session_untouched() {
        let controller = RunController::new(test_catalog(), Arc::new(BrokenStore));
        let mut session = controller.start(&mut StdRng::seed_from_u64(17));
        let before = session.clone();
        let id = current_id(&session);

        assert!(matches!(
            controller.choose(&mut session, &id, 0),
            Err(RunError::Store(_))
        ));
        assert_eq!(session, before);
    }

    #[test]
    fn test_stale_session_reports_unknown_scenario() {
        let (controller, _) = controller();
        let mut session = SessionState::new_run(vec![ScenarioId::new("demolished")]);

        assert!(matches!(
            controller.current(&session),
            Err(RunError::UnknownScenario(id)) if id == "demolished"
        ));
        assert!(matches!(
            controller.choose(&mut session, "demolished", 0),
            Err(RunError::UnknownScenario(id)) if id == "demolished"
        ));
        assert_eq!(session.current_index, 0);
    }

    #[test]
    fn test_summary_without_run() {
        let (controller, _) = controller();
        assert!(matches!(
            controller.summary(&SessionState::default()),
            Err(RunError::NoActiveRun)
        ));
    }

    #[test]
    fn test_summary_percentages_include_other_players() {
        let (controller, store) = controller();
        let mut session = controller.start(&mut StdRng::seed_from_u64(21));
        let first = current_id(&session);

        // Three earlier players picked option 1 on the first scenario.
        for _ in 0..3 {
            store.increment(&first, 1).unwrap();
        }

        let total = session.total();
        for _ in 0..total {
            let id = current_id(&session);
            controller.choose(&mut session, &id, 0).unwrap();
        }

        let summary = controller.summary(&session).unwrap();
        assert_eq!(summary.entries.len(), total);
        assert_eq!(summary.entries[0].option_text, "Be kind");
        assert!((summary.entries[0].player_percent.unwrap() - 25.0).abs() < 1e-9);
        assert_eq!(summary.entries[1].player_percent, Some(100.0));
        assert_eq!(summary.alignment, summary.scores.alignment());
        assert_eq!(summary.alignment_label, summary.alignment.label());
    }

    #[test]
    fn test_summary_percent_absent_without_aggregate_data() {
        let (controller, _) = controller();
        let mut session = controller.start(&mut StdRng::seed_from_u64(23));
        let id = current_id(&session);

        // Recorded in the session but never reached the store.
        let option = controller.catalog().lookup(&id).unwrap().options[0].traits;
        session.record_choice(ScenarioId::new(id), 0, &option);

        let summary = controller.summary(&session).unwrap();
        assert_eq!(summary.entries.len(), 1);
        assert_eq!(summary.entries[0].player_percent, None);
    }

    #[test]
    fn test_summary_does_not_mutate() {
        let (controller, store) = controller();
        let mut session = controller.start(&mut StdRng::seed_from_u64(29));
        let id = current_id(&session);
        controller.choose(&mut session, &id, 1).unwrap();

        let before = store.distribution(&id).unwrap();
        let first = controller.summary(&session).unwrap();
        let second = controller.summary(&session).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.distribution(&id).unwrap(), before);
    }
}
