//! Read models returned by the run controller.

use elevator_rules::{Alignment, Scenario, ScenarioOption, TraitScores};
use serde::Serialize;

/// An option as the player sees it: no trait deltas, no consequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub index: usize,
    pub text: String,
}

/// A scenario card as the player sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub options: Vec<OptionView>,
}

impl From<&Scenario> for ScenarioView {
    fn from(scenario: &Scenario) -> Self {
        Self {
            id: scenario.id.to_string(),
            title: scenario.title.clone(),
            description: scenario.description.clone(),
            image: scenario.image.clone(),
            options: scenario
                .options
                .iter()
                .enumerate()
                .map(|(index, option)| OptionView {
                    index,
                    text: option.text.clone(),
                })
                .collect(),
        }
    }
}

/// What `current()` reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentScenario {
    /// No run, or every scenario has been answered.
    Done,
    Active {
        index: usize,
        total: usize,
        scenario: ScenarioView,
    },
}

/// The consequence revealed after a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOutcome {
    pub consequence_title: String,
    pub consequence_text: String,
    pub consequence_image: String,
    /// True once the last scenario of the run has been answered.
    pub next_done: bool,
}

impl ChoiceOutcome {
    pub(crate) fn new(option: &ScenarioOption, next_done: bool) -> Self {
        Self {
            consequence_title: option.consequence_title.clone(),
            consequence_text: option.consequence_text.clone(),
            consequence_image: option.consequence_image.clone(),
            next_done,
        }
    }
}

/// One answered scenario on the summary page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub scenario_title: String,
    pub scenario_description: String,
    pub option_text: String,
    /// Share of all recorded choices for this scenario that picked the same
    /// option. `None` when there is no aggregate data.
    pub player_percent: Option<f64>,
}

/// Final report for a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub scores: TraitScores,
    pub alignment: Alignment,
    pub alignment_label: &'static str,
    pub entries: Vec<SummaryEntry>,
}
