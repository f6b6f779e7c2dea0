//! Scenario definitions for the elevator quiz.

mod catalog;

pub use catalog::*;

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

use crate::mechanics::TraitDeltas;

/// Unique identifier for a scenario, as written in the catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(pub String);

impl ScenarioId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ScenarioId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ScenarioId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One selectable answer on a scenario card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOption {
    pub text: String,

    /// Hidden score changes, stored inline next to the text in the catalog.
    #[serde(flatten)]
    pub traits: TraitDeltas,

    pub consequence_title: String,
    pub consequence_text: String,
    pub consequence_image: String,
}

impl ScenarioOption {
    /// Create an option with no trait effect and an empty consequence.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            traits: TraitDeltas::default(),
            consequence_title: String::new(),
            consequence_text: String::new(),
            consequence_image: String::new(),
        }
    }

    /// Set the trait deltas applied when this option is chosen.
    pub fn with_traits(mut self, traits: TraitDeltas) -> Self {
        self.traits = traits;
        self
    }

    /// Set the consequence shown after this option is chosen.
    pub fn with_consequence(
        mut self,
        title: impl Into<String>,
        text: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        self.consequence_title = title.into();
        self.consequence_text = text.into();
        self.consequence_image = image.into();
        self
    }
}

/// A single narrative situation presented to the player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub title: String,
    pub description: String,
    pub image: String,
    pub options: Vec<ScenarioOption>,
}

impl Scenario {
    /// Create a scenario with no options.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: ScenarioId::new(id),
            title: title.into(),
            description: String::new(),
            image: String::new(),
            options: Vec::new(),
        }
    }

    /// Set the description text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the card image.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Append an option.
    pub fn with_option(mut self, option: ScenarioOption) -> Self {
        self.options.push(option);
        self
    }

    /// Get an option by its position on the card.
    pub fn option(&self, index: usize) -> Option<&ScenarioOption> {
        self.options.get(index)
    }
}
