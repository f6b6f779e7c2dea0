//! Scenario catalog - the read-only collection of scenarios loaded at startup.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::{Scenario, ScenarioId};
use crate::run_state::MAX_RUN_LENGTH;

/// Errors raised while loading or querying the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed TOML catalog: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("catalog contains no scenarios")]
    Empty,

    #[error("scenario id {0} appears more than once")]
    DuplicateScenario(ScenarioId),

    #[error("scenario {0} has no options")]
    NoOptions(ScenarioId),

    #[error("catalog has {found} scenarios, a run needs at least {required}")]
    TooFewScenarios { found: usize, required: usize },

    #[error("scenario {0} not found")]
    NotFound(String),
}

/// TOML catalogs wrap the scenario list in a `[[scenarios]]` array.
#[derive(Deserialize)]
struct TomlCatalog {
    scenarios: Vec<Scenario>,
}

/// The ordered, immutable scenario collection.
#[derive(Debug, Clone)]
pub struct Catalog {
    scenarios: Vec<Scenario>,

    /// Index: scenario id -> position in `scenarios`.
    by_id: HashMap<ScenarioId, usize>,
}

impl Catalog {
    /// Build a catalog from already-parsed scenarios, validating them.
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self, CatalogError> {
        if scenarios.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for scenario in &scenarios {
            if !seen.insert(&scenario.id) {
                return Err(CatalogError::DuplicateScenario(scenario.id.clone()));
            }
            if scenario.options.is_empty() {
                return Err(CatalogError::NoOptions(scenario.id.clone()));
            }
        }

        if scenarios.len() < MAX_RUN_LENGTH {
            return Err(CatalogError::TooFewScenarios {
                found: scenarios.len(),
                required: MAX_RUN_LENGTH,
            });
        }

        let by_id = scenarios
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();

        Ok(Self { scenarios, by_id })
    }

    /// Parse a JSON array of scenarios.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let scenarios: Vec<Scenario> = serde_json::from_str(json)?;
        Self::new(scenarios)
    }

    /// Parse a TOML document with a `[[scenarios]]` array.
    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let parsed: TomlCatalog = toml::from_str(source)?;
        Self::new(parsed.scenarios)
    }

    /// Load the catalog from disk. Files ending in `.toml` are read as TOML,
    /// everything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// Get a scenario by id.
    pub fn lookup(&self, id: &str) -> Result<&Scenario, CatalogError> {
        self.by_id
            .get(id)
            .map(|&i| &self.scenarios[i])
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// All scenarios in catalog order.
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// All scenario ids in catalog order.
    pub fn ids(&self) -> Vec<&ScenarioId> {
        self.scenarios.iter().map(|s| &s.id).collect()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}
