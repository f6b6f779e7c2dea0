//! Axum HTTP server for the elevator quiz.
//!
//! The player's run lives in a private cookie; the only shared mutable state
//! is the counter store behind the `RunController`. Operations that touch the
//! store run on the blocking pool, since SQLite writes can wait on the disk
//! or on the busy timeout.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Landing page |
//! | POST | `/start` | Deal a new run, redirect to `/game` |
//! | GET | `/game` | Game page, or redirect to `/summary` when there is nothing to play |
//! | GET | `/summary` | Final alignment page, or redirect to `/` without a run |
//! | GET | `/api/current_scenario` | Next card, or `{done: true}` |
//! | POST | `/api/choose` | Answer the current card |
//! | GET | `/api/summary` | Final report as JSON |
//! | GET | `/health` | Health check |

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Key, PrivateCookieJar};
use elevator_core::{
    ChoiceOutcome, CounterStore, CurrentScenario, MemoryCounterStore, RunController, RunError,
    RunSummary, ScenarioView, SqliteCounterStore,
};
use elevator_rules::SessionState;
use elevator_rules::Catalog;
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{ApiError, StartupError};
use crate::{pages, session};

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<RunController>,
    pub key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

/// Load the catalog and open the counter store named by `config`.
pub fn build_state(config: &ServerConfig) -> Result<AppState, StartupError> {
    config.validate()?;

    let catalog = Catalog::load(&config.catalog_path)?;
    info!(
        path = %config.catalog_path.display(),
        scenarios = catalog.len(),
        "scenario catalog loaded"
    );

    let missing = missing_images(&catalog, &config.static_dir);
    if !missing.is_empty() {
        warn!(
            static_dir = %config.static_dir.display(),
            count = missing.len(),
            missing = ?missing,
            "catalog references images that are not shipped, they will be hidden"
        );
    }

    let store: Arc<dyn CounterStore> = if config.uses_in_memory_database() {
        warn!("using in-memory statistics, counts will be lost on exit");
        Arc::new(MemoryCounterStore::new())
    } else {
        info!(path = %config.database_path.display(), "opening statistics database");
        Arc::new(SqliteCounterStore::open(&config.database_path)?)
    };

    Ok(AppState {
        controller: Arc::new(RunController::new(Arc::new(catalog), store)),
        key: session::cookie_key(config),
    })
}

/// Image names referenced by the catalog with no file under `static_dir/img`.
pub fn missing_images(catalog: &Catalog, static_dir: &Path) -> Vec<String> {
    let img_dir = static_dir.join("img");
    let referenced: BTreeSet<&str> = catalog
        .scenarios()
        .iter()
        .flat_map(|scenario| {
            std::iter::once(scenario.image.as_str())
                .chain(scenario.options.iter().map(|o| o.consequence_image.as_str()))
        })
        .filter(|name| !name.is_empty())
        .collect();

    referenced
        .into_iter()
        .filter(|name| !img_dir.join(name).is_file())
        .map(str::to_string)
        .collect()
}

pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/start", post(handle_start))
        .route("/game", get(handle_game))
        .route("/summary", get(handle_summary_page))
        .route("/api/current_scenario", get(handle_current_scenario))
        .route("/api/choose", post(handle_choose))
        .route("/api/summary", get(handle_summary_json))
        .route("/health", get(handle_health_check))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Request/Response types ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChooseRequest {
    pub scenario_id: String,
    pub option_index: usize,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CurrentScenarioResponse {
    Done {
        done: bool,
    },
    Active {
        done: bool,
        index: usize,
        total: usize,
        scenario: ScenarioView,
    },
}

impl From<CurrentScenario> for CurrentScenarioResponse {
    fn from(current: CurrentScenario) -> Self {
        match current {
            CurrentScenario::Done => CurrentScenarioResponse::Done { done: true },
            CurrentScenario::Active {
                index,
                total,
                scenario,
            } => CurrentScenarioResponse::Active {
                done: false,
                index,
                total,
                scenario,
            },
        }
    }
}

// ── Page handlers ───────────────────────────────────────────────────

async fn handle_index() -> Html<String> {
    Html(pages::index())
}

async fn handle_start(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Redirect), ApiError> {
    let run = state.controller.start(&mut rand::thread_rng());
    let jar = session::store(jar, &run)?;
    Ok((jar, Redirect::to("/game")))
}

async fn handle_game(jar: PrivateCookieJar) -> Response {
    let run = session::load(&jar);
    if !run.has_run() || run.is_complete() {
        return Redirect::to("/summary").into_response();
    }
    Html(pages::game()).into_response()
}

async fn handle_summary_page(State(state): State<AppState>, jar: PrivateCookieJar) -> Response {
    let run = session::load(&jar);
    match summarize(&state, run).await {
        Ok(summary) => Html(pages::summary(&summary)).into_response(),
        Err(ApiError::Run(RunError::NoActiveRun)) => Redirect::to("/").into_response(),
        Err(err) => {
            err.log();
            let message = match &err {
                ApiError::Run(RunError::UnknownScenario(_)) => {
                    "This ride went through floors that no longer exist."
                }
                _ => "The elevator is stuck between floors. Please try again.",
            };
            (err.status(), Html(pages::error(message))).into_response()
        }
    }
}

/// Build the summary off the async workers; it reads the counter store.
async fn summarize(state: &AppState, run: SessionState) -> Result<RunSummary, ApiError> {
    let controller = Arc::clone(&state.controller);
    Ok(tokio::task::spawn_blocking(move || controller.summary(&run)).await??)
}

// ── API handlers ────────────────────────────────────────────────────

async fn handle_health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn handle_current_scenario(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> Result<Json<CurrentScenarioResponse>, ApiError> {
    let run = session::load(&jar);
    let current = state.controller.current(&run)?;
    Ok(Json(current.into()))
}

async fn handle_choose(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    payload: Result<Json<ChooseRequest>, JsonRejection>,
) -> Result<(PrivateCookieJar, Json<ChoiceOutcome>), ApiError> {
    let Json(request) = payload?;
    let mut run = session::load(&jar);
    let controller = Arc::clone(&state.controller);

    let (outcome, run) = tokio::task::spawn_blocking(move || {
        controller
            .choose(&mut run, &request.scenario_id, request.option_index)
            .map(|outcome| (outcome, run))
    })
    .await??;

    let jar = session::store(jar, &run)?;
    Ok((jar, Json(outcome)))
}

async fn handle_summary_json(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> Result<Json<RunSummary>, ApiError> {
    let run = session::load(&jar);
    Ok(Json(summarize(&state, run).await?))
}
