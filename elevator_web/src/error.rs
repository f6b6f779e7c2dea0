//! HTTP-facing error types.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use elevator_core::{RunError, StoreError};
use elevator_rules::CatalogError;
use tracing::{error, warn};

use crate::config::ConfigError;

/// Fatal errors while bringing the server up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to load scenario catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("failed to open statistics store: {0}")]
    Store(#[from] StoreError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Errors returned from JSON endpoints as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Run(#[from] RunError),

    #[error("invalid request body: {0}")]
    BadRequest(String),

    #[error("failed to encode session: {0}")]
    Session(#[from] serde_json::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Run(err) => match err {
                RunError::NoActiveRun | RunError::RunComplete => StatusCode::CONFLICT,
                RunError::ScenarioMismatch { .. } | RunError::InvalidOption { .. } => {
                    StatusCode::BAD_REQUEST
                }
                RunError::UnknownScenario(_) => StatusCode::NOT_FOUND,
                RunError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Session(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Server faults go out at `error`, client mistakes at `warn`.
    pub fn log(&self) {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
