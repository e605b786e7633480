use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use ftpflix_core::{SanitizedConfig, StoreError, StoreSummary};

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub message: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// GET /api/v1/status
///
/// Store lifecycle, snapshot version and per-category counts.
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StoreSummary> {
    Json(state.store().summary())
}

/// POST /api/v1/reload
///
/// Start a catalog reload in the background.
pub async fn reload(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ReloadResponse>), (StatusCode, Json<ErrorResponse>)> {
    match state.store().spawn_load() {
        Ok(handle) => {
            info!("Catalog reload requested");
            tokio::spawn(async move {
                match handle.await {
                    Ok(Ok(summary)) => info!("Reload finished with {} items", summary.total_items),
                    Ok(Err(e)) => error!("Reload failed: {}", e),
                    Err(e) => error!("Reload task panicked: {}", e),
                }
            });
            Ok((
                StatusCode::ACCEPTED,
                Json(ReloadResponse {
                    message: "Reload started".to_string(),
                }),
            ))
        }
        Err(e @ StoreError::LoadInProgress) => {
            Err((StatusCode::CONFLICT, Json(ErrorResponse::new(e.to_string()))))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )),
    }
}

/// GET /metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
