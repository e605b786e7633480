//! Playback hand-off handler.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use ftpflix_core::PlaybackOutcome;

use super::handlers::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    pub category_key: String,
    pub title: String,
    /// Movie source to use (defaults to the first).
    #[serde(default)]
    pub source_index: Option<usize>,
    /// Season and episode select an episode of a series.
    #[serde(default)]
    pub season_number: Option<u32>,
    #[serde(default)]
    pub episode_number: Option<u32>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn not_found(message: String) -> ApiError {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new(message)))
}

/// POST /api/v1/play
///
/// Hand an item or an episode to the external player.
pub async fn play(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlayRequest>,
) -> Result<Json<PlaybackOutcome>, ApiError> {
    let store = state.store();
    let item = store
        .find(&request.category_key, &request.title)
        .ok_or_else(|| {
            not_found(format!(
                "Content not found: {} in {}",
                request.title, request.category_key
            ))
        })?;

    let outcome = match (request.season_number, request.episode_number) {
        (Some(season), Some(episode_number)) => {
            let episode = item.episode(season, episode_number).ok_or_else(|| {
                not_found(format!(
                    "Episode S{:02}E{:02} not found for {}",
                    season, episode_number, request.title
                ))
            })?;
            store.play_episode(episode, item.title()).await
        }
        (None, None) => store.play_content(&item, request.source_index).await,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    "season_number and episode_number must be given together",
                )),
            ))
        }
    };

    Ok(Json(outcome))
}
