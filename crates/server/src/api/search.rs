//! Search and suggestion handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use ftpflix_core::SearchResult;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub max: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub total: usize,
    /// True when the catalog was still empty and loading; results will be
    /// pushed over the WebSocket once content arrives.
    pub pending: bool,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub suggestions: Vec<String>,
}

/// GET /api/v1/search?q=&limit=
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let reply = state.store().search_or_defer(&params.q, params.limit);
    let total = reply.results.len();
    Json(SearchResponse {
        query: params.q,
        results: reply.results,
        total,
        pending: reply.deferred,
    })
}

/// GET /api/v1/suggestions?q=&max=
pub async fn suggestions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestionParams>,
) -> Json<SuggestionResponse> {
    Json(SuggestionResponse {
        suggestions: state.store().suggestions(&params.q, params.max),
    })
}
