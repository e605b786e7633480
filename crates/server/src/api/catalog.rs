//! Catalog browsing handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use ftpflix_core::{
    CategorySummary, CategoryView, ContentItem, SortOrder, TypeFilter, ALL_CATEGORIES_KEY,
};

use super::handlers::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CategoryParams {
    #[serde(default, rename = "type")]
    pub type_filter: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

#[derive(Debug, Deserialize)]
pub struct FeaturedParams {
    #[serde(default = "default_featured_limit")]
    pub limit: usize,
}

fn default_featured_limit() -> usize {
    10
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Serialize)]
pub struct ContentListResponse {
    pub items: Vec<ContentItem>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct PagedContentResponse {
    pub items: Vec<ContentItem>,
    pub total: usize,
    pub offset: usize,
    pub version: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/categories
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<CategoryListResponse> {
    Json(CategoryListResponse {
        categories: state.store().categories(),
    })
}

/// GET /api/v1/categories/{key}
///
/// Items of one category (or `all`), filtered by `type` and ordered by `sort`.
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(params): Query<CategoryParams>,
) -> Result<Json<ContentListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let bad_request = |e: String| (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e)));

    let view = CategoryView {
        type_filter: params
            .type_filter
            .as_deref()
            .map(str::parse::<TypeFilter>)
            .transpose()
            .map_err(bad_request)?
            .unwrap_or_default(),
        sort: params
            .sort
            .as_deref()
            .map(str::parse::<SortOrder>)
            .transpose()
            .map_err(bad_request)?
            .unwrap_or_default(),
    };

    let store = state.store();
    let known = key == ALL_CATEGORIES_KEY || store.categories().iter().any(|c| c.key == key);
    if !known {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("Category not found: {}", key))),
        ));
    }

    let items = store.browse(&key, view);
    let total = items.len();
    Ok(Json(ContentListResponse { items, total }))
}

/// GET /api/v1/content
///
/// The whole collection in load order, paged.
pub async fn list_content(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Json<PagedContentResponse> {
    let store = state.store();
    let version = store.version();
    let content = store.all_content();
    let limit = params.limit.unwrap_or(content.len());

    let items: Vec<ContentItem> = content
        .iter()
        .skip(params.offset)
        .take(limit)
        .cloned()
        .collect();

    Json(PagedContentResponse {
        items,
        total: content.len(),
        offset: params.offset,
        version,
    })
}

/// GET /api/v1/featured
pub async fn featured(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeaturedParams>,
) -> Json<ContentListResponse> {
    let items = state.store().featured(params.limit);
    let total = items.len();
    Json(ContentListResponse { items, total })
}
