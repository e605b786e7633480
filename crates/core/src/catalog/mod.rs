//! Catalog loading from a static JSON index.
//!
//! A catalog is a manifest (`index.json`) naming categories, plus one JSON
//! file per category. The [`CatalogLoader`] fetches them in small,
//! size-ordered batches and merges everything into one flat collection.

mod http;
mod loader;
mod types;

pub use http::HttpCatalogSource;
pub use loader::{plan_batches, BatchProgress, CatalogLoader, LoadEvent, LoadReport};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while fetching catalog files.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("Unexpected status {status} for {url}")]
    StatusError { status: u16, url: String },

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Source of catalog files.
///
/// Implemented by [`HttpCatalogSource`] for real deployments and by
/// `testing::MockCatalogSource` in tests.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch the category manifest.
    async fn fetch_manifest(&self) -> Result<CatalogManifest, CatalogError>;

    /// Fetch the item file of one category.
    async fn fetch_category(&self, key: &str) -> Result<RawCategoryFile, CatalogError>;
}
