//! Process-wide catalog state.
//!
//! [`CatalogStore`] owns the loaded collection and exposes the read actions
//! (browse, search, suggestions), the reload trigger and the playback
//! hand-off. Changes are announced on a broadcast channel of [`StoreEvent`]s.

mod catalog_store;
mod events;
mod view;

pub use catalog_store::CatalogStore;
pub use events::{CategorySummary, SearchReply, StoreEvent, StoreStatus, StoreSummary};
pub use view::{CategoryView, SortOrder, TypeFilter};

use thiserror::Error;

use crate::catalog::CatalogError;

/// Errors returned by store actions.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The manifest could not be fetched; the collection is unchanged.
    #[error("Failed to load catalog manifest: {0}")]
    Manifest(#[from] CatalogError),

    /// Another load is still running.
    #[error("A catalog load is already in progress")]
    LoadInProgress,
}
