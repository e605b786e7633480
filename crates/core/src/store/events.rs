use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::search::SearchResult;

/// Lifecycle of the store's collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StoreStatus {
    /// Nothing loaded yet.
    #[default]
    Idle,
    Loading,
    Ready,
    /// The last load could not fetch the manifest.
    Failed { message: String },
}

impl StoreStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreStatus::Idle => "idle",
            StoreStatus::Loading => "loading",
            StoreStatus::Ready => "ready",
            StoreStatus::Failed { .. } => "failed",
        }
    }
}

/// Notifications published by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    LoadStarted,
    /// The manifest arrived; `count` categories will be fetched.
    CategoriesLoaded { count: usize },
    /// A new snapshot of the collection is available.
    ContentUpdated { version: u64, total: usize },
    LoadFinished {
        total: usize,
        failed_categories: Vec<String>,
    },
    LoadFailed { error: String },
    /// A search issued before any content was available was re-run.
    PendingSearchResolved {
        query: String,
        results: Vec<SearchResult>,
    },
}

/// One manifest category with its loaded item count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub key: String,
    pub name: String,
    /// Count declared by the manifest.
    pub declared_count: u64,
    /// Items actually loaded from the category.
    pub loaded_count: usize,
}

/// Snapshot of the store state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub status: StoreStatus,
    pub version: u64,
    pub total_items: usize,
    pub categories: Vec<CategorySummary>,
    pub failed_categories: Vec<String>,
    pub last_loaded_at: Option<DateTime<Utc>>,
}

/// Results of a store search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchReply {
    pub results: Vec<SearchResult>,
    /// No content was available yet; the query will be answered by a
    /// [`StoreEvent::PendingSearchResolved`] event.
    pub deferred: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(StoreEvent::ContentUpdated {
            version: 3,
            total: 42,
        })
        .unwrap();
        assert_eq!(json["type"], "content_updated");
        assert_eq!(json["version"], 3);

        let json = serde_json::to_value(StoreEvent::LoadStarted).unwrap();
        assert_eq!(json["type"], "load_started");
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(StoreStatus::Failed {
            message: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["message"], "boom");
        assert_eq!(StoreStatus::default().as_str(), "idle");
    }
}
