//! Mock catalog source for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::time::Instant;

use crate::catalog::{CatalogError, CatalogManifest, CatalogSource, RawCategoryFile};

/// A recorded category fetch for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedFetch {
    /// Category key that was requested.
    pub key: String,
    /// When the fetch started.
    pub started: Instant,
    /// When the fetch returned.
    pub finished: Instant,
}

/// Mock implementation of the CatalogSource trait.
///
/// Provides controllable behavior for testing:
/// - Serve a configurable manifest and category files
/// - Fail the manifest or individual categories
/// - Record category fetches with start/finish times
/// - Add latency, or hold category fetches until released
///
/// # Example
///
/// ```rust,ignore
/// let source = MockCatalogSource::new();
/// source.set_manifest(fixtures::manifest(&[("drama", "Drama", 2)])).await;
/// source.add_category("drama", fixtures::movie_file("Drama", &["Heat", "Ronin"])).await;
/// source.fail_category("horror").await;
///
/// let loader = CatalogLoader::new(Arc::new(source), SeriesGrouper::default());
/// ```
#[derive(Debug)]
pub struct MockCatalogSource {
    manifest: Arc<RwLock<CatalogManifest>>,
    categories: Arc<RwLock<HashMap<String, RawCategoryFile>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    manifest_fails: Arc<RwLock<bool>>,
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
    manifest_fetches: AtomicUsize,
    latency: Duration,
    held: watch::Sender<bool>,
}

impl Default for MockCatalogSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalogSource {
    /// Create a mock with an empty manifest.
    pub fn new() -> Self {
        let (held, _) = watch::channel(false);
        Self {
            manifest: Arc::new(RwLock::new(CatalogManifest::default())),
            categories: Arc::new(RwLock::new(HashMap::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            manifest_fails: Arc::new(RwLock::new(false)),
            fetches: Arc::new(RwLock::new(Vec::new())),
            manifest_fetches: AtomicUsize::new(0),
            latency: Duration::ZERO,
            held,
        }
    }

    /// Delay every category fetch by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace the manifest.
    pub async fn set_manifest(&self, manifest: CatalogManifest) {
        *self.manifest.write().await = manifest;
    }

    /// Current manifest.
    pub async fn manifest(&self) -> CatalogManifest {
        self.manifest.read().await.clone()
    }

    /// Serve `file` for `key`.
    pub async fn add_category(&self, key: &str, file: RawCategoryFile) {
        self.categories.write().await.insert(key.to_string(), file);
    }

    /// Make fetches of `key` fail.
    pub async fn fail_category(&self, key: &str) {
        self.failing.write().await.insert(key.to_string());
    }

    /// Make manifest fetches fail (or succeed again).
    pub async fn fail_manifest(&self, fail: bool) {
        *self.manifest_fails.write().await = fail;
    }

    /// Block category fetches until [`release_categories`](Self::release_categories).
    pub fn hold_categories(&self) {
        self.held.send_replace(true);
    }

    /// Let held category fetches complete.
    pub fn release_categories(&self) {
        self.held.send_replace(false);
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    /// Category fetches in completion order.
    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }

    /// Number of manifest fetches.
    pub fn manifest_fetches(&self) -> usize {
        self.manifest_fetches.load(Ordering::SeqCst)
    }

    /// Clear recorded fetches.
    pub async fn clear_recorded(&self) {
        self.fetches.write().await.clear();
        self.manifest_fetches.store(0, Ordering::SeqCst);
    }

    async fn wait_until_released(&self) {
        let mut rx = self.held.subscribe();
        // The sender lives in self, so the channel cannot close here.
        let _ = rx.wait_for(|held| !*held).await;
    }
}

#[async_trait]
impl CatalogSource for MockCatalogSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_manifest(&self) -> Result<CatalogManifest, CatalogError> {
        self.manifest_fetches.fetch_add(1, Ordering::SeqCst);
        if *self.manifest_fails.read().await {
            return Err(CatalogError::StatusError {
                status: 503,
                url: "mock://index.json".to_string(),
            });
        }
        Ok(self.manifest.read().await.clone())
    }

    async fn fetch_category(&self, key: &str) -> Result<RawCategoryFile, CatalogError> {
        let started = Instant::now();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.wait_until_released().await;

        let result = if self.failing.read().await.contains(key) {
            Err(CatalogError::StatusError {
                status: 500,
                url: format!("mock://{}.json", key),
            })
        } else {
            self.categories
                .read()
                .await
                .get(key)
                .cloned()
                .ok_or_else(|| CatalogError::NotFound(format!("mock://{}.json", key)))
        };

        self.fetches.write().await.push(RecordedFetch {
            key: key.to_string(),
            started,
            finished: Instant::now(),
        });
        result
    }
}
