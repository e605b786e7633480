use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::events::{CategorySummary, SearchReply, StoreEvent, StoreStatus, StoreSummary};
use super::view::CategoryView;
use super::StoreError;
use crate::catalog::{
    CatalogLoader, CatalogManifest, CatalogSource, ContentItem, Episode, LoadEvent, LoadReport,
    ALL_CATEGORIES_KEY,
};
use crate::config::{Config, SearchConfig};
use crate::metrics::{CATALOG_ITEMS, CATALOG_LOADS, SUGGESTION_REQUESTS};
use crate::player::{MediaLauncher, PlaybackOutcome, Player};
use crate::search::{
    normalize_query, suggestions, Debouncer, SearchEngine, SearchResult, SuggestionOptions,
};
use crate::series::SeriesGrouper;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct StoreState {
    manifest: CatalogManifest,
    content: Arc<Vec<ContentItem>>,
    status: StoreStatus,
    version: u64,
    category_counts: BTreeMap<String, usize>,
    failed_categories: Vec<String>,
    last_loaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct PendingSearch {
    query: String,
    max_results: usize,
}

/// Holds the catalog and serves every read action against the current
/// snapshot.
///
/// Readers never wait for a load: they see whatever snapshot was last
/// published. Only one load runs at a time.
pub struct CatalogStore {
    loader: CatalogLoader,
    engine: SearchEngine,
    player: Player,
    search_config: SearchConfig,
    state: RwLock<StoreState>,
    events: broadcast::Sender<StoreEvent>,
    loading: AtomicBool,
    pending_search: Mutex<Option<PendingSearch>>,
}

/// Clears the in-progress flag when a load ends, however it ends.
struct LoadingFlag<'a>(&'a AtomicBool);

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CatalogStore {
    pub fn new(loader: CatalogLoader, player: Player, search_config: SearchConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            loader,
            engine: SearchEngine::new(search_config.cache_capacity),
            player,
            search_config,
            state: RwLock::new(StoreState::default()),
            events,
            loading: AtomicBool::new(false),
            pending_search: Mutex::new(None),
        }
    }

    /// Wire a store from configuration.
    pub fn from_config(
        source: Arc<dyn CatalogSource>,
        launcher: Arc<dyn MediaLauncher>,
        config: &Config,
    ) -> Self {
        let grouper = SeriesGrouper::new(config.banners.placeholder_base_url.clone());
        let loader = CatalogLoader::from_config(source, grouper, &config.catalog);
        let player = Player::from_config(launcher, &config.player);
        Self::new(loader, player, config.search.clone())
    }

    /// Receive store events.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Load (or reload) the catalog.
    ///
    /// Fails with [`StoreError::LoadInProgress`] if a load is already running
    /// and with [`StoreError::Manifest`] if the manifest cannot be fetched,
    /// leaving the current collection in place.
    pub async fn load(&self) -> Result<StoreSummary, StoreError> {
        self.begin_load()?;
        self.run_load().await
    }

    /// Same as [`load`](Self::load).
    pub async fn reload(&self) -> Result<StoreSummary, StoreError> {
        self.load().await
    }

    /// Start a load in the background.
    ///
    /// The in-progress check happens before this returns, so a caller can
    /// report a rejected reload synchronously.
    pub fn spawn_load(
        self: &Arc<Self>,
    ) -> Result<JoinHandle<Result<StoreSummary, StoreError>>, StoreError> {
        self.begin_load()?;
        let store = Arc::clone(self);
        Ok(tokio::spawn(async move { store.run_load().await }))
    }

    fn begin_load(&self) -> Result<(), StoreError> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Rejecting load, another one is running");
            CATALOG_LOADS.with_label_values(&["rejected"]).inc();
            return Err(StoreError::LoadInProgress);
        }
        self.write_state().status = StoreStatus::Loading;
        Ok(())
    }

    /// Body of a load. Expects the loading flag to be set.
    async fn run_load(&self) -> Result<StoreSummary, StoreError> {
        let _flag = LoadingFlag(&self.loading);
        self.publish(StoreEvent::LoadStarted);

        let mut first_snapshot = true;
        let result = self
            .loader
            .load(|event| match event {
                LoadEvent::Manifest(manifest) => {
                    let count = manifest.fetch_order().len();
                    self.write_state().manifest = manifest.clone();
                    self.publish(StoreEvent::CategoriesLoaded { count });
                }
                LoadEvent::Batch(progress) => {
                    self.apply_snapshot(progress.items, progress.categories, first_snapshot);
                    first_snapshot = false;
                }
            })
            .await;

        match result {
            Ok(report) => Ok(self.finish_load(report)),
            Err(e) => {
                warn!("Catalog load failed: {}", e);
                CATALOG_LOADS.with_label_values(&["failed"]).inc();
                self.write_state().status = StoreStatus::Failed {
                    message: e.to_string(),
                };
                self.lock_pending().take();
                self.publish(StoreEvent::LoadFailed {
                    error: e.to_string(),
                });
                Err(StoreError::Manifest(e))
            }
        }
    }

    /// Mark a successful load as finished.
    fn finish_load(&self, report: LoadReport) -> StoreSummary {
        if report.batches == 0 {
            // Nothing to fetch: the reload still replaces the collection.
            self.apply_snapshot(&[], &[], true);
        }
        let total = {
            let mut state = self.write_state();
            state.category_counts = report.category_counts;
            state.failed_categories = report.failed_categories.clone();
            state.status = StoreStatus::Ready;
            state.last_loaded_at = Some(Utc::now());
            state.content.len()
        };
        CATALOG_LOADS.with_label_values(&["ok"]).inc();
        info!(
            "Catalog ready: {} items (version {})",
            total,
            self.version()
        );
        self.publish(StoreEvent::LoadFinished {
            total,
            failed_categories: report.failed_categories,
        });

        // A search deferred after the last snapshot is answered from the
        // final collection.
        self.resolve_pending();
        self.summary()
    }

    /// Append a batch to the collection and publish the new snapshot.
    /// `reset` starts from an empty collection and drops the counts of the
    /// previous load.
    fn apply_snapshot(&self, added: &[ContentItem], categories: &[String], reset: bool) {
        let (version, total) = {
            let mut state = self.write_state();
            let mut content = if reset {
                state.category_counts.clear();
                state.failed_categories.clear();
                Arc::default()
            } else {
                std::mem::take(&mut state.content)
            };
            // Copies only when a reader still holds the previous snapshot.
            Arc::make_mut(&mut content).extend_from_slice(added);

            for key in categories {
                let count = added.iter().filter(|i| &i.category_key == key).count();
                state.category_counts.insert(key.clone(), count);
            }
            let total = content.len();
            state.content = content;
            state.version += 1;
            (state.version, total)
        };

        CATALOG_ITEMS.set(total as i64);
        debug!("Published catalog snapshot v{} with {} items", version, total);
        self.publish(StoreEvent::ContentUpdated { version, total });
        self.resolve_pending();
    }

    /// Re-run the deferred search, if any, against the current snapshot.
    fn resolve_pending(&self) {
        let pending = self.lock_pending().take();
        let Some(pending) = pending else {
            return;
        };

        let (content, version) = {
            let state = self.read_state();
            (Arc::clone(&state.content), state.version)
        };
        let results = self
            .engine
            .search(&pending.query, &content, version, pending.max_results);
        info!(
            "Resolved pending search '{}' with {} results",
            pending.query,
            results.len()
        );
        self.publish(StoreEvent::PendingSearchResolved {
            query: pending.query,
            results,
        });
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// The whole collection, in load order.
    pub fn all_content(&self) -> Arc<Vec<ContentItem>> {
        Arc::clone(&self.read_state().content)
    }

    pub fn status(&self) -> StoreStatus {
        self.read_state().status.clone()
    }

    /// Version of the current snapshot; bumped on every publish.
    pub fn version(&self) -> u64 {
        self.read_state().version
    }

    /// Manifest categories (including the aggregate entry) with loaded counts.
    pub fn categories(&self) -> Vec<CategorySummary> {
        let state = self.read_state();
        state
            .manifest
            .categories
            .iter()
            .map(|(key, info)| CategorySummary {
                key: key.clone(),
                name: info.name.clone(),
                declared_count: info.count,
                loaded_count: if key == ALL_CATEGORIES_KEY {
                    state.content.len()
                } else {
                    state.category_counts.get(key).copied().unwrap_or(0)
                },
            })
            .collect()
    }

    pub fn summary(&self) -> StoreSummary {
        let categories = self.categories();
        let state = self.read_state();
        StoreSummary {
            status: state.status.clone(),
            version: state.version,
            total_items: state.content.len(),
            categories,
            failed_categories: state.failed_categories.clone(),
            last_loaded_at: state.last_loaded_at,
        }
    }

    // =========================================================================
    // Browsing
    // =========================================================================

    /// Items of one category in load order. `"all"` returns everything.
    pub fn content_by_category(&self, category_key: &str) -> Vec<ContentItem> {
        let content = self.all_content();
        if category_key == ALL_CATEGORIES_KEY {
            return content.as_ref().clone();
        }
        content
            .iter()
            .filter(|item| item.category_key == category_key)
            .cloned()
            .collect()
    }

    /// A category filtered and sorted for display.
    pub fn browse(&self, category_key: &str, view: CategoryView) -> Vec<ContentItem> {
        let content = self.all_content();
        let all = category_key == ALL_CATEGORIES_KEY;
        view.apply(
            content
                .iter()
                .filter(|item| all || item.category_key == category_key),
        )
    }

    /// Items with a banner, in load order.
    pub fn featured(&self, limit: usize) -> Vec<ContentItem> {
        self.all_content()
            .iter()
            .filter(|item| item.banner().is_some())
            .take(limit)
            .cloned()
            .collect()
    }

    /// Look up an item by category key and exact title.
    pub fn find(&self, category_key: &str, title: &str) -> Option<ContentItem> {
        self.all_content()
            .iter()
            .find(|item| item.category_key == category_key && item.title() == title)
            .cloned()
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Search the current snapshot. `None` uses the configured default limit.
    pub fn search(&self, query: &str, max_results: Option<usize>) -> Vec<SearchResult> {
        self.search_or_defer(query, max_results).results
    }

    /// Like [`search`](Self::search), but reports whether the query was
    /// deferred.
    ///
    /// A query arriving while a load is running and nothing has been published
    /// yet is remembered and re-run once, either on the next snapshot or when
    /// the load finishes (see [`StoreEvent::PendingSearchResolved`]).
    pub fn search_or_defer(&self, query: &str, max_results: Option<usize>) -> SearchReply {
        let max_results = max_results.unwrap_or(self.search_config.default_max_results);
        if normalize_query(query).is_empty() {
            return SearchReply::default();
        }

        // Held across the check so a snapshot or load completion cannot slip
        // in between the check and the store of the query.
        let mut pending = self.lock_pending();
        let (content, version, loading) = {
            let state = self.read_state();
            (
                Arc::clone(&state.content),
                state.version,
                state.status == StoreStatus::Loading,
            )
        };

        if content.is_empty() {
            if !loading {
                return SearchReply::default();
            }
            debug!("Deferring search '{}' until content arrives", query.trim());
            *pending = Some(PendingSearch {
                query: query.to_string(),
                max_results,
            });
            return SearchReply {
                results: Vec::new(),
                deferred: true,
            };
        }
        drop(pending);

        SearchReply {
            results: self.engine.search(query, &content, version, max_results),
            deferred: false,
        }
    }

    /// Title suggestions for autocomplete.
    pub fn suggestions(&self, query: &str, max: Option<usize>) -> Vec<String> {
        SUGGESTION_REQUESTS.inc();
        let max = max.unwrap_or(self.search_config.default_max_suggestions);
        let options = SuggestionOptions {
            scan_limit: self.search_config.suggestion_scan_limit,
            min_query_len: self.search_config.min_suggestion_query_len,
        };
        let content = self.all_content();
        suggestions(query, content.iter().map(ContentItem::title), max, options)
    }

    /// A debouncer that runs [`search`](Self::search) with the last query
    /// given to it and passes the results to `on_results`.
    pub fn debounced_search<F>(self: &Arc<Self>, on_results: F) -> Debouncer<String>
    where
        F: Fn(String, Vec<SearchResult>) + Send + Sync + 'static,
    {
        let store = Arc::downgrade(self);
        Debouncer::new(self.search_config.debounce(), move |query: String| {
            if let Some(store) = store.upgrade() {
                let results = store.search(&query, None);
                on_results(query, results);
            }
        })
    }

    // =========================================================================
    // Playback
    // =========================================================================

    pub async fn play_content(
        &self,
        item: &ContentItem,
        source_index: Option<usize>,
    ) -> PlaybackOutcome {
        self.player.play_content(item, source_index).await
    }

    pub async fn play_episode(&self, episode: &Episode, series_title: &str) -> PlaybackOutcome {
        self.player.play_episode(episode, series_title).await
    }

    pub fn launcher_name(&self) -> &str {
        self.player.launcher_name()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn publish(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<PendingSearch>> {
        self.pending_search
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
