//! Batched catalog loader.
//!
//! Categories are fetched smallest first, a few at a time. Batches run one
//! after another so early (small) categories become visible quickly and the
//! number of requests in flight stays bounded.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{debug, info, warn};

use super::types::{CatalogManifest, ContentItem, ContentType, RawCategoryFile, RawItem};
use super::{CatalogError, CatalogSource};
use crate::config::CatalogConfig;
use crate::metrics::{CATALOG_ITEMS, CATALOG_LOAD_DURATION, CATEGORY_FETCHES};
use crate::series::SeriesGrouper;

/// Split the manifest's fetchable categories into batches of `batch_size`,
/// smallest declared count first.
pub fn plan_batches(manifest: &CatalogManifest, batch_size: usize) -> Vec<Vec<String>> {
    let keys: Vec<String> = manifest
        .fetch_order()
        .into_iter()
        .map(|(key, _)| key.to_string())
        .collect();
    keys.chunks(batch_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Progress published after each batch.
#[derive(Debug)]
pub struct BatchProgress<'a> {
    /// Zero-based batch index.
    pub batch_index: usize,
    pub batch_count: usize,
    /// Category keys fetched in this batch.
    pub categories: &'a [String],
    /// Items added by this batch, in category order.
    pub items: &'a [ContentItem],
    /// Items loaded so far, this batch included.
    pub total_items: usize,
}

/// Events observed while a load runs.
#[derive(Debug)]
pub enum LoadEvent<'a> {
    /// The manifest was fetched.
    Manifest(&'a CatalogManifest),
    /// A batch finished; carries the items it added.
    Batch(BatchProgress<'a>),
}

/// Final result of a load.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub manifest: CatalogManifest,
    pub total_items: usize,
    /// Items contributed per category key.
    pub category_counts: BTreeMap<String, usize>,
    /// Categories whose file could not be fetched or parsed.
    pub failed_categories: Vec<String>,
    pub batches: usize,
    pub duration: Duration,
}

/// Loads the whole catalog from a [`CatalogSource`].
pub struct CatalogLoader {
    source: Arc<dyn CatalogSource>,
    grouper: SeriesGrouper,
    batch_size: usize,
    batch_delay: Duration,
}

impl CatalogLoader {
    /// Create a loader with the default batch size (3) and delay (50 ms).
    pub fn new(source: Arc<dyn CatalogSource>, grouper: SeriesGrouper) -> Self {
        Self {
            source,
            grouper,
            batch_size: 3,
            batch_delay: Duration::from_millis(50),
        }
    }

    /// Create a loader with batch settings from configuration.
    pub fn from_config(
        source: Arc<dyn CatalogSource>,
        grouper: SeriesGrouper,
        config: &CatalogConfig,
    ) -> Self {
        Self::new(source, grouper)
            .with_batch_size(config.batch_size)
            .with_batch_delay(config.batch_delay())
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    /// Load every category.
    ///
    /// Only a manifest failure is returned as an error. A category that fails
    /// to load is logged and contributes no items. `observer` sees the manifest
    /// and then the items of every batch; the loader keeps no copy of them.
    pub async fn load<F>(&self, mut observer: F) -> Result<LoadReport, CatalogError>
    where
        F: FnMut(LoadEvent<'_>) + Send,
    {
        let started = Instant::now();
        info!("Loading catalog manifest from {} source", self.source.name());

        let manifest = self.source.fetch_manifest().await?;
        observer(LoadEvent::Manifest(&manifest));

        let batches = plan_batches(&manifest, self.batch_size);
        info!(
            "Catalog has {} categories in {} batches",
            batches.iter().map(Vec::len).sum::<usize>(),
            batches.len()
        );

        let mut total_items = 0;
        let mut category_counts = BTreeMap::new();
        let mut failed_categories = Vec::new();

        for (batch_index, batch) in batches.iter().enumerate() {
            if batch_index > 0 && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }

            debug!("Fetching batch {}: {:?}", batch_index + 1, batch);
            let results = join_all(batch.iter().map(|key| self.source.fetch_category(key))).await;
            let mut added: Vec<ContentItem> = Vec::new();

            for (key, result) in batch.iter().zip(results) {
                match result {
                    Ok(file) => {
                        let display_name = manifest.display_name(key).unwrap_or(key.as_str());
                        let items = self.normalize(key, display_name, file);
                        debug!("Loaded {} items from '{}'", items.len(), key);
                        CATEGORY_FETCHES.with_label_values(&["ok"]).inc();
                        category_counts.insert(key.clone(), items.len());
                        added.extend(items);
                    }
                    Err(e) => {
                        warn!("Failed to load category '{}': {}", key, e);
                        CATEGORY_FETCHES.with_label_values(&["failed"]).inc();
                        category_counts.insert(key.clone(), 0);
                        failed_categories.push(key.clone());
                    }
                }
            }

            total_items += added.len();
            observer(LoadEvent::Batch(BatchProgress {
                batch_index,
                batch_count: batches.len(),
                categories: batch,
                items: &added,
                total_items,
            }));
        }

        let duration = started.elapsed();
        CATALOG_ITEMS.set(total_items as i64);
        CATALOG_LOAD_DURATION.observe(duration.as_secs_f64());
        info!(
            "Catalog loaded: {} items, {} failed categories, {:?}",
            total_items,
            failed_categories.len(),
            duration
        );

        Ok(LoadReport {
            manifest,
            total_items,
            category_counts,
            failed_categories,
            batches: batches.len(),
            duration,
        })
    }

    /// Turn a category file into normalized items.
    fn normalize(&self, key: &str, display_name: &str, file: RawCategoryFile) -> Vec<ContentItem> {
        let content_type = file.content_type();
        let category = file
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| display_name.to_string());

        let items: Vec<RawItem> = match content_type {
            ContentType::Series => self
                .grouper
                .group(&file.items)
                .into_iter()
                .map(RawItem::from)
                .collect(),
            ContentType::Movie => file.items,
        };

        items
            .into_iter()
            .map(|raw| ContentItem::new(raw, category.clone(), key, content_type))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockCatalogSource};
    use serde_json::json;

    fn loader(source: &Arc<MockCatalogSource>) -> CatalogLoader {
        CatalogLoader::new(Arc::clone(source) as Arc<dyn CatalogSource>, SeriesGrouper::default())
            .with_batch_delay(Duration::ZERO)
    }

    /// Run a load and collect every published item.
    async fn load_all(loader: &CatalogLoader) -> (LoadReport, Vec<ContentItem>) {
        let mut content = Vec::new();
        let report = loader
            .load(|event| {
                if let LoadEvent::Batch(progress) = event {
                    content.extend_from_slice(progress.items);
                }
            })
            .await
            .unwrap();
        (report, content)
    }

    #[test]
    fn test_plan_batches_sizes() {
        let manifest = fixtures::manifest(&[
            ("all", "All", 999),
            ("a", "A", 5),
            ("b", "B", 1),
            ("c", "C", 9),
            ("d", "D", 3),
            ("e", "E", 7),
        ]);

        let batches = plan_batches(&manifest, 3);
        assert_eq!(batches, vec![vec!["b", "d", "a"], vec!["e", "c"]]);
        assert!(batches.iter().all(|b| b.len() <= 3));
        assert!(batches.iter().flatten().all(|k| k != "all"));
    }

    #[test]
    fn test_plan_batches_zero_size_is_clamped() {
        let manifest = fixtures::manifest(&[("a", "A", 1), ("b", "B", 2)]);
        assert_eq!(plan_batches(&manifest, 0), vec![vec!["a"], vec!["b"]]);
    }

    #[tokio::test]
    async fn test_load_fetch_order_and_all_skipped() {
        let source = Arc::new(MockCatalogSource::new());
        source
            .set_manifest(fixtures::manifest(&[
                ("all", "All", 500),
                ("kids", "Kids", 10),
                ("drama", "Drama", 400),
            ]))
            .await;
        source
            .add_category("kids", fixtures::movie_file("Kids", &["Bluey"]))
            .await;
        source
            .add_category("drama", fixtures::movie_file("Drama", &["Heat", "Ronin"]))
            .await;

        let mut batch_sizes = Vec::new();
        let mut content = Vec::new();
        let report = loader(&source)
            .load(|event| {
                if let LoadEvent::Batch(progress) = event {
                    batch_sizes.push(progress.categories.len());
                    content.extend_from_slice(progress.items);
                }
            })
            .await
            .unwrap();

        let fetched: Vec<String> = source
            .recorded_fetches()
            .await
            .into_iter()
            .map(|f| f.key)
            .collect();
        assert_eq!(fetched, vec!["kids", "drama"]);
        assert_eq!(batch_sizes, vec![2]);
        assert_eq!(report.batches, 1);

        assert_eq!(report.total_items, 3);

        let titles: Vec<&str> = content.iter().map(|i| i.title()).collect();
        assert_eq!(titles, vec!["Bluey", "Heat", "Ronin"]);
        assert_eq!(content[0].category_key, "kids");
        assert_eq!(content[0].category, "Kids");
        assert_eq!(content[0].content_type, ContentType::Movie);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_run_sequentially() {
        let source = Arc::new(MockCatalogSource::new().with_latency(Duration::from_millis(100)));
        let mut entries = Vec::new();
        for i in 0..7u64 {
            entries.push((format!("cat{}", i), format!("Cat {}", i), i));
        }
        let refs: Vec<(&str, &str, u64)> = entries
            .iter()
            .map(|(k, n, c)| (k.as_str(), n.as_str(), *c))
            .collect();
        source.set_manifest(fixtures::manifest(&refs)).await;
        for (key, name, _) in &entries {
            source
                .add_category(key, fixtures::movie_file(name, &[name.as_str()]))
                .await;
        }

        let report = CatalogLoader::new(
            Arc::clone(&source) as Arc<dyn CatalogSource>,
            SeriesGrouper::default(),
        )
        .load(|_| {})
        .await
        .unwrap();
        assert_eq!(report.batches, 3);
        assert_eq!(report.total_items, 7);

        let fetches = source.recorded_fetches().await;
        let batches = plan_batches(&source.manifest().await, 3);
        for pair in batches.windows(2) {
            let previous_done = fetches
                .iter()
                .filter(|f| pair[0].contains(&f.key))
                .map(|f| f.finished)
                .max()
                .unwrap();
            let next_started = fetches
                .iter()
                .filter(|f| pair[1].contains(&f.key))
                .map(|f| f.started)
                .min()
                .unwrap();
            assert!(next_started >= previous_done);
        }
    }

    #[tokio::test]
    async fn test_category_failure_is_recovered() {
        let source = Arc::new(MockCatalogSource::new());
        source
            .set_manifest(fixtures::manifest(&[("good", "Good", 1), ("bad", "Bad", 2)]))
            .await;
        source
            .add_category("good", fixtures::movie_file("Good", &["Heat"]))
            .await;
        source.fail_category("bad").await;

        let report = loader(&source).load(|_| {}).await.unwrap();
        assert_eq!(report.total_items, 1);
        assert_eq!(report.failed_categories, vec!["bad"]);
        assert_eq!(report.category_counts.get("bad"), Some(&0));
        assert_eq!(report.category_counts.get("good"), Some(&1));
    }

    #[tokio::test]
    async fn test_manifest_failure_is_an_error() {
        let source = Arc::new(MockCatalogSource::new());
        source.fail_manifest(true).await;

        let mut events = 0;
        let result = loader(&source).load(|_| events += 1).await;
        assert!(result.is_err());
        assert_eq!(events, 0);
        assert!(source.recorded_fetches().await.is_empty());
    }

    #[tokio::test]
    async fn test_series_categories_are_grouped() {
        let source = Arc::new(MockCatalogSource::new());
        source
            .set_manifest(fixtures::manifest(&[("tv", "TV Shows", 2)]))
            .await;
        let file: RawCategoryFile = serde_json::from_value(json!({
            "category": "English Series",
            "type": "series",
            "items": [
                {"title": "X - Stranger Things - Season 1", "episodes": [{"episode_number": 1, "title": "Pilot"}]},
                {"title": "X - Stranger Things - Season 2", "episodes": [{"episode_number": 1, "title": "MadMax"}]}
            ]
        }))
        .unwrap();
        source.add_category("tv", file).await;

        let (report, content) = load_all(&loader(&source)).await;
        assert_eq!(report.total_items, 1);

        let show = &content[0];
        assert_eq!(show.title(), "Stranger Things");
        assert_eq!(show.category, "English Series");
        assert!(show.is_series());
        let numbers: Vec<u32> = show.seasons().iter().map(|s| s.season_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert!(show.banner().is_some());
    }

    #[tokio::test]
    async fn test_missing_category_name_falls_back_to_manifest() {
        let source = Arc::new(MockCatalogSource::new());
        source
            .set_manifest(fixtures::manifest(&[("docs", "Documentaries", 1)]))
            .await;
        let file: RawCategoryFile =
            serde_json::from_value(json!({"items": [{"title": "Planet Earth"}]})).unwrap();
        source.add_category("docs", file).await;

        let (_, content) = load_all(&loader(&source)).await;
        assert_eq!(content[0].category, "Documentaries");
        assert_eq!(content[0].content_type, ContentType::Movie);
    }

    #[tokio::test]
    async fn test_progress_is_published_per_batch() {
        let source = Arc::new(MockCatalogSource::new());
        source
            .set_manifest(fixtures::manifest(&[
                ("a", "A", 1),
                ("b", "B", 2),
                ("c", "C", 3),
                ("d", "D", 4),
            ]))
            .await;
        for key in ["a", "b", "c", "d"] {
            source
                .add_category(key, fixtures::movie_file(key, &[key]))
                .await;
        }

        let mut snapshots = Vec::new();
        let mut saw_manifest = false;
        loader(&source)
            .load(|event| match event {
                LoadEvent::Manifest(_) => saw_manifest = true,
                LoadEvent::Batch(progress) => {
                    snapshots.push((
                        progress.batch_index,
                        progress.batch_count,
                        progress.items.len(),
                        progress.total_items,
                    ))
                }
            })
            .await
            .unwrap();

        assert!(saw_manifest);
        assert_eq!(snapshots, vec![(0, 2, 3, 3), (1, 2, 1, 4)]);
    }
}
