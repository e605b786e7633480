//! Scored search over the catalog.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cache::FifoCache;
use crate::catalog::ContentItem;
use crate::metrics::SEARCH_REQUESTS;

/// Points for a term found at the start of the title.
const TITLE_PREFIX_SCORE: u32 = 10;
/// Points for a term first found within the first characters of the title.
const TITLE_EARLY_SCORE: u32 = 5;
/// Points for a term found later in the title.
const TITLE_LATE_SCORE: u32 = 2;
/// Points for a term found in the category name.
const CATEGORY_SCORE: u32 = 1;
/// Characters considered "early" in a title.
const EARLY_WINDOW: usize = 10;

/// A content item with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub item: ContentItem,
    #[serde(rename = "searchScore")]
    pub search_score: u32,
}

/// Lower-case and trim a query.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Split a normalized query into terms.
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized.split_whitespace().collect()
}

/// Character position of the first occurrence of `needle`.
pub(crate) fn char_position(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .find(needle)
        .map(|byte_idx| haystack[..byte_idx].chars().count())
}

/// Score an item against query terms.
///
/// Returns `None` when no term matches the title or the category.
pub fn score_item(item: &ContentItem, terms: &[&str]) -> Option<u32> {
    let title = item.title().to_lowercase();
    if title.trim().is_empty() {
        return None;
    }
    let category = item.category.to_lowercase();

    let mut score = 0;
    let mut matched_terms = 0;

    for term in terms {
        let title_hit = char_position(&title, term);
        if let Some(pos) = title_hit {
            matched_terms += 1;
            score += match pos {
                0 => TITLE_PREFIX_SCORE,
                p if p < EARLY_WINDOW => TITLE_EARLY_SCORE,
                _ => TITLE_LATE_SCORE,
            };
        }

        if !category.is_empty() && category.contains(term) {
            score += CATEGORY_SCORE;
            if title_hit.is_none() {
                matched_terms += 1;
            }
        }
    }

    (matched_terms > 0).then_some(score)
}

/// Search `content` for `query`.
///
/// Results are ordered by descending score; equal scores keep collection
/// order. Blank queries and empty collections yield no results.
pub fn search(query: &str, content: &[ContentItem], max_results: usize) -> Vec<SearchResult> {
    let normalized = normalize_query(query);
    let terms = tokenize(&normalized);
    if terms.is_empty() || content.is_empty() || max_results == 0 {
        return Vec::new();
    }

    let mut results: Vec<SearchResult> = content
        .iter()
        .filter_map(|item| {
            score_item(item, &terms).map(|search_score| SearchResult {
                item: item.clone(),
                search_score,
            })
        })
        .collect();

    // sort_by is stable
    results.sort_by(|a, b| b.search_score.cmp(&a.search_score));
    results.truncate(max_results);
    results
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    query: String,
    max_results: usize,
    content_version: u64,
}

/// [`search`] with a bounded result cache.
///
/// Entries are keyed by normalized query, result limit and the version of the
/// collection they were computed from, so a reload never serves results of a
/// previous collection.
pub struct SearchEngine {
    cache: Mutex<FifoCache<CacheKey, Vec<SearchResult>>>,
}

impl SearchEngine {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: Mutex::new(FifoCache::new(cache_capacity)),
        }
    }

    /// Search with caching. `content_version` must change whenever `content`
    /// does.
    pub fn search(
        &self,
        query: &str,
        content: &[ContentItem],
        content_version: u64,
        max_results: usize,
    ) -> Vec<SearchResult> {
        let normalized = normalize_query(query);
        if normalized.is_empty() || content.is_empty() {
            return Vec::new();
        }

        let key = CacheKey {
            query: normalized,
            max_results,
            content_version,
        };

        if let Some(hit) = self.lock_cache().get(&key) {
            debug!("Search cache hit for '{}'", key.query);
            SEARCH_REQUESTS.with_label_values(&["hit"]).inc();
            return hit.clone();
        }

        SEARCH_REQUESTS.with_label_values(&["miss"]).inc();
        let results = search(&key.query, content, max_results);
        debug!("Search '{}' matched {} items", key.query, results.len());
        self.lock_cache().insert(key, results.clone());
        results
    }

    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.lock_cache().len()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, FifoCache<CacheKey, Vec<SearchResult>>> {
        // The cache holds no invariants a panicking reader could break.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(100)
    }
}
