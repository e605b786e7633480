//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Catalog loading (category fetches, load duration, collection size)
//! - Search and suggestions (cache hits and misses)
//! - Playback hand-off (launch outcomes)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Catalog Metrics
// =============================================================================

/// Category file fetches by result.
pub static CATEGORY_FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "ftpflix_category_fetches_total",
            "Total category file fetches",
        ),
        &["result"], // "ok", "failed"
    )
    .unwrap()
});

/// Items in the current collection.
pub static CATALOG_ITEMS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("ftpflix_catalog_items", "Items in the loaded catalog").unwrap()
});

/// Duration of full catalog loads in seconds.
pub static CATALOG_LOAD_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "ftpflix_catalog_load_duration_seconds",
            "Duration of a full catalog load",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
    )
    .unwrap()
});

/// Catalog loads by result.
pub static CATALOG_LOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ftpflix_catalog_loads_total", "Total catalog loads"),
        &["result"], // "ok", "failed", "rejected"
    )
    .unwrap()
});

// =============================================================================
// Search Metrics
// =============================================================================

/// Search requests by cache outcome.
pub static SEARCH_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ftpflix_search_requests_total", "Total search requests"),
        &["cache"], // "hit", "miss"
    )
    .unwrap()
});

/// Suggestion requests.
pub static SUGGESTION_REQUESTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "ftpflix_suggestion_requests_total",
        "Total suggestion requests",
    )
    .unwrap()
});

// =============================================================================
// Playback Metrics
// =============================================================================

/// Playback requests by outcome.
pub static PLAYBACK_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ftpflix_playback_requests_total", "Total playback requests"),
        &["outcome"], // "launched", "show_details", "no_source", "suppressed"
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Catalog
        Box::new(CATEGORY_FETCHES.clone()),
        Box::new(CATALOG_ITEMS.clone()),
        Box::new(CATALOG_LOAD_DURATION.clone()),
        Box::new(CATALOG_LOADS.clone()),
        // Search
        Box::new(SEARCH_REQUESTS.clone()),
        Box::new(SUGGESTION_REQUESTS.clone()),
        // Playback
        Box::new(PLAYBACK_REQUESTS.clone()),
    ]
}
