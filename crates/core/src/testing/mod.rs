//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external service traits,
//! allowing store and server tests to run without a catalog host or a media
//! player.
//!
//! # Example
//!
//! ```rust,ignore
//! use ftpflix_core::testing::{fixtures, MockCatalogSource, MockLauncher};
//!
//! let source = MockCatalogSource::new();
//! source.set_manifest(fixtures::manifest(&[("kids", "Kids", 1)])).await;
//! source.add_category("kids", fixtures::movie_file("Kids", &["Bluey"])).await;
//!
//! let launcher = MockLauncher::new();
//! // Build a CatalogStore around them...
//! ```

mod mock_catalog_source;
mod mock_launcher;

pub use mock_catalog_source::{MockCatalogSource, RecordedFetch};
pub use mock_launcher::MockLauncher;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::collections::BTreeMap;

    use crate::catalog::{
        CatalogManifest, CategoryInfo, ContentItem, ContentType, Episode, RawCategoryFile,
        RawItem, Season, VideoSource,
    };

    /// Build a manifest from `(key, name, count)` entries.
    pub fn manifest(entries: &[(&str, &str, u64)]) -> CatalogManifest {
        let categories: BTreeMap<String, CategoryInfo> = entries
            .iter()
            .map(|(key, name, count)| {
                (
                    key.to_string(),
                    CategoryInfo {
                        name: name.to_string(),
                        count: *count,
                    },
                )
            })
            .collect();
        CatalogManifest { categories }
    }

    /// A video source with the given URLs.
    pub fn source(urls: &[&str]) -> VideoSource {
        VideoSource {
            quality: Some(1080.into()),
            urls: urls.iter().map(|u| u.to_string()).collect(),
        }
    }

    /// A raw movie with one source derived from its title.
    pub fn raw_movie(title: &str) -> RawItem {
        let slug = title.to_lowercase().replace(' ', "-");
        RawItem {
            title: title.to_string(),
            banner: Some(format!("http://img.local/{}.jpg", slug)),
            sources: Some(vec![source(&[&format!("http://ftp.local/movies/{}.mkv", slug)])]),
            ..Default::default()
        }
    }

    /// A movie category file.
    pub fn movie_file(category: &str, titles: &[&str]) -> RawCategoryFile {
        RawCategoryFile {
            category: Some(category.to_string()),
            declared_type: Some("movie".to_string()),
            items: titles.iter().map(|t| raw_movie(t)).collect(),
        }
    }

    /// A series category file.
    pub fn series_file(category: &str, items: Vec<RawItem>) -> RawCategoryFile {
        RawCategoryFile {
            category: Some(category.to_string()),
            declared_type: Some("series".to_string()),
            items,
        }
    }

    /// An episode with one source.
    pub fn episode(series: &str, season_number: u32, episode_number: u32) -> Episode {
        let slug = series.to_lowercase().replace(' ', "-");
        Episode {
            episode_number,
            title: format!("Episode {}", episode_number),
            sources: Some(vec![source(&[&format!(
                "http://ftp.local/series/{}/s{:02}e{:02}.mkv",
                slug, season_number, episode_number
            )])]),
            extra: Default::default(),
        }
    }

    /// A season with `episodes` episodes.
    pub fn season(series: &str, season_number: u32, episodes: u32) -> Season {
        Season {
            season_number,
            episodes: (1..=episodes)
                .map(|e| episode(series, season_number, e))
                .collect(),
        }
    }

    /// A raw series entry carrying `seasons`, two episodes each.
    pub fn raw_series(title: &str, seasons: &[u32]) -> RawItem {
        RawItem {
            title: title.to_string(),
            seasons: Some(seasons.iter().map(|n| season(title, *n, 2)).collect()),
            ..Default::default()
        }
    }

    /// A normalized movie.
    pub fn movie_item(title: &str, category: &str, category_key: &str) -> ContentItem {
        ContentItem::new(raw_movie(title), category, category_key, ContentType::Movie)
    }

    /// A normalized movie with explicit sources, one URL list per source.
    pub fn movie_with_sources(title: &str, sources: &[&[&str]]) -> ContentItem {
        let raw = RawItem {
            title: title.to_string(),
            sources: Some(sources.iter().map(|urls| source(urls)).collect()),
            ..Default::default()
        };
        ContentItem::new(raw, "Movies", "movies", ContentType::Movie)
    }

    /// A normalized series.
    pub fn series_item(
        title: &str,
        category: &str,
        category_key: &str,
        seasons: &[u32],
    ) -> ContentItem {
        ContentItem::new(
            raw_series(title, seasons),
            category,
            category_key,
            ContentType::Series,
        )
    }
}
