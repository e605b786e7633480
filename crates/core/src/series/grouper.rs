//! Collapses per-season series entries into one group per series.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::title::{core_title, main_title, placeholder_banner, season_number, strip_parenthetical};
use crate::catalog::{RawItem, Season};

/// Where a group's banner came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerSource {
    /// The first entry of the group had its own banner.
    Own,
    /// Exact banner table match on the core title.
    CoreTitle,
    /// Exact banner table match on the main title.
    MainTitle,
    /// Exact banner table match on the entry's original title.
    OriginalTitle,
    /// Case-insensitive substring match against a banner table key.
    Fuzzy,
    /// Generated from the title.
    Placeholder,
}

/// Banner lookup table keyed by title, first write wins.
///
/// Insertion order is kept so fuzzy lookups are deterministic.
#[derive(Debug, Default)]
pub struct BannerTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl BannerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from every item that has both a title and a banner.
    ///
    /// Each item registers its core title and its original title.
    pub fn harvest(items: &[RawItem]) -> Self {
        let mut table = Self::new();
        for item in items {
            let title = item.title.trim();
            let Some(banner) = item.banner() else {
                continue;
            };
            if title.is_empty() {
                continue;
            }
            table.insert(&core_title(title), banner);
            table.insert(title, banner);
        }
        table
    }

    /// Insert unless the key is already present. Returns whether it was inserted.
    pub fn insert(&mut self, key: &str, banner: &str) -> bool {
        if key.is_empty() || self.index.contains_key(key) {
            return false;
        }
        self.index.insert(key.to_string(), self.entries.len());
        self.entries.push((key.to_string(), banner.to_string()));
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&i| self.entries[i].1.as_str())
    }

    /// First banner whose key contains, or is contained in, any candidate
    /// (case-insensitive).
    pub fn find_fuzzy(&self, candidates: &[&str]) -> Option<&str> {
        let candidates: Vec<String> = candidates
            .iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        if candidates.is_empty() {
            return None;
        }

        self.entries
            .iter()
            .find(|(key, _)| {
                let key = key.to_lowercase();
                candidates
                    .iter()
                    .any(|c| key.contains(c.as_str()) || c.contains(key.as_str()))
            })
            .map(|(_, banner)| banner.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One logical series assembled from one or more raw entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesGroup {
    /// Main title the entries were grouped under.
    pub title: String,
    /// Main title without any trailing parenthetical.
    pub core_title: String,
    pub banner: String,
    pub banner_source: BannerSource,
    /// Seasons sorted by number, each with at least one episode.
    pub seasons: Vec<Season>,
    /// Uninterpreted fields of the first entry.
    #[serde(skip)]
    pub extra: Map<String, Value>,
}

impl From<SeriesGroup> for RawItem {
    fn from(group: SeriesGroup) -> Self {
        RawItem {
            title: group.title,
            banner: Some(group.banner),
            sources: None,
            seasons: Some(group.seasons),
            episodes: None,
            extra: group.extra,
        }
    }
}

/// Groups series entries by inferred title.
#[derive(Debug, Clone)]
pub struct SeriesGrouper {
    placeholder_base_url: String,
}

impl Default for SeriesGrouper {
    fn default() -> Self {
        Self::new(crate::config::BannerConfig::default().placeholder_base_url)
    }
}

impl SeriesGrouper {
    pub fn new(placeholder_base_url: impl Into<String>) -> Self {
        Self {
            placeholder_base_url: placeholder_base_url.into(),
        }
    }

    /// Group raw series entries.
    ///
    /// Groups come out in first-seen order of their main title. For a given
    /// season number the first season with episodes wins; later payloads for
    /// the same number are dropped. Groups that end up without any season are
    /// omitted.
    pub fn group(&self, items: &[RawItem]) -> Vec<SeriesGroup> {
        let banners = BannerTable::harvest(items);
        let mut groups: Vec<SeriesGroup> = Vec::new();
        let mut by_title: HashMap<String, usize> = HashMap::new();

        for item in items {
            let original = item.title.trim();
            if original.is_empty() {
                continue;
            }
            let Some(seasons) = item_seasons(item) else {
                debug!("Skipping series entry '{}' without seasons or episodes", original);
                continue;
            };

            let title = main_title(original);
            let idx = match by_title.get(&title) {
                Some(&idx) => idx,
                None => {
                    let group = self.new_group(item, &title, &banners);
                    groups.push(group);
                    by_title.insert(title, groups.len() - 1);
                    groups.len() - 1
                }
            };

            merge_seasons(&mut groups[idx].seasons, &seasons);
        }

        groups
            .into_iter()
            .filter_map(|mut group| {
                if group.seasons.is_empty() {
                    debug!("Dropping series '{}' with no playable seasons", group.title);
                    return None;
                }
                group.seasons.sort_by_key(|s| s.season_number);
                Some(group)
            })
            .collect()
    }

    fn new_group(&self, item: &RawItem, title: &str, banners: &BannerTable) -> SeriesGroup {
        let core = strip_parenthetical(title);
        let (banner, banner_source) = self.resolve_banner(item, title, &core, banners);

        SeriesGroup {
            title: title.to_string(),
            core_title: core,
            banner,
            banner_source,
            seasons: Vec::new(),
            extra: item.extra.clone(),
        }
    }

    fn resolve_banner(
        &self,
        item: &RawItem,
        title: &str,
        core: &str,
        banners: &BannerTable,
    ) -> (String, BannerSource) {
        if let Some(own) = item.banner() {
            return (own.to_string(), BannerSource::Own);
        }

        let exact = [
            (core, BannerSource::CoreTitle),
            (title, BannerSource::MainTitle),
            (item.title.trim(), BannerSource::OriginalTitle),
        ];
        for (key, source) in exact {
            if let Some(banner) = banners.get(key) {
                return (banner.to_string(), source);
            }
        }

        if let Some(banner) = banners.find_fuzzy(&[core, title]) {
            return (banner.to_string(), BannerSource::Fuzzy);
        }

        (
            placeholder_banner(&self.placeholder_base_url, title),
            BannerSource::Placeholder,
        )
    }
}

/// Seasons of an entry.
///
/// A flat episode list becomes a single season numbered after the title's
/// `"- Season N"` marker, or season 1 without one.
fn item_seasons(item: &RawItem) -> Option<Cow<'_, [Season]>> {
    if let Some(seasons) = item.seasons.as_deref().filter(|s| !s.is_empty()) {
        return Some(Cow::Borrowed(seasons));
    }
    item.episodes.as_ref().map(|episodes| {
        Cow::Owned(vec![Season {
            season_number: season_number(&item.title).unwrap_or(1),
            episodes: episodes.clone(),
        }])
    })
}

fn merge_seasons(target: &mut Vec<Season>, incoming: &[Season]) {
    for season in incoming {
        if season.episodes.is_empty() {
            continue;
        }
        if target.iter().any(|s| s.season_number == season.season_number) {
            continue;
        }
        target.push(season.clone());
    }
}
