//! Catalog data model: manifest, raw category files and normalized items.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Manifest key reserved for the aggregate view; never fetched on its own.
pub const ALL_CATEGORIES_KEY: &str = "all";

/// JSON names of the fields [`ContentItem::new`] sets.
const STAMPED_FIELDS: &[&str] = &["category", "categoryKey", "type"];

/// Kind of content held by a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Movie,
    Series,
}

impl ContentType {
    /// Interpret the `type` declared by a category file.
    ///
    /// Anything other than `"series"` is treated as a movie category.
    pub fn from_declared(declared: &str) -> Self {
        if declared.trim().eq_ignore_ascii_case("series") {
            ContentType::Series
        } else {
            ContentType::Movie
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Series => "series",
        }
    }
}

/// One manifest entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInfo {
    /// Display name.
    pub name: String,
    /// Declared number of items.
    #[serde(default)]
    pub count: u64,
}

/// The catalog manifest (`index.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogManifest {
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryInfo>,
}

impl CatalogManifest {
    /// Categories that are fetched individually, smallest declared count first.
    ///
    /// The reserved `"all"` key is excluded. Equal counts keep key order.
    pub fn fetch_order(&self) -> Vec<(&str, &CategoryInfo)> {
        let mut entries: Vec<(&str, &CategoryInfo)> = self
            .categories
            .iter()
            .filter(|(key, _)| key.as_str() != ALL_CATEGORIES_KEY)
            .map(|(key, info)| (key.as_str(), info))
            .collect();
        entries.sort_by_key(|(_, info)| info.count);
        entries
    }

    /// Display name for a key, if the manifest knows it.
    pub fn display_name(&self, key: &str) -> Option<&str> {
        self.categories.get(key).map(|info| info.name.as_str())
    }
}

/// A playable source at a given quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<serde_json::Number>,
    #[serde(default)]
    pub urls: Vec<String>,
}

impl VideoSource {
    pub fn first_url(&self) -> Option<&str> {
        self.urls
            .iter()
            .map(|u| u.trim())
            .find(|u| !u.is_empty())
    }
}

/// A series episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    #[serde(default)]
    pub episode_number: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<VideoSource>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Episode {
    /// First URL of the first source, if any.
    pub fn first_url(&self) -> Option<&str> {
        self.sources
            .as_deref()
            .and_then(|sources| sources.first())
            .and_then(VideoSource::first_url)
    }
}

/// A season of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub season_number: u32,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

/// An item as it appears in a category file.
///
/// Movies carry `sources`; series carry `seasons` or a flat `episodes` list.
/// Fields this crate does not interpret are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<VideoSource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasons: Option<Vec<Season>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<Vec<Episode>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawItem {
    /// Banner URL, ignoring blank values.
    pub fn banner(&self) -> Option<&str> {
        self.banner
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }
}

/// A per-category file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCategoryFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Vec<RawItem>,
}

impl RawCategoryFile {
    pub fn content_type(&self) -> ContentType {
        self.declared_type
            .as_deref()
            .map(ContentType::from_declared)
            .unwrap_or(ContentType::Movie)
    }
}

/// Accept any `items` value: non-arrays become an empty list, and entries
/// that do not parse or have a blank title are dropped.
fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<RawItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Null => return Ok(Vec::new()),
        other => {
            warn!("Category items is not an array (found {}), ignoring", json_kind(&other));
            return Ok(Vec::new());
        }
    };

    let mut items = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<RawItem>(entry) {
            Ok(item) if !item.title.trim().is_empty() => items.push(item),
            Ok(_) => warn!("Skipping item #{} without a title", index),
            Err(e) => warn!("Skipping malformed item #{}: {}", index, e),
        }
    }
    Ok(items)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A normalized catalog entry.
///
/// Series entries always have `seasons` populated and sorted, with unique
/// season numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(flatten)]
    pub raw: RawItem,
    /// Display name of the category.
    pub category: String,
    /// Manifest key of the category.
    #[serde(rename = "categoryKey")]
    pub category_key: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
}

impl ContentItem {
    /// Stamp category information onto a raw item.
    ///
    /// Source-supplied fields with the stamped names are dropped from
    /// `raw.extra`, so the stamped values are the only ones serialized.
    pub fn new(
        mut raw: RawItem,
        category: impl Into<String>,
        category_key: impl Into<String>,
        content_type: ContentType,
    ) -> Self {
        for key in STAMPED_FIELDS {
            raw.extra.remove(*key);
        }
        Self {
            raw,
            category: category.into(),
            category_key: category_key.into(),
            content_type,
        }
    }

    pub fn title(&self) -> &str {
        &self.raw.title
    }

    pub fn banner(&self) -> Option<&str> {
        self.raw.banner()
    }

    pub fn is_series(&self) -> bool {
        self.content_type == ContentType::Series
    }

    pub fn sources(&self) -> &[VideoSource] {
        self.raw.sources.as_deref().unwrap_or_default()
    }

    pub fn seasons(&self) -> &[Season] {
        self.raw.seasons.as_deref().unwrap_or_default()
    }

    /// Look up an episode by season and episode number.
    pub fn episode(&self, season_number: u32, episode_number: u32) -> Option<&Episode> {
        self.seasons()
            .iter()
            .find(|s| s.season_number == season_number)
            .and_then(|s| {
                s.episodes
                    .iter()
                    .find(|e| e.episode_number == episode_number)
            })
    }
}
