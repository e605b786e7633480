use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::{ContentItem, ContentType};

/// Which content types a category view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFilter {
    #[default]
    All,
    Movie,
    Series,
}

impl TypeFilter {
    pub fn matches(&self, item: &ContentItem) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Movie => item.content_type == ContentType::Movie,
            TypeFilter::Series => item.content_type == ContentType::Series,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(TypeFilter::All),
            "movie" | "movies" => Ok(TypeFilter::Movie),
            "series" => Ok(TypeFilter::Series),
            other => Err(format!("unknown type filter: {}", other)),
        }
    }
}

/// Ordering of a category view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Case-insensitive title order.
    #[default]
    Title,
    /// Movies before series.
    Type,
    /// Collection (load) order.
    Catalog,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "title" => Ok(SortOrder::Title),
            "type" => Ok(SortOrder::Type),
            "catalog" | "none" => Ok(SortOrder::Catalog),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// Filter and ordering applied when browsing a category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryView {
    #[serde(default)]
    pub type_filter: TypeFilter,
    #[serde(default)]
    pub sort: SortOrder,
}

impl CategoryView {
    /// Filter and sort `items`. Sorting is stable.
    pub fn apply<'a, I>(&self, items: I) -> Vec<ContentItem>
    where
        I: IntoIterator<Item = &'a ContentItem>,
    {
        let mut selected: Vec<ContentItem> = items
            .into_iter()
            .filter(|item| self.type_filter.matches(item))
            .cloned()
            .collect();

        match self.sort {
            SortOrder::Title => selected.sort_by(compare_titles),
            SortOrder::Type => {
                selected.sort_by(|a, b| a.content_type.as_str().cmp(b.content_type.as_str()))
            }
            SortOrder::Catalog => {}
        }
        selected
    }
}

fn compare_titles(a: &ContentItem, b: &ContentItem) -> Ordering {
    a.title().to_lowercase().cmp(&b.title().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn sample() -> Vec<ContentItem> {
        vec![
            fixtures::series_item("dark", "Mixed", "mixed", &[1]),
            fixtures::movie_item("Heat", "Mixed", "mixed"),
            fixtures::movie_item("alien", "Mixed", "mixed"),
            fixtures::series_item("Broadchurch", "Mixed", "mixed", &[1]),
        ]
    }

    fn titles(items: &[ContentItem]) -> Vec<&str> {
        items.iter().map(|i| i.title()).collect()
    }

    #[test]
    fn test_title_sort_ignores_case() {
        let items = sample();
        let view = CategoryView::default();
        assert_eq!(
            titles(&view.apply(&items)),
            vec!["alien", "Broadchurch", "dark", "Heat"]
        );
    }

    #[test]
    fn test_type_sort_is_stable() {
        let items = sample();
        let view = CategoryView {
            type_filter: TypeFilter::All,
            sort: SortOrder::Type,
        };
        assert_eq!(
            titles(&view.apply(&items)),
            vec!["Heat", "alien", "dark", "Broadchurch"]
        );
    }

    #[test]
    fn test_type_filter() {
        let items = sample();
        let view = CategoryView {
            type_filter: TypeFilter::Series,
            sort: SortOrder::Catalog,
        };
        assert_eq!(titles(&view.apply(&items)), vec!["dark", "Broadchurch"]);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Movie".parse::<TypeFilter>(), Ok(TypeFilter::Movie));
        assert_eq!("".parse::<TypeFilter>(), Ok(TypeFilter::All));
        assert!("cartoons".parse::<TypeFilter>().is_err());
        assert_eq!("TYPE".parse::<SortOrder>(), Ok(SortOrder::Type));
        assert!("rating".parse::<SortOrder>().is_err());
    }
}
