//! Autocomplete suggestions over catalog titles.

use std::collections::HashSet;

use super::engine::char_position;

/// Bounds applied to a suggestion scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionOptions {
    /// Maximum number of titles inspected per call.
    pub scan_limit: usize,
    /// Queries shorter than this (in characters, after trimming) yield nothing.
    pub min_query_len: usize,
}

impl Default for SuggestionOptions {
    fn default() -> Self {
        Self {
            scan_limit: 2000,
            min_query_len: 2,
        }
    }
}

fn suggestion_score(position: usize) -> u8 {
    match position {
        0 => 3,
        p if p < 10 => 2,
        _ => 1,
    }
}

/// Suggest up to `max` distinct titles containing `query`.
///
/// Titles are scanned in order until `3 * max` candidates are found or
/// `scan_limit` titles have been inspected. Candidates are ordered by
/// match position (leading, early, later) and then by scan order.
pub fn suggestions<'a, I>(
    query: &str,
    titles: I,
    max: usize,
    options: SuggestionOptions,
) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = query.trim().to_lowercase();
    if max == 0 || needle.is_empty() || needle.chars().count() < options.min_query_len {
        return Vec::new();
    }

    let wanted = max.saturating_mul(3);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut candidates: Vec<(&str, u8)> = Vec::new();

    for title in titles.into_iter().take(options.scan_limit) {
        if candidates.len() >= wanted {
            break;
        }
        if title.trim().is_empty() || seen.contains(title) {
            continue;
        }
        if let Some(pos) = char_position(&title.to_lowercase(), &needle) {
            seen.insert(title);
            candidates.push((title, suggestion_score(pos)));
        }
    }

    candidates.sort_by(|a, b| b.1.cmp(&a.1));
    candidates
        .into_iter()
        .take(max)
        .map(|(title, _)| title.to_string())
        .collect()
}
