//! Title parsing rules used to group seasons and match banners.
//!
//! All functions are pure string transforms.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use sha2::{Digest, Sha256};

/// `"... - Season 3 ..."` through the end of the string.
static SEASON_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*-\s*season\s*\d+.*$").unwrap());

/// Text before a `" - Season N"` marker.
static BEFORE_SEASON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.+?)\s+-\s+season\s+\d+").unwrap());

/// `"<prefix> - <name> (<details>)"`.
static PREFIXED_PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+?\s+-\s+(.+?)\s*\(.*\)").unwrap());

/// Season number of a `"- Season N"` marker.
static SEASON_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)-\s*season\s*(\d+)").unwrap());

/// A string that starts with a season marker.
static SEASON_AT_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^season\s*\d+").unwrap());

/// Opening parenthesis through the end of the string.
static PARENTHETICAL_TAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\(.*$").unwrap());

const PREFIX_SEPARATOR: &str = " - ";

/// Strip a leading `"<anything> - "` prefix (up to the first separator).
///
/// The prefix is kept when what follows it is a season marker, so
/// `"Dark - Season 1"` is not reduced to `"Season 1"`.
pub fn strip_leading_prefix(title: &str) -> &str {
    match title.find(PREFIX_SEPARATOR) {
        Some(idx) => {
            let rest = &title[idx + PREFIX_SEPARATOR.len()..];
            if rest.trim().is_empty() || SEASON_AT_START.is_match(rest.trim_start()) {
                title
            } else {
                rest
            }
        }
        None => title,
    }
}

/// Strip a trailing parenthetical and everything after it.
pub fn strip_parenthetical(title: &str) -> String {
    PARENTHETICAL_TAIL.replace(title, "").trim().to_string()
}

/// Title used as a banner table key.
///
/// Applies, in order: leading prefix removal, trailing `"- Season N..."`
/// removal, trailing parenthetical removal, trim.
pub fn core_title(title: &str) -> String {
    let without_prefix = strip_leading_prefix(title.trim());
    let without_season = SEASON_SUFFIX.replace(without_prefix, "");
    strip_parenthetical(&without_season)
}

/// Title a series entry is grouped under.
///
/// Rules, first match wins:
/// 1. text before `" - Season N"`, minus any leading prefix;
/// 2. `"<prefix> - <name> (<details>)"` yields `<name>`;
/// 3. the title minus any leading prefix.
pub fn main_title(title: &str) -> String {
    let title = title.trim();

    let derived = if let Some(caps) = BEFORE_SEASON.captures(title) {
        strip_leading_prefix(caps[1].trim()).trim().to_string()
    } else if let Some(caps) = PREFIXED_PARENTHETICAL.captures(title) {
        caps[1].trim().to_string()
    } else {
        strip_leading_prefix(title).trim().to_string()
    };

    if derived.is_empty() {
        title.to_string()
    } else {
        derived
    }
}

/// Season number announced in a title (`"Dark - Season 2"` gives 2).
pub fn season_number(title: &str) -> Option<u32> {
    SEASON_NUMBER
        .captures(title)
        .and_then(|caps| caps[1].parse().ok())
}

/// Deterministic placeholder banner for a title.
///
/// The background colour is taken from a hash of the title, so the same title
/// always yields the same URL.
pub fn placeholder_banner(base_url: &str, title: &str) -> String {
    let digest = Sha256::digest(title.as_bytes());
    let colour = format!("{:02x}{:02x}{:02x}", digest[0], digest[1], digest[2]);
    format!(
        "{}/{}/ffffff?text={}",
        base_url.trim_end_matches('/'),
        colour,
        urlencoding::encode(title)
    )
}
