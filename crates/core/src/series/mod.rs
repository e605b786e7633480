//! Series grouping.
//!
//! Series category files often list one entry per season
//! (`"Hindi - Mirzapur - Season 2"`). The grouper collapses those entries into
//! one series per inferred title and resolves a banner for each.

mod grouper;
mod title;

pub use grouper::{BannerSource, BannerTable, SeriesGroup, SeriesGrouper};
pub use title::{
    core_title, main_title, placeholder_banner, season_number, strip_leading_prefix,
    strip_parenthetical,
};
