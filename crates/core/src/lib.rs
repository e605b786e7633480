pub mod catalog;
pub mod config;
pub mod metrics;
pub mod player;
pub mod search;
pub mod series;
pub mod store;
pub mod testing;

pub use catalog::{
    CatalogError, CatalogLoader, CatalogManifest, CatalogSource, CategoryInfo, ContentItem,
    ContentType, Episode, HttpCatalogSource, LoadEvent, LoadReport, RawCategoryFile, RawItem,
    Season, VideoSource, ALL_CATEGORIES_KEY,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use player::{
    CommandLauncher, MediaLauncher, PlaybackOutcome, PlaybackRequest, Player, PlayerError,
    TracingLauncher,
};
pub use search::{suggestions, Debouncer, SearchEngine, SearchResult, SuggestionOptions};
pub use series::{SeriesGroup, SeriesGrouper};
pub use store::{
    CatalogStore, CategorySummary, CategoryView, SearchReply, SortOrder, StoreError, StoreEvent,
    StoreStatus, StoreSummary, TypeFilter,
};
