//! Token-based catalog search.
//!
//! Provides the scored [`search`] over the catalog, a cached [`SearchEngine`]
//! wrapper, title [`suggestions`] for autocomplete and a trailing-edge
//! [`Debouncer`].

mod cache;
mod debounce;
mod engine;
mod suggest;

pub use cache::FifoCache;
pub use debounce::Debouncer;
pub use engine::{normalize_query, score_item, search, tokenize, SearchEngine, SearchResult};
pub use suggest::{suggestions, SuggestionOptions};
