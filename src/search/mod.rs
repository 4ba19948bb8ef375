//! Trade-directory search
//!
//! Parameter normalization and cache keys live in `params`; the debounced,
//! cached front-end in `debounced`.

mod debounced;
mod params;

pub use debounced::{DebouncedSearch, SearchOptions, SearchStatus, DEFAULT_DEBOUNCE};
pub use params::{
    generate_cache_key, normalize_field, NormalizedParams, SearchParams, CACHE_KEY_PREFIX,
    PLACEHOLDERS,
};
