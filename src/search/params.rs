//! Search parameters, their normalization and cache-key derivation.

use serde::{Deserialize, Serialize};

/// Prefix shared by every search cache key.
pub const CACHE_KEY_PREFIX: &str = "search:";

/// Placeholder strings the search form submits when a field is untouched.
/// Compared after normalization, so entries are lower-case and trimmed.
pub const PLACEHOLDERS: &[&str] = &[
    "your location",
    "i'm looking for a...",
    "i\u{2019}m looking for a...",
    "i'm looking for a",
    "select a service",
    "any rating",
];

// == Search Params ==
/// Raw parameters as collected from the trade-directory search form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub location: String,
    pub service: String,
    pub rating: String,
    pub keywords: String,
    /// 1-based page number; 0 is treated as 1
    #[serde(default)]
    pub page: u32,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = rating.into();
        self
    }

    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    // == Normalize ==
    /// Normalizes every field; see [`normalize_field`].
    pub fn normalize(&self) -> NormalizedParams {
        NormalizedParams {
            query: normalize_field(&self.query),
            location: normalize_field(&self.location),
            service: normalize_field(&self.service),
            rating: normalize_field(&self.rating),
            keywords: normalize_field(&self.keywords),
            page: self.page.max(1),
        }
    }
}

// == Normalized Params ==
/// Parameters after normalization. Equal values always yield equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedParams {
    pub query: String,
    pub location: String,
    pub service: String,
    pub rating: String,
    pub keywords: String,
    pub page: u32,
}

impl NormalizedParams {
    // == Cache Key ==
    /// Cache key: the prefix followed by the percent-encoded fields.
    ///
    /// Separators inside values are encoded, so distinct params can never
    /// serialize to the same key.
    pub fn cache_key(&self) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, self.encode(None))
    }

    /// Query string for the search endpoint, asking for `limit` rows.
    pub fn query_string(&self, limit: usize) -> String {
        self.encode(Some(limit))
    }

    fn encode(&self, limit: Option<usize>) -> String {
        let page = self.page.to_string();
        let limit = limit.map(|l| l.to_string());

        let mut pairs = vec![
            ("q", self.query.as_str()),
            ("location", self.location.as_str()),
            ("service", self.service.as_str()),
            ("rating", self.rating.as_str()),
            ("keywords", self.keywords.as_str()),
            ("page", page.as_str()),
        ];
        if let Some(limit) = limit.as_deref() {
            pairs.push(("limit", limit));
        }

        pairs
            .into_iter()
            .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

// == Field Normalization ==
/// Collapses whitespace runs, trims and lower-cases; placeholders become empty.
pub fn normalize_field(raw: &str) -> String {
    let normalized = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if PLACEHOLDERS.contains(&normalized.as_str()) {
        String::new()
    } else {
        normalized
    }
}

/// Cache key for raw params.
pub fn generate_cache_key(params: &SearchParams) -> String {
    params.normalize().cache_key()
}
