//! Paginated search results handed back to callers.

use serde::{Deserialize, Serialize};

use crate::models::SearchResponse;

// == Search Page ==
/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage<T> {
    pub results: Vec<T>,
    pub total: u64,
    pub has_more: bool,
    pub page: u32,
    pub total_pages: u32,
}

impl<T> SearchPage<T> {
    // == From Response ==
    /// Builds a page from a response fetched with `limit + 1` rows.
    ///
    /// The extra row only signals that another page exists; it is trimmed
    /// before the page is returned. Without a server-side `total`, the total
    /// is what has been seen so far and `total_pages` reaches one past the
    /// current page while more rows exist.
    pub fn from_response(response: SearchResponse<T>, page: u32, limit: usize) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        let mut results = response.results;

        let has_more = results.len() > limit;
        results.truncate(limit);

        let offset = (page as u64 - 1).saturating_mul(limit as u64);
        let (total, total_pages) = match response.total {
            Some(total) => (
                total,
                u32::try_from(total.div_ceil(limit as u64)).unwrap_or(u32::MAX),
            ),
            None => (
                offset.saturating_add(results.len() as u64),
                if has_more { page.saturating_add(1) } else { page },
            ),
        };

        Self {
            results,
            total,
            has_more,
            page,
            total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
