//! Payloads returned by the platform endpoints this crate polls and searches.

use serde::{Deserialize, Serialize};

// == Trade Listing ==
/// A business in the trade directory (removal firms, cleaners, storage, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeListing {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub review_count: u32,
}

// == Unread Counts ==
/// Badge counters shown next to the notification and message dropdowns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCounts {
    #[serde(default)]
    pub notifications: u64,
    #[serde(default)]
    pub messages: u64,
}

impl UnreadCounts {
    pub fn total(&self) -> u64 {
        self.notifications + self.messages
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_optional_fields() {
        let listing: TradeListing =
            serde_json::from_str(r#"{"id": 7, "name": "Swift Removals"}"#).unwrap();

        assert_eq!(listing.id, 7);
        assert_eq!(listing.service, None);
        assert_eq!(listing.review_count, 0);
    }

    #[test]
    fn test_unread_counts_tolerate_extra_envelope_fields() {
        let counts: UnreadCounts =
            serde_json::from_str(r#"{"success": true, "notifications": 2, "messages": 5}"#)
                .unwrap();

        assert_eq!(counts.total(), 7);
    }
}
