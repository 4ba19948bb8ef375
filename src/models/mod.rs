//! Wire models shared by the client, search and polling modules.

pub mod domain;
pub mod envelope;
pub mod page;

// Re-export commonly used types
pub use domain::{TradeListing, UnreadCounts};
pub use envelope::{envelope_message, unwrap_envelope, SearchResponse};
pub use page::SearchPage;
