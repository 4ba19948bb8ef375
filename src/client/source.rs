use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

// == JSON Source Trait ==
/// Something that can answer a GET with a JSON body.
///
/// Implementations report transport, status and envelope failures through
/// [`crate::error::FetchError`]; callers decode the returned value into their
/// own types.
#[async_trait]
pub trait JsonSource: Send + Sync {
    /// Fetches `path` (relative to the source's origin, query string included).
    async fn get_json(&self, path: &str) -> Result<Value>;
}
