//! Response envelope handling
//!
//! Backend endpoints answer 2xx with a body that may carry
//! `{"success": false, "message": ...}` to signal an application-level failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FetchError, Result};

/// Body fields that may hold a human-readable failure reason, in priority order.
const MESSAGE_FIELDS: [&str; 2] = ["message", "error"];

// == Envelope Unwrapping ==
/// Returns the body unchanged unless it is a `success: false` envelope.
///
/// Bodies without a `success` field (plain arrays, bare objects) pass through.
pub fn unwrap_envelope(body: Value) -> Result<Value> {
    match body.get("success").and_then(Value::as_bool) {
        Some(false) => Err(FetchError::Application(envelope_message(&body))),
        _ => Ok(body),
    }
}

/// Extracts the server-provided message from an envelope, if any.
pub fn envelope_message(body: &Value) -> Option<String> {
    MESSAGE_FIELDS
        .iter()
        .filter_map(|field| body.get(*field).and_then(Value::as_str))
        .map(str::trim)
        .find(|msg| !msg.is_empty())
        .map(str::to_string)
}

fn default_success() -> bool {
    true
}

// == Search Response ==
/// Body of a search endpoint: `{ success, results: T[], total?: number }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> SearchResponse<T> {
    /// Turns a `success: false` body into an application error.
    pub fn into_checked(self) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(FetchError::Application(
                self.message.filter(|m| !m.trim().is_empty()),
            ))
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_passes_through() {
        let body = json!({"success": true, "count": 3});
        assert_eq!(unwrap_envelope(body.clone()), Ok(body));
    }

    #[test]
    fn test_body_without_envelope_passes_through() {
        let body = json!([1, 2, 3]);
        assert_eq!(unwrap_envelope(body.clone()), Ok(body));
    }

    #[test]
    fn test_failure_envelope_uses_server_message() {
        let body = json!({"success": false, "message": "Post not found"});
        assert_eq!(
            unwrap_envelope(body),
            Err(FetchError::Application(Some("Post not found".to_string())))
        );
    }

    #[test]
    fn test_failure_envelope_falls_back_to_error_field() {
        let body = json!({"success": false, "message": "  ", "error": "Forbidden"});
        assert_eq!(envelope_message(&body), Some("Forbidden".to_string()));

        let body = json!({"success": false});
        assert_eq!(unwrap_envelope(body), Err(FetchError::Application(None)));
    }

    #[test]
    fn test_search_response_defaults() {
        let response: SearchResponse<Value> = serde_json::from_value(json!({})).unwrap();
        assert!(response.success);
        assert!(response.results.is_empty());
        assert_eq!(response.total, None);
    }

    #[test]
    fn test_search_response_checked() {
        let response: SearchResponse<Value> =
            serde_json::from_value(json!({"success": false, "message": "Search unavailable"}))
                .unwrap();

        let err = response.into_checked().unwrap_err();
        assert_eq!(err.user_message(), "Search unavailable");
    }
}
