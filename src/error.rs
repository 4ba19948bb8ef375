//! Error types for the fetch layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

/// Message shown when the server rejects a request without explaining why.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Message shown for transport failures.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check your connection and try again.";

// == Fetch Error Enum ==
/// Unified error type for every request issued by this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The request never produced a response (connection refused, timeout, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status
    #[error("Request failed with status {status}")]
    Http {
        status: u16,
        message: Option<String>,
    },

    /// 2xx response carrying a `{"success": false}` envelope
    #[error("Request rejected: {}", .0.as_deref().unwrap_or("no message"))]
    Application(Option<String>),

    /// Response body did not have the expected shape
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Superseded by a newer request or torn down
    #[error("Request cancelled")]
    Cancelled,

    /// Client could not be built from the supplied configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl FetchError {
    // == User Message ==
    /// Human-readable text stored in `error` fields of fetch/search state.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            FetchError::Http { status, .. } => {
                format!("Request failed (status {}). Please try again.", status)
            }
            FetchError::Application(Some(message)) => message.clone(),
            FetchError::Application(None) => GENERIC_FAILURE_MESSAGE.to_string(),
            FetchError::Decode(_) => "Received an unexpected response from the server.".to_string(),
            FetchError::Cancelled => "Request cancelled".to_string(),
            FetchError::Config(msg) => format!("Invalid configuration: {}", msg),
        }
    }

    /// Cancelled requests are never reported to the user.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            FetchError::Http {
                status: status.as_u16(),
                message: None,
            }
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if err.is_builder() {
            FetchError::Config(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the fetch layer.
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_uses_generic_message() {
        let err = FetchError::Network("connection refused".to_string());
        assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn test_http_error_mentions_status() {
        let err = FetchError::Http {
            status: 503,
            message: Some("maintenance".to_string()),
        };
        assert!(err.user_message().contains("503"));
        assert_eq!(err.to_string(), "Request failed with status 503");
    }

    #[test]
    fn test_application_error_prefers_server_message() {
        let err = FetchError::Application(Some("Listing has been removed".to_string()));
        assert_eq!(err.user_message(), "Listing has been removed");

        let err = FetchError::Application(None);
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(err.to_string(), "Request rejected: no message");
    }

    #[test]
    fn test_cancelled_is_flagged() {
        assert!(FetchError::Cancelled.is_cancelled());
        assert!(!FetchError::Decode("x".to_string()).is_cancelled());
    }
}
