//! Observable state of a polling fetch.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Fetch State ==
/// What a fetch instance currently knows.
///
/// Data survives both a new fetch starting and a fetch failing, so callers
/// keep rendering the last good value while refreshing or after an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
    /// Wall-clock time of the last successful fetch
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            updated_at: None,
        }
    }
}

impl<T> FetchState<T> {
    /// A request started.
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// The current request succeeded.
    pub fn resolve(&mut self, data: T) {
        self.data = Some(data);
        self.loading = false;
        self.error = None;
        self.updated_at = Some(Utc::now());
    }

    /// The current request failed; previous data is kept.
    pub fn fail(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }
}
