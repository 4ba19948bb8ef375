//! HTTP client module
//!
//! `JsonSource` is the seam every fetcher depends on; `ApiClient` is the
//! reqwest-backed implementation talking to the platform backend.

mod http;
mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use http::{ApiClient, CSRF_HEADER};
pub use source::JsonSource;
