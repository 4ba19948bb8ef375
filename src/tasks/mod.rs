//! Background Tasks Module
//!
//! # Tasks
//! - Polling fetch: keeps one endpoint's data fresh on an interval
//! - TTL Cleanup: removes expired cache entries at configured intervals

mod cleanup;
mod poller;
mod state;

pub use cleanup::spawn_cleanup_task;
pub use poller::{FetchContext, PollOptions, PollingFetch};
pub use state::FetchState;
