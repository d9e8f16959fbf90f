//! In-memory tracker adapter.

mod tracker;

pub use tracker::{InMemoryIssueTracker, StoredIssue};
