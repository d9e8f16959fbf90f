//! Port contracts for the issue-tracker collaborator.

pub mod tracker;

pub use tracker::{IssueTracker, TrackerError, TrackerResult};
