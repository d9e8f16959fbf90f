//! Domain types for reviewing and confirming a proposed task list.

mod candidate;
mod edit;
mod error;

pub use candidate::{CandidateTask, ReconcileOutcome};
pub use edit::{EditOperation, TaskReference};
pub use error::ReconcileError;
