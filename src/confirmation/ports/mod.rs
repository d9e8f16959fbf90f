//! Port contracts for the confirmation workflow.

pub mod breakdown;

pub use breakdown::{BreakdownError, BreakdownResult, TaskBreakdown};
