//! In-memory adapters for the confirmation workflow.

mod breakdown;

pub use breakdown::{ScriptedBreakdown, parse_candidates};
