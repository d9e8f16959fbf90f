//! Review of proposed tasks before anything reaches the tracker.
//!
//! An idea is broken down into candidate tasks, the operator edits the
//! list, and `accept-all` confirms it. Edits refer to tasks by stable id
//! or by title, so identity survives renames and reordering.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
