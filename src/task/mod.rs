//! Task model and lifecycle state machine.
//!
//! A project owns its tasks, their dependency graph, their tracker
//! bindings and their commit records. The lifecycle service moves tasks
//! through `Proposed -> Confirmed -> Backlog -> InProgress -> Done` (or
//! `Cancelled`), calling the tracker sync engine and the version-control
//! engine at the transitions that concern them. The module follows
//! hexagonal architecture:
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
