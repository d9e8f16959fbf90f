//! Projection of local tasks onto an external issue tracker.
//!
//! Every task is created on the tracker at most once. Later pushes are
//! driven by field fingerprints, so unchanged tasks cost no tracker
//! mutation and concurrent remote edits are detected as drift instead of
//! being silently overwritten.
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
