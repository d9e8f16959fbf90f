//! Taskbridge: keeps a unit of work consistent between an operator, an
//! issue tracker and a local version-control repository.
//!
//! A task moves from a free-form idea through review and confirmation,
//! is projected onto the tracker exactly once, is worked on in a branch
//! named after its tracker identifier, and is completed by commits whose
//! messages reference that identifier.
//!
//! # Architecture
//!
//! Taskbridge follows hexagonal architecture principles:
//!
//! - **Domain**: Pure lifecycle rules with no infrastructure dependencies
//! - **Ports**: Async trait interfaces for the tracker, version control,
//!   task breakdown and persistence
//! - **Adapters**: In-memory implementations of every port
//!
//! # Modules
//!
//! - [`task`]: Task model, lifecycle state machine and orchestration
//! - [`confirmation`]: Review and confirmation of proposed tasks
//! - [`tracker`]: Idempotent tracker projection with drift detection
//! - [`vcs`]: Branch naming, commit grammar and history aggregation

pub mod confirmation;
pub mod task;
pub mod tracker;
pub mod vcs;
