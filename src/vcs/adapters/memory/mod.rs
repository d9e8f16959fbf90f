//! In-memory version-control adapter.

mod repository;

pub use repository::{InMemoryVersionControl, StoredCommit};
