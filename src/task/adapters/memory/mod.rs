//! In-memory adapters for tests and single-process use.

mod project;

pub use project::InMemoryProjectRepository;
