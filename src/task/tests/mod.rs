//! Unit tests for the task module.
//!
//! Tests are organised by concern: value types and graph rules, the task
//! and project state machines, the in-memory repository and the lifecycle
//! service.

mod support;
