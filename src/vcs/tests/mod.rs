//! Unit tests for the version-control module.

mod lifecycle_tests;
mod support;
