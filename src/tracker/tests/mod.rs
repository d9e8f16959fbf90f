//! Unit tests for the tracker module.

mod support;
