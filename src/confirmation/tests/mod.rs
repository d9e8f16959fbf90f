//! Unit tests for the confirmation module.
