//! Adapter implementations for the version-control port.

pub mod memory;
