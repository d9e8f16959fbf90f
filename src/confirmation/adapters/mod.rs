//! Adapter implementations for confirmation ports.

pub mod memory;
