//! Step definitions for task synchronization scenarios.

mod given;
mod then;
mod when;
pub mod world;
