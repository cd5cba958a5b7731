//! # Quadruped library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to access items defined
//! inside the quadruped exec crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Global data store for the executable
pub mod data_store;

/// Leg control module - converts toe targets into joint angles for each leg
pub mod leg_ctrl;
