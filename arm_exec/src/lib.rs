//! # Arm library.
//!
//! This library allows other crates in the workspace to access items defined inside the arm
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm configuration - geometry, servo mapping and limits of the arm, and their validated updates
pub mod arm_config;

/// Data store - context object owning the executable's state
pub mod data_store;

/// Planar kinematics - forward and inverse kinematics of the 2-link arm
pub mod kinematics;

/// Executable parameters
pub mod params;

/// Telemetry decoding - converts servo telemetry into physical units and keeps its history
pub mod telemetry;

/// Trajectory player - paces a captured trajectory into servo goals
pub mod traj_player;

/// Unit conversion - between physical units and servo-native units
pub mod unit_conv;
