//! # Communications interface crate.
//!
//! Provides the message contracts between the arm software and the actuator bus.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Requests to and events from the actuator bus
pub mod bus;
