//! Telemetry decoding module
//!
//! Converts raw servo telemetry into physical units and keeps a bounded history of the position
//! and velocity of every joint for display.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod history;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use history::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default number of entries kept per joint and per signal.
pub const DEFAULT_HISTORY_LEN: usize = 300;

/// chrono format string used to label history entries.
pub const LABEL_FORMAT: &str = "%H:%M:%S%.3f";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors when initialising the decoder.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryInitError {
    #[error("The history length must be at least 1")]
    ZeroHistoryLen,
}
