//! Arm configuration module
//!
//! The [`ArmConfig`] is the parameter set shared by kinematics, trajectory playback and telemetry
//! display. It is never mutated in place: [`ArmConfig::apply`] produces a new validated value and
//! [`ConfigStore`] swaps the shared snapshot atomically.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod store;
mod update;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use store::*;
pub use update::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of joints on the arm.
pub const NUM_JOINTS: usize = 2;

/// Shortest allowed period between trajectory steps.
///
/// Units: milliseconds
pub const MIN_PLAYBACK_PERIOD_MS: u64 = 5;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors when validating an arm configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the field which failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::InvalidField { field, .. } => field,
        }
    }
}
