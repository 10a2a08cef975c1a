//! # Arm Executable Parameters
//!
//! This module provide parameters for the arm executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::bus::ServoId;
use serde::{Deserialize, Serialize};

use crate::{arm_config::ArmConfig, telemetry::DEFAULT_HISTORY_LEN};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmExecParams {
    /// Target period of one cycle of the main loop.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Number of entries kept per joint and per signal in the telemetry history
    #[serde(default = "default_history_len")]
    pub history_len: usize,

    /// Bus session opened at startup, if any
    #[serde(default)]
    pub bus: Option<BusParams>,

    pub arm: ArmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusParams {
    /// Serial port the servos are attached to
    pub port: String,

    /// Uses the bus default when absent
    #[serde(default)]
    pub baudrate: Option<u32>,

    pub ids: Vec<ServoId>,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_history_len() -> usize {
    DEFAULT_HISTORY_LEN
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::arm_config::ElbowBranch;

    #[test]
    fn test_load_params() {
        let params: ArmExecParams = util::params::from_str(
            r#"
            cycle_period_s = 0.005

            [bus]
            port = "/dev/ttyUSB0"
            ids = [1, 2]

            [arm]
            link1_length = 15.0
            link2_length = 15.0
            elbow = "down"
            joint_ids = [1, 2]
            zero_offset_deg = [180.0, 180.0]
            min_pos_deg = [-90.0, -90.0]
            max_pos_deg = [90.0, 90.0]
            playback_period_ms = 20
            "#,
        )
        .unwrap();

        assert_eq!(params.history_len, DEFAULT_HISTORY_LEN);
        assert_eq!(params.arm.elbow, ElbowBranch::Down);

        let bus = params.bus.unwrap();
        assert_eq!(bus.baudrate, None);
        assert_eq!(bus.ids, vec![1, 2]);
    }
}
