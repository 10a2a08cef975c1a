//! Parameters structure for the arm

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::bus::ServoId;
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ConfigError, MIN_PLAYBACK_PERIOD_MS, NUM_JOINTS};
use crate::unit_conv;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the 2-link planar arm.
///
/// Link lengths may use any length unit, cartesian points handed to the kinematics use the same
/// unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmConfig {
    // ---- GEOMETRY ----
    /// Length of the first link, from the shoulder to the elbow.
    pub link1_length: f64,

    /// Length of the second link, from the elbow to the end effector.
    pub link2_length: f64,

    /// Which of the two inverse kinematics solutions is used.
    pub elbow: ElbowBranch,

    // ---- SERVOS ----
    /// Bus IDs of the shoulder and elbow servos.
    pub joint_ids: [ServoId; NUM_JOINTS],

    /// Servo position corresponding to a joint angle of zero.
    ///
    /// Units: degrees
    pub zero_offset_deg: [f64; NUM_JOINTS],

    // ---- CAPABILITIES ----
    /// Minimum joint angle (lowest negative value)
    ///
    /// Units: degrees
    pub min_pos_deg: [f64; NUM_JOINTS],

    /// Maximum joint angle (highest positive value)
    ///
    /// Units: degrees
    pub max_pos_deg: [f64; NUM_JOINTS],

    // ---- PLAYBACK ----
    /// Time between two trajectory steps.
    ///
    /// Units: milliseconds
    pub playback_period_ms: u64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Elbow configuration of the arm.
///
/// `Up` uses the positive elbow angle solution, `Down` the negative one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElbowBranch {
    Up,
    Down,
}

/// Joints of the arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Joint {
    Shoulder,
    Elbow,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            link1_length: 15.0,
            link2_length: 15.0,
            elbow: ElbowBranch::Up,
            joint_ids: [1, 2],
            zero_offset_deg: [180.0, 180.0],
            min_pos_deg: [-90.0, -90.0],
            max_pos_deg: [90.0, 90.0],
            playback_period_ms: 20,
        }
    }
}

impl Joint {
    /// Both joints, in chain order.
    pub const ALL: [Joint; NUM_JOINTS] = [Joint::Shoulder, Joint::Elbow];

    /// Index of the joint in the per-joint parameter arrays.
    pub fn index(&self) -> usize {
        match self {
            Joint::Shoulder => 0,
            Joint::Elbow => 1,
        }
    }
}

impl ArmConfig {
    /// Raise the playback period to the minimum if it is below it.
    pub(crate) fn coerce_playback_period(&mut self) {
        if self.playback_period_ms < MIN_PLAYBACK_PERIOD_MS {
            warn!(
                "Playback period of {} ms is below the minimum, using {} ms",
                self.playback_period_ms, MIN_PLAYBACK_PERIOD_MS
            );
            self.playback_period_ms = MIN_PLAYBACK_PERIOD_MS;
        }
    }

    /// Check every field of the configuration.
    ///
    /// Returns the first invalid field found. This is strict on the playback period, callers
    /// accepting user input coerce it first (see [`ConfigStore`](super::ConfigStore)).
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_length("link1_length", self.link1_length)?;
        positive_length("link2_length", self.link2_length)?;

        for (i, id) in self.joint_ids.iter().enumerate() {
            if *id == 0 {
                return Err(ConfigError::invalid(
                    "joint_ids",
                    format!("ID of joint {} must be a positive integer", i + 1),
                ));
            }
        }
        if self.joint_ids[0] == self.joint_ids[1] {
            return Err(ConfigError::invalid(
                "joint_ids",
                format!("both joints use ID {}", self.joint_ids[0]),
            ));
        }

        for i in 0..NUM_JOINTS {
            if !self.zero_offset_deg[i].is_finite() {
                return Err(ConfigError::invalid(
                    "zero_offset_deg",
                    format!("offset of joint {} is not a finite number", i + 1),
                ));
            }
            if !self.min_pos_deg[i].is_finite() {
                return Err(ConfigError::invalid(
                    "min_pos_deg",
                    format!("minimum of joint {} is not a finite number", i + 1),
                ));
            }
            if !self.max_pos_deg[i].is_finite() {
                return Err(ConfigError::invalid(
                    "max_pos_deg",
                    format!("maximum of joint {} is not a finite number", i + 1),
                ));
            }
            if self.min_pos_deg[i] >= self.max_pos_deg[i] {
                return Err(ConfigError::invalid(
                    "min_pos_deg",
                    format!(
                        "minimum of joint {} ({}) must be less than its maximum ({})",
                        i + 1,
                        self.min_pos_deg[i],
                        self.max_pos_deg[i]
                    ),
                ));
            }
        }

        if self.playback_period_ms < MIN_PLAYBACK_PERIOD_MS {
            return Err(ConfigError::invalid(
                "playback_period_ms",
                format!("must be at least {} ms", MIN_PLAYBACK_PERIOD_MS),
            ));
        }

        Ok(())
    }

    /// Bus ID of the given joint.
    pub fn joint_id(&self, joint: Joint) -> ServoId {
        self.joint_ids[joint.index()]
    }

    /// Joint which the given servo drives, if any.
    pub fn joint_for_id(&self, id: ServoId) -> Option<Joint> {
        Joint::ALL.iter().copied().find(|j| self.joint_id(*j) == id)
    }

    /// Angle limits `(min, max)` of a joint in degrees.
    pub fn limits_deg(&self, joint: Joint) -> (f64, f64) {
        (
            self.min_pos_deg[joint.index()],
            self.max_pos_deg[joint.index()],
        )
    }

    /// Whether a joint angle in degrees is inside the joint's limits, bounds included.
    pub fn within_limits(&self, joint: Joint, angle_deg: f64) -> bool {
        let (min, max) = self.limits_deg(joint);
        angle_deg >= min && angle_deg <= max
    }

    /// Convert a joint angle into a servo position, applying the joint's zero offset.
    pub fn joint_deg_to_ticks(&self, joint: Joint, angle_deg: f64) -> i32 {
        unit_conv::deg_to_ticks(angle_deg + self.zero_offset_deg[joint.index()])
    }

    /// Convert a servo position into a joint angle, removing the joint's zero offset.
    pub fn ticks_to_joint_deg(&self, joint: Joint, ticks: i32) -> f64 {
        unit_conv::ticks_to_deg(ticks) - self.zero_offset_deg[joint.index()]
    }

    pub fn playback_period(&self) -> Duration {
        Duration::from_millis(self.playback_period_ms)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn positive_length(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        Err(ConfigError::invalid(field, "not a finite number"))
    } else if value <= 0.0 {
        Err(ConfigError::invalid(field, format!("must be positive, found {}", value)))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(ArmConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_validation_names_field() {
        let mut cfg = ArmConfig::default();
        cfg.link2_length = f64::NAN;
        assert_eq!(cfg.validate().unwrap_err().field(), "link2_length");

        let mut cfg = ArmConfig::default();
        cfg.joint_ids = [3, 3];
        assert_eq!(cfg.validate().unwrap_err().field(), "joint_ids");

        let mut cfg = ArmConfig::default();
        cfg.joint_ids = [0, 3];
        assert_eq!(cfg.validate().unwrap_err().field(), "joint_ids");

        let mut cfg = ArmConfig::default();
        cfg.min_pos_deg = [-90.0, 45.0];
        cfg.max_pos_deg = [90.0, 45.0];
        assert_eq!(cfg.validate().unwrap_err().field(), "min_pos_deg");

        let mut cfg = ArmConfig::default();
        cfg.playback_period_ms = 2;
        assert_eq!(cfg.validate().unwrap_err().field(), "playback_period_ms");
        cfg.coerce_playback_period();
        assert_eq!(cfg.playback_period_ms, MIN_PLAYBACK_PERIOD_MS);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn test_zero_offset() {
        let cfg = ArmConfig::default();
        assert_eq!(cfg.joint_deg_to_ticks(Joint::Shoulder, 0.0), 2045);
        assert_eq!(cfg.joint_deg_to_ticks(Joint::Elbow, -92.0), 1000);
        assert!((cfg.ticks_to_joint_deg(Joint::Elbow, 1000) + 92.0).abs() < 1e-9);
        assert_eq!(cfg.joint_for_id(2), Some(Joint::Elbow));
        assert_eq!(cfg.joint_for_id(7), None);
    }

    #[test]
    fn test_from_toml() {
        let cfg: ArmConfig = util::params::from_str(
            r#"
            link1_length = 12.0
            link2_length = 9.5
            elbow = "down"
            joint_ids = [11, 12]
            zero_offset_deg = [180.0, 90.0]
            min_pos_deg = [-120.0, -150.0]
            max_pos_deg = [120.0, 150.0]
            playback_period_ms = 30
            "#,
        )
        .unwrap();

        assert_eq!(cfg.elbow, ElbowBranch::Down);
        assert_eq!(cfg.joint_id(Joint::Elbow), 12);
        assert_eq!(cfg.limits_deg(Joint::Elbow), (-150.0, 150.0));
        assert_eq!(cfg.validate(), Ok(()));
    }
}
