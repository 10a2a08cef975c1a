//! Planar kinematics module
//!
//! Forward and inverse kinematics of the 2-link planar arm, and sampling of its reachable
//! workspace. All functions are pure and parameterised by an [`ArmConfig`].
//!
//! Angles are measured anticlockwise, the shoulder angle from the x axis and the elbow angle
//! relative to the first link.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod forward;
mod inverse_kinematics;
mod workspace;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Point2;
use serde::Serialize;

use crate::arm_config::{ArmConfig, Joint};

pub use forward::*;
pub use inverse_kinematics::*;
pub use workspace::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point in the plane of the arm, in the same length unit as the link lengths.
pub type CartesianPoint = Point2<f64>;

/// Joint space state of the arm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct JointPose {
    /// Shoulder angle.
    ///
    /// Units: radians
    pub q1_rad: f64,

    /// Elbow angle.
    ///
    /// Units: radians
    pub q2_rad: f64,
}

/// Cartesian positions of the arm's elbow and end effector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArmPose {
    pub elbow: CartesianPoint,
    pub end_effector: CartesianPoint,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reasons a target can't be reached by the arm.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Unreachable {
    #[error("Target is {distance:.3} from the shoulder, outside the reachable annulus [{min:.3}, {max:.3}]")]
    OutsideWorkspace { distance: f64, min: f64, max: f64 },

    #[error("{joint:?} angle of {angle_deg:.2}° is outside its limits [{min_deg}, {max_deg}]")]
    JointLimit {
        joint: Joint,
        angle_deg: f64,
        min_deg: f64,
        max_deg: f64,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl JointPose {
    pub fn new(q1_rad: f64, q2_rad: f64) -> Self {
        Self { q1_rad, q2_rad }
    }

    /// Build a pose from joint angles in degrees.
    pub fn from_deg(q1_deg: f64, q2_deg: f64) -> Self {
        Self::new(q1_deg.to_radians(), q2_deg.to_radians())
    }

    /// Angle of the given joint in radians.
    pub fn angle_rad(&self, joint: Joint) -> f64 {
        match joint {
            Joint::Shoulder => self.q1_rad,
            Joint::Elbow => self.q2_rad,
        }
    }

    /// Angle of the given joint in degrees.
    pub fn angle_deg(&self, joint: Joint) -> f64 {
        self.angle_rad(joint).to_degrees()
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Inner and outer radius of the annulus the end effector can reach, ignoring joint limits.
pub fn reach_annulus(cfg: &ArmConfig) -> (f64, f64) {
    (
        (cfg.link1_length - cfg.link2_length).abs(),
        cfg.link1_length + cfg.link2_length,
    )
}
