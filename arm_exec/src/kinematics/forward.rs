//! Arm forward kinematics calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::*;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the positions of the elbow and end effector for the given joint angles.
///
/// Joint limits are not checked.
pub fn forward(cfg: &ArmConfig, pose: &JointPose) -> ArmPose {
    let q12_rad = pose.q1_rad + pose.q2_rad;

    let elbow = CartesianPoint::new(
        cfg.link1_length * pose.q1_rad.cos(),
        cfg.link1_length * pose.q1_rad.sin(),
    );

    let end_effector = CartesianPoint::new(
        elbow.x + cfg.link2_length * q12_rad.cos(),
        elbow.y + cfg.link2_length * q12_rad.sin(),
    );

    ArmPose {
        elbow,
        end_effector,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_straight_arm() {
        let cfg = ArmConfig::default();

        let pose = forward(&cfg, &JointPose::new(0.0, 0.0));
        assert!((pose.elbow.x - 15.0).abs() < EPS);
        assert!(pose.elbow.y.abs() < EPS);
        assert!((pose.end_effector.x - 30.0).abs() < EPS);
        assert!(pose.end_effector.y.abs() < EPS);
    }

    #[test]
    fn test_right_angles() {
        let mut cfg = ArmConfig::default();
        cfg.link2_length = 10.0;

        let pose = forward(&cfg, &JointPose::new(FRAC_PI_2, -FRAC_PI_2));
        assert!(pose.elbow.x.abs() < EPS);
        assert!((pose.elbow.y - 15.0).abs() < EPS);
        assert!((pose.end_effector.x - 10.0).abs() < EPS);
        assert!((pose.end_effector.y - 15.0).abs() < EPS);
    }
}
