//! Arm inverse kinematics calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use util::maths::{clamp, wrap_to_pi};

use super::*;
use crate::arm_config::ElbowBranch;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Perform the inverse kinematics calculations.
///
/// Inverse kinematics is described in
/// https://en.wikipedia.org/wiki/Inverse_kinematics. For a 2-link planar arm
/// the closed form solution follows from the law of cosines: the distance from
/// the shoulder to the target fixes the elbow angle, and the shoulder angle is
/// the bearing of the target minus the angle the second link adds at the
/// shoulder.
///
/// Both an elbow up and an elbow down solution exist for most targets. Only
/// the branch selected in the configuration is ever returned.
///
/// The shoulder angle is wrapped into `(-pi, pi]` before the joint limits are
/// checked. A target is `Unreachable` if it lies outside the annulus swept by
/// the arm or if the solution breaks either joint's limits.
pub fn inverse(cfg: &ArmConfig, target: &CartesianPoint) -> Result<JointPose, Unreachable> {
    let l1 = cfg.link1_length;
    let l2 = cfg.link2_length;

    let dist_sq = target.x.powi(2) + target.y.powi(2);
    let cos_q2 = (dist_sq - l1.powi(2) - l2.powi(2)) / (2.0 * l1 * l2);

    if !(cos_q2.abs() <= 1.0) {
        let (min, max) = reach_annulus(cfg);
        return Err(Unreachable::OutsideWorkspace {
            distance: dist_sq.sqrt(),
            min,
            max,
        });
    }

    let mut q2_rad = clamp(&cos_q2, &-1.0, &1.0).acos();
    if cfg.elbow == ElbowBranch::Down {
        q2_rad = -q2_rad;
    }

    let q1_rad = wrap_to_pi(
        target.y.atan2(target.x) - (l2 * q2_rad.sin()).atan2(l1 + l2 * q2_rad.cos()),
    );

    let pose = JointPose::new(q1_rad, q2_rad);

    for joint in Joint::ALL.iter() {
        let angle_deg = pose.angle_deg(*joint);
        if !cfg.within_limits(*joint, angle_deg) {
            let (min_deg, max_deg) = cfg.limits_deg(*joint);
            return Err(Unreachable::JointLimit {
                joint: *joint,
                angle_deg,
                min_deg,
                max_deg,
            });
        }
    }

    trace!(
        "IK ({:.3}, {:.3}) -> q1 = {:.3} rad, q2 = {:.3} rad",
        target.x,
        target.y,
        q1_rad,
        q2_rad
    );

    Ok(pose)
}

#[cfg(test)]
mod test {
    use super::*;

    fn cfg_with(elbow: ElbowBranch) -> ArmConfig {
        ArmConfig {
            elbow,
            ..ArmConfig::default()
        }
    }

    #[test]
    fn test_right_angle_elbow() {
        let cfg = cfg_with(ElbowBranch::Up);
        let pose = inverse(&cfg, &CartesianPoint::new(21.2132, 0.0)).unwrap();
        assert!((pose.angle_deg(Joint::Elbow) - 90.0).abs() < 1e-3);
        assert!((pose.angle_deg(Joint::Shoulder) + 45.0).abs() < 1e-3);

        let cfg = cfg_with(ElbowBranch::Down);
        let pose = inverse(&cfg, &CartesianPoint::new(21.2132, 0.0)).unwrap();
        assert!((pose.angle_deg(Joint::Elbow) + 90.0).abs() < 1e-3);
        assert!((pose.angle_deg(Joint::Shoulder) - 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_outside_annulus() {
        let cfg = ArmConfig::default();
        match inverse(&cfg, &CartesianPoint::new(40.0, 0.0)) {
            Err(Unreachable::OutsideWorkspace { distance, max, .. }) => {
                assert!((distance - 40.0).abs() < 1e-9);
                assert!((max - 30.0).abs() < 1e-9);
            }
            r => panic!("Expected target to be outside the workspace, got {:?}", r),
        }

        // Inside the hole of an arm with unequal links
        let mut cfg = ArmConfig::default();
        cfg.link2_length = 10.0;
        assert!(matches!(
            inverse(&cfg, &CartesianPoint::new(2.0, 1.0)),
            Err(Unreachable::OutsideWorkspace { .. })
        ));
        assert!(matches!(
            inverse(&cfg, &CartesianPoint::new(0.0, 25.5)),
            Err(Unreachable::OutsideWorkspace { .. })
        ));
    }

    #[test]
    fn test_joint_limits() {
        // Geometrically reachable but behind the shoulder
        let cfg = ArmConfig::default();
        match inverse(&cfg, &CartesianPoint::new(-20.0, 0.0)) {
            Err(Unreachable::JointLimit { joint, angle_deg, .. }) => {
                assert_eq!(joint, Joint::Shoulder);
                assert!(angle_deg > 90.0);
            }
            r => panic!("Expected a shoulder limit, got {:?}", r),
        }

        // Elbow needs 90 degrees but is limited to 60
        let mut cfg = ArmConfig::default();
        cfg.max_pos_deg = [90.0, 60.0];
        match inverse(&cfg, &CartesianPoint::new(21.2132, 0.0)) {
            Err(Unreachable::JointLimit { joint, .. }) => assert_eq!(joint, Joint::Elbow),
            r => panic!("Expected an elbow limit, got {:?}", r),
        }
    }

    #[test]
    fn test_forward_inverse_round_trip() {
        for elbow in [ElbowBranch::Up, ElbowBranch::Down].iter() {
            let mut cfg = cfg_with(*elbow);
            cfg.link2_length = 11.0;
            let sign = match elbow {
                ElbowBranch::Up => 1.0,
                ElbowBranch::Down => -1.0,
            };

            for q1_deg in (-80..=80).step_by(10) {
                for q2_deg in (5..=85).step_by(10) {
                    let pose = JointPose::from_deg(q1_deg as f64, sign * q2_deg as f64);
                    let target = forward(&cfg, &pose).end_effector;

                    let solved = inverse(&cfg, &target).unwrap();
                    assert!(
                        (solved.q1_rad - pose.q1_rad).abs() < 1e-6
                            && (solved.q2_rad - pose.q2_rad).abs() < 1e-6,
                        "{:?}: expected {:?}, got {:?}",
                        elbow,
                        pose,
                        solved
                    );
                }
            }
        }
    }

    #[test]
    fn test_folded_arm_at_origin() {
        let mut cfg = ArmConfig::default();
        cfg.min_pos_deg = [-190.0, -190.0];
        cfg.max_pos_deg = [190.0, 190.0];

        let pose = inverse(&cfg, &CartesianPoint::new(0.0, 0.0)).unwrap();
        assert!((pose.angle_deg(Joint::Elbow) - 180.0).abs() < 1e-6);
        assert!(pose.q1_rad.is_finite());
    }
}
