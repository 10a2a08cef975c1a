//! Reachable workspace sampling

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use ndarray::Array1;

use super::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Iterator over end effector positions sampled on a grid of joint angles.
///
/// The grid spans each joint's limits evenly, both ends included. Points are
/// produced shoulder-major and the iterator can be cloned to restart it.
#[derive(Debug, Clone)]
pub struct WorkspaceSamples<'a> {
    cfg: &'a ArmConfig,
    q1_rad: Array1<f64>,
    q2_rad: Array1<f64>,
    next: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<'a> Iterator for WorkspaceSamples<'a> {
    type Item = CartesianPoint;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.q2_rad.len();
        if n == 0 || self.next >= self.q1_rad.len() * n {
            return None;
        }

        let pose = JointPose::new(self.q1_rad[self.next / n], self.q2_rad[self.next % n]);
        self.next += 1;

        Some(forward(self.cfg, &pose).end_effector)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.q1_rad.len() * self.q2_rad.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for WorkspaceSamples<'a> {}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Sample the reachable workspace of the arm.
///
/// Produces `resolution * resolution` end effector positions forming an
/// unordered point cloud of the region the arm can reach within its joint
/// limits. The cloud depends only on the configuration and must be sampled
/// again whenever the link lengths or limits change.
pub fn sample_workspace(cfg: &ArmConfig, resolution: usize) -> WorkspaceSamples<'_> {
    let axis = |joint: Joint| {
        let (min_deg, max_deg) = cfg.limits_deg(joint);
        Array1::linspace(min_deg.to_radians(), max_deg.to_radians(), resolution)
    };

    WorkspaceSamples {
        cfg,
        q1_rad: axis(Joint::Shoulder),
        q2_rad: axis(Joint::Elbow),
        next: 0,
    }
}
