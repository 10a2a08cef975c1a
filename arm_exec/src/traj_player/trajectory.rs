//! Captured trajectories and display space transforms

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::kinematics::CartesianPoint;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Maps points captured on a display surface into the plane of the arm.
pub trait DisplayTransform: Debug {
    fn to_cartesian(&self, point: &PathPoint) -> CartesianPoint;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point captured on the display surface, in display units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
}

/// An ordered sequence of captured points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trajectory {
    points: Vec<PathPoint>,
}

/// Transform for a canvas whose y axis points down.
///
/// The arm's shoulder sits at `center` and one link length unit spans `px_per_unit` display units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasTransform {
    pub center: PathPoint,
    pub px_per_unit: f64,
}

/// A trajectory saved to disk along with the transform of the surface it was captured on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathFile {
    pub transform: CanvasTransform,
    pub points: Trajectory,
}

/// Transform for points already expressed in the arm's plane.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IdentityTransform;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for PathPoint {
    fn from(p: [f64; 2]) -> Self {
        Self::new(p[0], p[1])
    }
}

impl From<PathPoint> for [f64; 2] {
    fn from(p: PathPoint) -> Self {
        [p.x, p.y]
    }
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point to the end of the trajectory.
    pub fn push(&mut self, point: PathPoint) {
        self.points.push(point);
    }

    /// Remove all points.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PathPoint> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }
}

impl std::iter::FromIterator<PathPoint> for Trajectory {
    fn from_iter<I: IntoIterator<Item = PathPoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl DisplayTransform for CanvasTransform {
    fn to_cartesian(&self, point: &PathPoint) -> CartesianPoint {
        CartesianPoint::new(
            (point.x - self.center.x) / self.px_per_unit,
            (self.center.y - point.y) / self.px_per_unit,
        )
    }
}

impl DisplayTransform for IdentityTransform {
    fn to_cartesian(&self, point: &PathPoint) -> CartesianPoint {
        CartesianPoint::new(point.x, point.y)
    }
}
