//! Trajectory player module
//!
//! Paces a captured trajectory into a stream of servo position goals. Each point is resolved into
//! the arm's plane, solved with inverse kinematics and sent to the bus as one goal per joint.
//! Points which can't be reached are skipped.
//!
//! The player doesn't own a timer. The host calls [`TrajectoryPlayer::poll`] from its loop and a
//! step is executed whenever one is due.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod sink;
mod state;
mod trajectory;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use sink::*;
pub use state::*;
pub use trajectory::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Minimum number of points a trajectory must contain to be played.
pub const MIN_PLAYABLE_POINTS: usize = 2;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors when starting playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlayerError {
    #[error("A trajectory needs at least 2 points to be played, found {0}")]
    InsufficientPoints(usize),

    #[error("A trajectory is already being played")]
    AlreadyPlaying,
}
