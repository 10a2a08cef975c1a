//! Implementations for the TrajectoryPlayer state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

// Internal
use super::{CommandSink, DisplayTransform, PlayerError, Trajectory, MIN_PLAYABLE_POINTS};
use crate::{
    arm_config::{ArmConfig, Joint},
    kinematics::{self, ArmPose, CartesianPoint, JointPose, Unreachable},
};
use comms_if::bus::BusRequest;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Trajectory player state.
#[derive(Debug, Default)]
pub struct TrajectoryPlayer {
    playback: Option<Playback>,

    last_pose: Option<ArmPose>,
}

/// An ongoing playback.
#[derive(Debug)]
struct Playback {
    trajectory: Trajectory,
    transform: Box<dyn DisplayTransform>,
    config: Arc<ArmConfig>,
    sink: Box<dyn CommandSink>,

    period: Duration,

    /// Index of the next point to be played.
    index: usize,

    next_due: Instant,
}

/// Report of a single playback step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// Index of the point played on this step.
    pub index: usize,

    /// The point in the arm's plane.
    pub target: CartesianPoint,

    pub outcome: StepOutcome,

    /// True if this was the last point of the trajectory.
    pub finished: bool,
}

/// Outcome of a single playback step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Goals for both joints were sent, in ticks.
    Commanded { pose: JointPose, ticks: [i32; 2] },

    /// The point couldn't be reached so no goals were sent.
    Skipped(Unreachable),

    /// The point was solved but the sink refused at least one of the goals.
    SinkFailed { pose: JointPose, reason: String },
}

/// Current phase of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlayerState {
    Idle,
    Playing,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlayerState {
        match self.playback {
            Some(_) => PlayerState::Playing,
            None => PlayerState::Idle,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    /// Start playing the given trajectory.
    ///
    /// The configuration snapshot is used for the whole playback, later changes to the
    /// configuration only affect the next playback. The first point is due at `now`.
    pub fn start<T, S>(
        &mut self,
        trajectory: Trajectory,
        transform: T,
        config: Arc<ArmConfig>,
        sink: S,
        now: Instant,
    ) -> Result<(), PlayerError>
    where
        T: DisplayTransform + 'static,
        S: CommandSink + 'static,
    {
        if self.playback.is_some() {
            return Err(PlayerError::AlreadyPlaying);
        }

        if trajectory.len() < MIN_PLAYABLE_POINTS {
            return Err(PlayerError::InsufficientPoints(trajectory.len()));
        }

        let period = config.playback_period();

        info!(
            "Starting playback of {} points every {} ms",
            trajectory.len(),
            period.as_millis()
        );

        self.playback = Some(Playback {
            trajectory,
            transform: Box::new(transform),
            config,
            sink: Box::new(sink),
            period,
            index: 0,
            next_due: now,
        });

        Ok(())
    }

    /// Stop the current playback, if any. Goals already sent are not recalled.
    pub fn cancel(&mut self) {
        if let Some(pb) = self.playback.take() {
            info!(
                "Playback cancelled at point {} of {}",
                pb.index,
                pb.trajectory.len()
            );
        }
    }

    /// Time at which the next step is due, or `None` when idle.
    pub fn next_due(&self) -> Option<Instant> {
        self.playback.as_ref().map(|pb| pb.next_due)
    }

    /// The arm pose of the last point which was solved.
    pub fn last_pose(&self) -> Option<&ArmPose> {
        self.last_pose.as_ref()
    }

    /// Execute a step if one is due at `now`.
    ///
    /// At most one point is played per call, and consecutive points are always at least one
    /// period apart even if a poll comes late. Returns `None` if idle or if the next step isn't
    /// due yet. The player returns to idle after the last point has been played.
    pub fn poll(&mut self, now: Instant) -> Option<StepReport> {
        let pb = self.playback.as_mut()?;

        if now < pb.next_due {
            return None;
        }

        let index = pb.index;
        let point = *pb.trajectory.get(index)?;
        let target = pb.transform.to_cartesian(&point);

        let outcome = match kinematics::inverse(&pb.config, &target) {
            Ok(pose) => {
                let report = send_goals(pb.sink.as_mut(), &pb.config, &pose);
                self.last_pose = Some(kinematics::forward(&pb.config, &pose));
                report
            }
            Err(e) => {
                warn!(
                    "Skipping point {} ({:.3}, {:.3}): {}",
                    index, target.x, target.y, e
                );
                StepOutcome::Skipped(e)
            }
        };

        // A late step pushes the schedule back so steps stay a full period apart
        pb.index += 1;
        pb.next_due = (pb.next_due + pb.period).max(now + pb.period);

        let finished = pb.index >= pb.trajectory.len();
        if finished {
            info!("Playback complete");
            self.playback = None;
        }

        Some(StepReport {
            index,
            target,
            outcome,
            finished,
        })
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Send one position goal per joint. Each goal is sent even if the other fails.
fn send_goals(sink: &mut dyn CommandSink, cfg: &ArmConfig, pose: &JointPose) -> StepOutcome {
    let mut ticks = [0i32; 2];
    let mut failure = None;

    for joint in Joint::ALL.iter() {
        let t = cfg.joint_deg_to_ticks(*joint, pose.angle_deg(*joint));
        ticks[joint.index()] = t;

        let request = BusRequest::goal_position(cfg.joint_id(*joint), t);
        if let Err(e) = sink.send(request) {
            warn!("Could not send the {:?} goal: {}", joint, e);
            failure = Some(e.to_string());
        }
    }

    match failure {
        Some(reason) => StepOutcome::SinkFailed {
            pose: *pose,
            reason,
        },
        None => {
            debug!(
                "Goals sent: shoulder {} ticks, elbow {} ticks",
                ticks[0], ticks[1]
            );
            StepOutcome::Commanded { pose: *pose, ticks }
        }
    }
}
