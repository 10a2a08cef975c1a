//! # Data Store
//!
//! Context object owning every piece of state in the executable. Inbound bus events are routed to
//! the module which owns the matching state.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::bus::{BusEvent, ConnectInfo, LogMsg, ScanResult, SerialPortInfo};
use log::{info, log, warn, Level};
use std::sync::Arc;
use std::time::Instant;

use crate::{
    arm_config::{ArmConfig, ArmConfigUpdate, ConfigError, ConfigStore, Joint},
    kinematics::{sample_workspace, CartesianPoint},
    telemetry::{TelemetryDecoder, TelemetryInitError},
    traj_player::{CommandSink, DisplayTransform, PlayerError, Trajectory, TrajectoryPlayer},
};
use util::module::State;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of samples per joint used when computing the workspace cloud.
pub const WORKSPACE_RESOLUTION: usize = 40;

/// Log target for records forwarded from the bus.
pub const BUS_LOG_TARGET: &str = "bus";

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// State of the session with the servos.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    Disconnected,
    Connected(ConnectInfo),
}

/// Possible errors when creating the data store.
#[derive(Debug, thiserror::Error)]
pub enum DataStoreInitError {
    #[error("Invalid arm configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not initialise the telemetry decoder: {0}")]
    Telemetry(#[from] TelemetryInitError),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Debug)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    // Configuration
    config: ConfigStore,

    /// End effector positions covering the reachable workspace of the current configuration
    workspace: Vec<CartesianPoint>,

    // Telemetry
    pub telemetry: TelemetryDecoder,

    // Playback
    /// Trajectory being captured, played on request
    pub trajectory: Trajectory,

    pub player: TrajectoryPlayer,

    // Bus
    pub connection: ConnectionState,

    /// Last connection-level error reported by the bus, cleared by the next connect result
    pub transport_fault: Option<String>,

    pub serial_ports: Vec<SerialPortInfo>,

    pub scan_result: Option<ScanResult>,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Create the store from a configuration and the telemetry history length.
    pub fn new(config: ArmConfig, history_len: usize) -> Result<Self, DataStoreInitError> {
        let config = ConfigStore::new(config)?;

        let mut telemetry = TelemetryDecoder::default();
        telemetry.init(history_len)?;

        let workspace = sample_workspace(&config.snapshot(), WORKSPACE_RESOLUTION).collect();

        Ok(Self {
            num_cycles: 0,
            num_consec_cycle_overruns: 0,
            config,
            workspace,
            telemetry,
            trajectory: Trajectory::new(),
            player: TrajectoryPlayer::new(),
            connection: ConnectionState::Disconnected,
            transport_fault: None,
            serial_ports: Vec::new(),
            scan_result: None,
        })
    }

    /// The current arm configuration.
    pub fn config(&self) -> Arc<ArmConfig> {
        self.config.snapshot()
    }

    /// Apply a partial configuration update and recompute the workspace.
    ///
    /// A playback in progress keeps the configuration it was started with.
    pub fn apply_config(&mut self, update: &ArmConfigUpdate) -> Result<Arc<ArmConfig>, ConfigError> {
        let cfg = self.config.apply(update)?;

        self.workspace = sample_workspace(&cfg, WORKSPACE_RESOLUTION).collect();
        info!("Workspace recomputed ({} samples)", self.workspace.len());

        Ok(cfg)
    }

    /// Point cloud of the reachable workspace.
    pub fn workspace(&self) -> &[CartesianPoint] {
        &self.workspace
    }

    /// Measured angle of a joint in the joint's own frame, from the latest telemetry.
    ///
    /// Units: degrees
    pub fn measured_joint_deg(&self, joint: Joint) -> Option<f64> {
        let cfg = self.config.snapshot();

        self.telemetry
            .latest(cfg.joint_id(joint))
            .map(|j| cfg.ticks_to_joint_deg(joint, j.position_ticks))
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.connection, ConnectionState::Connected(_))
    }

    /// Start playing the captured trajectory with the current configuration.
    pub fn start_playback<T, S>(
        &mut self,
        transform: T,
        sink: S,
        now: Instant,
    ) -> Result<(), PlayerError>
    where
        T: DisplayTransform + 'static,
        S: CommandSink + 'static,
    {
        self.player.start(
            self.trajectory.clone(),
            transform,
            self.config.snapshot(),
            sink,
            now,
        )
    }

    /// Route an event from the bus.
    pub fn handle_event(&mut self, event: BusEvent) {
        match event {
            BusEvent::Telemetry(msg) => {
                // Faults are logged by the decoder and kept in its state
                self.telemetry.decode(&msg);
            }
            BusEvent::ConnectResult(res) => {
                info!("{}", res.message);
                self.transport_fault = None;
                self.connection = match res.connected {
                    true => ConnectionState::Connected(res.info),
                    false => ConnectionState::Disconnected,
                };
            }
            BusEvent::SerialPorts(list) => {
                info!("{} serial ports available", list.ports.len());
                self.serial_ports = list.ports;
            }
            BusEvent::ScanResult(res) => {
                info!("{}", res.message);
                self.scan_result = Some(res);
            }
            BusEvent::Log(msg) => forward_log(&msg),
            BusEvent::BackendError(err) => {
                warn!("Bus error: {}", err.message);
                self.transport_fault = Some(err.message);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Surface a bus log record through our own logger, at the closest level.
fn forward_log(msg: &LogMsg) {
    let level = match msg.level.to_ascii_lowercase().as_str() {
        "error" | "critical" => Level::Error,
        "warn" | "warning" => Level::Warn,
        "debug" => Level::Debug,
        "trace" => Level::Trace,
        _ => Level::Info,
    };

    log!(target: BUS_LOG_TARGET, level, "{}", msg.message);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::telemetry::DEFAULT_HISTORY_LEN;
    use comms_if::bus::{ConnectResult, ErrorMsg, RawSample, RawServoState, TelemetryMsg};

    fn store() -> DataStore {
        DataStore::new(ArmConfig::default(), DEFAULT_HISTORY_LEN).unwrap()
    }

    fn telemetry(id: u8, position: i32) -> BusEvent {
        let mut msg = TelemetryMsg::default();
        msg.servos.insert(
            id,
            RawServoState::Sample(RawSample {
                operating_mode: 3,
                torque_enabled: true,
                present_pwm: 0,
                present_current: 0,
                present_velocity: 0,
                present_position: position,
                moving: false,
                operating_mode_name: None,
            }),
        );
        BusEvent::Telemetry(msg)
    }

    #[test]
    fn test_invalid_init() {
        let mut cfg = ArmConfig::default();
        cfg.link1_length = -1.0;
        assert!(matches!(
            DataStore::new(cfg, 10),
            Err(DataStoreInitError::Config(_))
        ));
        assert!(matches!(
            DataStore::new(ArmConfig::default(), 0),
            Err(DataStoreInitError::Telemetry(_))
        ));
    }

    #[test]
    fn test_apply_config_recomputes_workspace() {
        let mut ds = store();
        assert_eq!(ds.workspace().len(), WORKSPACE_RESOLUTION * WORKSPACE_RESOLUTION);

        let max_before = ds
            .workspace()
            .iter()
            .map(|p| p.coords.norm())
            .fold(0.0, f64::max);
        assert!(max_before <= 30.0 + 1e-9);

        let update = ArmConfigUpdate {
            link1_length: Some(25.0),
            ..Default::default()
        };
        ds.apply_config(&update).unwrap();

        let max_after = ds
            .workspace()
            .iter()
            .map(|p| p.coords.norm())
            .fold(0.0, f64::max);
        assert!(max_after > 30.0);
        assert!(max_after <= 40.0 + 1e-9);

        // Rejected updates leave everything untouched
        let update = ArmConfigUpdate {
            link2_length: Some(0.0),
            ..Default::default()
        };
        assert!(ds.apply_config(&update).is_err());
        assert!((ds.config().link1_length - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_event_routing() {
        let mut ds = store();

        ds.handle_event(telemetry(1, 1000));
        assert!((ds.telemetry.latest(1).unwrap().position_deg - 88.0).abs() < 1e-9);

        // Servo 1 is the shoulder, with its 180 degree zero offset removed
        assert!((ds.measured_joint_deg(Joint::Shoulder).unwrap() + 92.0).abs() < 1e-9);
        assert!(ds.measured_joint_deg(Joint::Elbow).is_none());

        ds.handle_event(BusEvent::ConnectResult(ConnectResult {
            connected: true,
            info: ConnectInfo {
                port: Some("/dev/ttyUSB0".into()),
                baudrate: Some(57600),
                ids: vec![1, 2],
            },
            message: "Connected".into(),
        }));
        assert!(ds.is_connected());

        // Transport faults keep the connection and the telemetry history
        ds.handle_event(BusEvent::BackendError(ErrorMsg {
            message: "Port closed".into(),
        }));
        assert_eq!(ds.transport_fault.as_deref(), Some("Port closed"));
        assert_eq!(ds.telemetry.history(1).unwrap().position_deg.len(), 1);

        ds.handle_event(BusEvent::ConnectResult(ConnectResult {
            connected: false,
            info: ConnectInfo::default(),
            message: "Disconnected".into(),
        }));
        assert_eq!(ds.connection, ConnectionState::Disconnected);
        assert!(ds.transport_fault.is_none());
        assert_eq!(ds.telemetry.history(1).unwrap().position_deg.len(), 1);

        ds.handle_event(BusEvent::ScanResult(ScanResult {
            ids: vec![1, 2],
            message: "Found 2 servos".into(),
        }));
        assert_eq!(ds.scan_result.as_ref().map(|r| r.ids.len()), Some(2));
    }

    #[test]
    fn test_playback_uses_snapshot() {
        let mut ds = store();
        let (tx, rx) = std::sync::mpsc::channel();
        let now = Instant::now();

        ds.trajectory.push([25.0, 0.0].into());
        ds.trajectory.push([25.0, 1.0].into());
        ds.start_playback(crate::traj_player::IdentityTransform, tx, now)
            .unwrap();

        // Shrinking the arm mid-playback doesn't affect the ongoing playback
        let update = ArmConfigUpdate {
            link1_length: Some(5.0),
            link2_length: Some(5.0),
            ..Default::default()
        };
        ds.apply_config(&update).unwrap();

        let period = ds.config().playback_period();
        assert!(ds.player.poll(now).is_some());
        assert!(ds.player.poll(now + period).unwrap().finished);
        assert_eq!(rx.try_iter().count(), 4);
    }
}
