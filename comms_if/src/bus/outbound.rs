//! # Outbound bus requests
//!
//! Requests sent from the arm software to the actuator bus.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ServoId, DEFAULT_BAUDRATE, SCAN_ID_MAX, SCAN_ID_MIN};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of a scan for responsive servos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanParams {
    pub port: String,
    pub baudrate: u32,
    pub id_min: ServoId,
    pub id_max: ServoId,
}

/// Parameters for opening a session with a set of servos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectParams {
    pub port: String,
    pub baudrate: u32,
    pub ids: Vec<ServoId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorqueDems {
    pub id: ServoId,
    pub enable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeDems {
    pub id: ServoId,

    /// Raw operating mode register value, see [`super::OperatingMode`].
    pub mode: i32,

    /// If set the servo's torque is disabled during the mode change and re-enabled afterwards.
    pub auto_torque: bool,
}

/// Controller gains for a servo, in raw register units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PidGains {
    pub id: ServoId,
    pub position_p: i32,
    pub position_i: i32,
    pub position_d: i32,
    pub velocity_p: i32,
    pub velocity_i: i32,
}

/// Motion targets for a single servo.
///
/// All goals are in actuator-native units and are independently optional, fields which are `None`
/// are left untouched on the servo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalDems {
    pub id: ServoId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_position: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_velocity: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_current: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_pwm: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_velocity: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_accel: Option<i32>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A request to the actuator bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum BusRequest {
    /// Request the list of available serial ports
    ListSerialPorts,

    /// Discover responsive servo IDs
    ScanServos(ScanParams),

    /// Open a session with the given servos
    ConnectServos(ConnectParams),

    /// Close the current session
    DisconnectServos,

    SetTorque(TorqueDems),

    SetOperatingMode(ModeDems),

    SetPid(PidGains),

    SetGoals(GoalDems),
}

/// Invalid user input when building a request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("No port selected")]
    NoPortSelected,

    #[error("No servo IDs selected")]
    NoIdsSelected,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl BusRequest {
    /// Build a scan request.
    ///
    /// Missing values take the bus defaults, and a reversed ID range is swapped round.
    pub fn scan(
        port: &str,
        baudrate: Option<u32>,
        id_min: Option<ServoId>,
        id_max: Option<ServoId>,
    ) -> Result<Self, RequestError> {
        let port = validate_port(port)?;

        let mut id_min = id_min.unwrap_or(SCAN_ID_MIN);
        let mut id_max = id_max.unwrap_or(SCAN_ID_MAX);
        if id_min > id_max {
            std::mem::swap(&mut id_min, &mut id_max);
        }

        Ok(Self::ScanServos(ScanParams {
            port,
            baudrate: baudrate.unwrap_or(DEFAULT_BAUDRATE),
            id_min,
            id_max,
        }))
    }

    /// Build a connect request. Both a port and at least one ID must be selected.
    pub fn connect(
        port: &str,
        baudrate: Option<u32>,
        ids: &[ServoId],
    ) -> Result<Self, RequestError> {
        let port = validate_port(port)?;

        if ids.is_empty() {
            return Err(RequestError::NoIdsSelected);
        }

        Ok(Self::ConnectServos(ConnectParams {
            port,
            baudrate: baudrate.unwrap_or(DEFAULT_BAUDRATE),
            ids: ids.to_vec(),
        }))
    }

    /// Build a goal request which only sets the goal position.
    pub fn goal_position(id: ServoId, ticks: i32) -> Self {
        Self::SetGoals(GoalDems {
            id,
            goal_position: Some(ticks),
            ..Default::default()
        })
    }

    /// Serialise the request into its JSON frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn validate_port(port: &str) -> Result<String, RequestError> {
    let port = port.trim();
    if port.is_empty() {
        Err(RequestError::NoPortSelected)
    } else {
        Ok(port.to_string())
    }
}
