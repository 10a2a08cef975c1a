//! # Inbound bus events
//!
//! Events sent by the actuator bus to the arm software.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use super::ServoId;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialPortInfo {
    pub device: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialPortList {
    pub ports: Vec<SerialPortInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    #[serde(default)]
    pub ids: Vec<ServoId>,
    pub message: String,
}

/// Connection details reported by the bus. All fields are empty when disconnected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectInfo {
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default)]
    pub baudrate: Option<u32>,
    #[serde(default)]
    pub ids: Vec<ServoId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectResult {
    pub connected: bool,
    #[serde(default)]
    pub info: ConnectInfo,
    pub message: String,
}

/// One telemetry frame covering every servo in the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryMsg {
    /// Time the frame was read from the bus.
    ///
    /// Units: seconds since the unix epoch
    #[serde(default)]
    pub timestamp: Option<f64>,

    #[serde(default)]
    pub servos: BTreeMap<ServoId, RawServoState>,
}

/// A raw reading of one servo's registers.
///
/// All values are in actuator-native units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub operating_mode: i32,
    pub torque_enabled: bool,
    pub present_pwm: i32,
    pub present_current: i32,
    pub present_velocity: i32,
    pub present_position: i32,
    pub moving: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_mode_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMsg {
    pub level: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMsg {
    pub message: String,
}

/// Envelope of every frame, the payload is decoded once the event name is known.
#[derive(Deserialize)]
struct Frame {
    event: String,
    #[serde(default)]
    data: Value,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The state of a single servo in a telemetry frame.
///
/// A read failure on the bus replaces the whole sample with an error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawServoState {
    Fault { error: String },
    Sample(RawSample),
}

/// An event from the actuator bus.
#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    SerialPorts(SerialPortList),
    ScanResult(ScanResult),
    ConnectResult(ConnectResult),
    Telemetry(TelemetryMsg),
    Log(LogMsg),
    BackendError(ErrorMsg),
}

/// Possible errors when parsing an event frame.
#[derive(Debug, Error)]
pub enum BusEventParseError {
    #[error("Event contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("{0} is not a recognised event")]
    UnknownEvent(String),

    #[error("Payload of the {0} event is invalid: {1}")]
    InvalidPayload(String, serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl BusEvent {
    /// Parse an event from a JSON frame.
    pub fn from_json(json_str: &str) -> Result<Self, BusEventParseError> {
        let frame: Frame = serde_json::from_str(json_str).map_err(BusEventParseError::InvalidJson)?;

        let evt = match frame.event.as_str() {
            "serial_ports" => BusEvent::SerialPorts(payload(&frame)?),
            "scan_result" => BusEvent::ScanResult(payload(&frame)?),
            "connect_result" => BusEvent::ConnectResult(payload(&frame)?),
            "telemetry" => BusEvent::Telemetry(payload(&frame)?),
            "log" => BusEvent::Log(payload(&frame)?),
            "backend_error" => BusEvent::BackendError(payload(&frame)?),
            _ => return Err(BusEventParseError::UnknownEvent(frame.event)),
        };

        Ok(evt)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn payload<T: DeserializeOwned>(frame: &Frame) -> Result<T, BusEventParseError> {
    serde_json::from_value(frame.data.clone())
        .map_err(|e| BusEventParseError::InvalidPayload(frame.event.clone(), e))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_telemetry_frame() {
        let evt = BusEvent::from_json(
            r#"{
                "event": "telemetry",
                "data": {
                    "timestamp": 1700000000.25,
                    "servos": {
                        "1": {
                            "operating_mode": 3,
                            "torque_enabled": true,
                            "present_pwm": -120,
                            "present_current": 15,
                            "present_velocity": 4,
                            "present_position": 2048,
                            "moving": false,
                            "operating_mode_name": "Position Control Mode"
                        },
                        "2": {"operating_mode": 3, "error": "Failed to read (ID 2, addr 124): timeout"}
                    }
                }
            }"#,
        )
        .unwrap();

        let tm = match evt {
            BusEvent::Telemetry(tm) => tm,
            e => panic!("Unexpected event {:?}", e),
        };

        assert_eq!(tm.timestamp, Some(1700000000.25));
        match &tm.servos[&1] {
            RawServoState::Sample(s) => {
                assert_eq!(s.present_position, 2048);
                assert_eq!(s.present_pwm, -120);
                assert!(s.torque_enabled);
            }
            s => panic!("Expected a sample, got {:?}", s),
        }
        match &tm.servos[&2] {
            RawServoState::Fault { error } => assert!(error.contains("timeout")),
            s => panic!("Expected a fault, got {:?}", s),
        }
    }

    #[test]
    fn test_connection_events() {
        let evt = BusEvent::from_json(
            r#"{"event": "connect_result", "data": {
                "ok": true, "connected": true, "message": "Connected successfully.",
                "info": {"port": "/dev/ttyUSB0", "baudrate": 57600, "ids": [1, 2]}
            }}"#,
        )
        .unwrap();
        assert_eq!(
            evt,
            BusEvent::ConnectResult(ConnectResult {
                connected: true,
                info: ConnectInfo {
                    port: Some("/dev/ttyUSB0".into()),
                    baudrate: Some(57600),
                    ids: vec![1, 2],
                },
                message: "Connected successfully.".into(),
            })
        );

        let evt = BusEvent::from_json(
            r#"{"event": "connect_result", "data": {
                "connected": false, "message": "Disconnected from Dynamixel bus.",
                "info": {"port": null, "baudrate": null, "ids": []}
            }}"#,
        )
        .unwrap();
        match evt {
            BusEvent::ConnectResult(r) => {
                assert!(!r.connected);
                assert_eq!(r.info, ConnectInfo::default());
            }
            e => panic!("Unexpected event {:?}", e),
        }

        let evt = BusEvent::from_json(
            r#"{"event": "backend_error", "data": {"message": "Not connected to any Dynamixel bus."}}"#,
        )
        .unwrap();
        assert_eq!(
            evt,
            BusEvent::BackendError(ErrorMsg {
                message: "Not connected to any Dynamixel bus.".into()
            })
        );
    }

    #[test]
    fn test_invalid_frames() {
        assert!(matches!(
            BusEvent::from_json("{not json"),
            Err(BusEventParseError::InvalidJson(_))
        ));
        assert!(matches!(
            BusEvent::from_json(r#"{"event": "reboot", "data": {}}"#),
            Err(BusEventParseError::UnknownEvent(e)) if e == "reboot"
        ));
        assert!(matches!(
            BusEvent::from_json(r#"{"event": "log", "data": {"level": "info"}}"#),
            Err(BusEventParseError::InvalidPayload(e, _)) if e == "log"
        ));
    }

    #[test]
    fn test_port_list() {
        let evt = BusEvent::from_json(
            r#"{"event": "serial_ports", "data": {"ports": [
                {"device": "/dev/ttyUSB0", "description": "FT232R USB UART"}
            ]}}"#,
        )
        .unwrap();
        match evt {
            BusEvent::SerialPorts(l) => {
                assert_eq!(l.ports.len(), 1);
                assert_eq!(l.ports[0].device, "/dev/ttyUSB0");
            }
            e => panic!("Unexpected event {:?}", e),
        }
    }
}
