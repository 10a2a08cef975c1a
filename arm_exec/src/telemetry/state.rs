//! Implementations for the TelemetryDecoder state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::Utc;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::convert::Infallible;

// Internal
use super::{JointHistory, TelemetryInitError, DEFAULT_HISTORY_LEN, LABEL_FORMAT};
use crate::unit_conv;
use comms_if::bus::{OperatingMode, RawSample, RawServoState, ServoId, TelemetryMsg};
use util::{module::State, time::unix_seconds_to_datetime};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Telemetry decoder state.
///
/// Keeps the latest decoded state, the latest fault and the signal histories of every servo which
/// has reported telemetry.
#[derive(Debug)]
pub struct TelemetryDecoder {
    history_len: usize,

    histories: BTreeMap<ServoId, JointHistory>,

    latest: BTreeMap<ServoId, DecodedJoint>,

    faults: BTreeMap<ServoId, TelemetryFault>,
}

/// The state of a servo in physical units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedJoint {
    /// Label of the frame this state was decoded from.
    pub label: String,

    /// Raw servo position, kept so the joint angle can be recovered with the joint's zero offset.
    ///
    /// Units: ticks
    pub position_ticks: i32,

    /// Units: degrees
    pub position_deg: f64,

    /// Units: rpm
    pub velocity_rpm: f64,

    /// Units: mA
    pub current_ma: f64,

    /// Units: percent
    pub pwm_percent: f64,

    pub mode_label: String,

    pub torque_enabled: bool,

    pub moving: bool,
}

/// A servo which reported an error instead of a sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryFault {
    pub id: ServoId,
    pub label: String,
    pub message: String,
}

/// Status report for the decoding of a telemetry frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// Label given to the frame.
    pub label: String,

    /// Servos which reported an error, their state was not updated.
    pub faults: Vec<TelemetryFault>,
}

/// Read-only copy of the decoder's state, used for archiving.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetrySnapshot {
    pub histories: BTreeMap<ServoId, JointHistory>,
    pub latest: BTreeMap<ServoId, DecodedJoint>,
    pub faults: BTreeMap<ServoId, TelemetryFault>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TelemetryDecoder {
    fn default() -> Self {
        Self {
            history_len: DEFAULT_HISTORY_LEN,
            histories: BTreeMap::new(),
            latest: BTreeMap::new(),
            faults: BTreeMap::new(),
        }
    }
}

impl State for TelemetryDecoder {
    type InitData = usize;
    type InitError = TelemetryInitError;

    type InputData = TelemetryMsg;
    type OutputData = BTreeMap<ServoId, DecodedJoint>;
    type StatusReport = StatusReport;
    type ProcError = Infallible;

    /// Initialise the decoder.
    ///
    /// Expected init data is the number of entries kept per joint and per signal. Any previously
    /// decoded state is discarded.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        if init_data == 0 {
            return Err(TelemetryInitError::ZeroHistoryLen);
        }

        *self = Self {
            history_len: init_data,
            ..Self::default()
        };

        Ok(())
    }

    /// Decode a telemetry frame.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        Ok(self.decode(input_data))
    }
}

impl TelemetryDecoder {
    /// Decode a telemetry frame.
    ///
    /// Servos are processed in ascending ID order. A servo which reports an
    /// error keeps its previous state and history, the error is returned in
    /// the status report and doesn't affect the other servos.
    ///
    /// If the frame has no valid timestamp the current time is used for the
    /// label.
    pub fn decode(&mut self, msg: &TelemetryMsg) -> (BTreeMap<ServoId, DecodedJoint>, StatusReport) {
        let label = frame_label(msg.timestamp);

        let mut decoded = BTreeMap::new();
        let mut report = StatusReport {
            label: label.clone(),
            faults: Vec::new(),
        };

        for (id, state) in msg.servos.iter() {
            match state {
                RawServoState::Fault { error } => {
                    warn!("Telemetry fault on servo {}: {}", id, error);

                    let fault = TelemetryFault {
                        id: *id,
                        label: label.clone(),
                        message: error.clone(),
                    };
                    self.faults.insert(*id, fault.clone());
                    report.faults.push(fault);
                }
                RawServoState::Sample(sample) => {
                    let joint = decode_sample(&label, sample);

                    let history_len = self.history_len;
                    let history = self
                        .histories
                        .entry(*id)
                        .or_insert_with(|| JointHistory::new(history_len));
                    history.position_deg.push(&label, joint.position_deg);
                    history.velocity_rpm.push(&label, joint.velocity_rpm);

                    debug!(
                        "Servo {}: {:.2} deg, {:.2} rpm, {:.1} mA, {:.1} %",
                        id, joint.position_deg, joint.velocity_rpm, joint.current_ma, joint.pwm_percent
                    );

                    self.faults.remove(id);
                    self.latest.insert(*id, joint.clone());
                    decoded.insert(*id, joint);
                }
            }
        }

        (decoded, report)
    }

    /// Histories of the given servo, or `None` if it never reported a valid sample.
    pub fn history(&self, id: ServoId) -> Option<&JointHistory> {
        self.histories.get(&id)
    }

    /// The last successfully decoded state of the given servo.
    pub fn latest(&self, id: ServoId) -> Option<&DecodedJoint> {
        self.latest.get(&id)
    }

    /// The fault reported by the servo in its latest frame, if that frame was a fault.
    pub fn last_fault(&self, id: ServoId) -> Option<&TelemetryFault> {
        self.faults.get(&id)
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }

    /// Copy the decoder's state.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            histories: self.histories.clone(),
            latest: self.latest.clone(),
            faults: self.faults.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn frame_label(timestamp_s: Option<f64>) -> String {
    let time = timestamp_s
        .and_then(unix_seconds_to_datetime)
        .unwrap_or_else(Utc::now);

    time.format(LABEL_FORMAT).to_string()
}

fn decode_sample(label: &str, sample: &RawSample) -> DecodedJoint {
    let mode_label = match &sample.operating_mode_name {
        Some(name) => name.clone(),
        None => OperatingMode::label_for(sample.operating_mode),
    };

    DecodedJoint {
        label: label.to_string(),
        position_ticks: sample.present_position,
        position_deg: unit_conv::ticks_to_deg(sample.present_position),
        velocity_rpm: unit_conv::units_to_rpm(sample.present_velocity),
        current_ma: unit_conv::units_to_ma(sample.present_current),
        pwm_percent: unit_conv::units_to_percent(sample.present_pwm),
        mode_label,
        torque_enabled: sample.torque_enabled,
        moving: sample.moving,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample(position: i32, velocity: i32) -> RawServoState {
        RawServoState::Sample(RawSample {
            operating_mode: 3,
            torque_enabled: true,
            present_pwm: 100,
            present_current: -12,
            present_velocity: velocity,
            present_position: position,
            moving: velocity != 0,
            operating_mode_name: None,
        })
    }

    fn fault(msg: &str) -> RawServoState {
        RawServoState::Fault {
            error: msg.to_string(),
        }
    }

    fn frame(timestamp: Option<f64>, servos: Vec<(ServoId, RawServoState)>) -> TelemetryMsg {
        TelemetryMsg {
            timestamp,
            servos: servos.into_iter().collect(),
        }
    }

    #[test]
    fn test_decode_units() {
        let mut dec = TelemetryDecoder::default();
        let (decoded, report) = dec.decode(&frame(Some(0.0), vec![(1, sample(1000, 10))]));

        assert!(report.faults.is_empty());
        assert_eq!(report.label, "00:00:00.000");

        let j = &decoded[&1];
        assert_eq!(j.position_ticks, 1000);
        assert!((j.position_deg - 88.0).abs() < 1e-9);
        assert!((j.velocity_rpm - 2.29).abs() < 1e-9);
        assert!((j.current_ma + 12.0).abs() < 1e-9);
        assert!((j.pwm_percent - 11.3).abs() < 1e-9);
        assert_eq!(j.mode_label, "Position Control Mode");
        assert!(j.torque_enabled);
        assert!(j.moving);

        assert_eq!(dec.latest(1), Some(j));
        assert_eq!(dec.history(1).unwrap().position_deg.len(), 1);
    }

    #[test]
    fn test_history_capped() {
        let mut dec = TelemetryDecoder::default();
        for i in 0..(DEFAULT_HISTORY_LEN as i32 + 50) {
            dec.decode(&frame(Some(i as f64), vec![(1, sample(i, i)), (2, sample(-i, 0))]));
        }

        for id in [1, 2].iter() {
            let h = dec.history(*id).unwrap();
            assert_eq!(h.position_deg.len(), DEFAULT_HISTORY_LEN);
            assert_eq!(h.velocity_rpm.len(), DEFAULT_HISTORY_LEN);
        }

        // The oldest 50 entries were evicted
        let oldest = dec.history(1).unwrap().position_deg.iter().next().unwrap();
        assert!((oldest.value - unit_conv::ticks_to_deg(50)).abs() < 1e-9);
        assert_eq!(oldest.label, "00:00:50.000");
    }

    #[test]
    fn test_fault_isolated_to_joint() {
        let mut dec = TelemetryDecoder::default();
        dec.decode(&frame(Some(1.0), vec![(1, sample(100, 0)), (2, sample(200, 0))]));

        let (decoded, report) =
            dec.decode(&frame(Some(2.0), vec![(1, fault("Failed to read")), (2, sample(300, 0))]));

        // Servo 1 keeps its old state and history
        assert_eq!(report.faults.len(), 1);
        assert_eq!(report.faults[0].id, 1);
        assert_eq!(report.faults[0].message, "Failed to read");
        assert!(!decoded.contains_key(&1));
        assert_eq!(dec.history(1).unwrap().position_deg.len(), 1);
        assert!((dec.latest(1).unwrap().position_deg - unit_conv::ticks_to_deg(100)).abs() < 1e-9);
        assert!(dec.last_fault(1).is_some());

        // Servo 2 proceeds normally
        assert_eq!(dec.history(2).unwrap().position_deg.len(), 2);
        assert!((decoded[&2].position_deg - unit_conv::ticks_to_deg(300)).abs() < 1e-9);

        // A good sample clears the fault
        dec.decode(&frame(Some(3.0), vec![(1, sample(100, 0))]));
        assert!(dec.last_fault(1).is_none());
    }

    #[test]
    fn test_fault_before_any_sample() {
        let mut dec = TelemetryDecoder::default();
        let (_, report) = dec.decode(&frame(None, vec![(5, fault("Ping failed"))]));

        assert_eq!(report.faults.len(), 1);
        assert!(dec.history(5).is_none());
        assert!(dec.latest(5).is_none());
    }

    #[test]
    fn test_label_fallback() {
        let mut dec = TelemetryDecoder::default();
        let (_, report) = dec.decode(&frame(None, vec![]));

        // Wall clock label, same shape as a timestamp label
        assert_eq!(report.label.len(), "00:00:00.000".len());
        assert!(chrono::NaiveTime::parse_from_str(&report.label, "%H:%M:%S%.3f").is_ok());

        let (_, report) = dec.decode(&frame(Some(f64::NAN), vec![]));
        assert!(chrono::NaiveTime::parse_from_str(&report.label, "%H:%M:%S%.3f").is_ok());
    }

    #[test]
    fn test_mode_label_from_sample() {
        let mut dec = TelemetryDecoder::default();
        let mut s = match sample(0, 0) {
            RawServoState::Sample(s) => s,
            _ => unreachable!(),
        };
        s.operating_mode = 2;
        let (decoded, _) = dec.decode(&frame(Some(0.0), vec![(3, RawServoState::Sample(s.clone()))]));
        assert_eq!(decoded[&3].mode_label, "Mode 2");

        s.operating_mode_name = Some("Custom".into());
        let (decoded, _) = dec.decode(&frame(Some(0.0), vec![(3, RawServoState::Sample(s))]));
        assert_eq!(decoded[&3].mode_label, "Custom");
    }

    #[test]
    fn test_init() {
        let mut dec = TelemetryDecoder::default();
        assert!(dec.init(0).is_err());

        dec.decode(&frame(Some(0.0), vec![(1, sample(0, 0))]));
        dec.init(4).unwrap();
        assert!(dec.history(1).is_none());

        for i in 0..10 {
            let (out, rpt) = dec.proc(&frame(Some(i as f64), vec![(1, sample(i, 0))])).unwrap();
            assert_eq!(out.len(), 1);
            assert!(rpt.faults.is_empty());
        }
        assert_eq!(dec.history(1).unwrap().position_deg.len(), 4);
        assert_eq!(dec.history_len(), 4);
    }
}
