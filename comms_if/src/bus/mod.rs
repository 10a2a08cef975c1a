//! # Actuator Bus Interface
//!
//! This module defines the messages exchanged with the actuator bus collaborator. The transport
//! itself (serial port handling, device I/O) lives outside this workspace, only the payload shapes
//! are defined here.
//!
//! All messages are framed as JSON objects of the form `{"event": <name>, "data": <payload>}`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod inbound;
mod outbound;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

pub use inbound::*;
pub use outbound::*;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Baudrate used when a request doesn't specify one.
pub const DEFAULT_BAUDRATE: u32 = 57_600;

/// Lowest servo ID probed by a scan when no range is given.
pub const SCAN_ID_MIN: ServoId = 0;

/// Highest servo ID probed by a scan when no range is given.
pub const SCAN_ID_MAX: ServoId = 252;

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// Identifier of a servo on the bus.
pub type ServoId = u8;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Control modes supported by the servos.
///
/// The discriminants are the values written to the servo's operating mode register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    Current = 0,
    Velocity = 1,
    Position = 3,
    ExtendedPosition = 4,
    CurrentBasedPosition = 5,
    Pwm = 16,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl OperatingMode {
    /// Get the mode from the raw register value, or `None` if the value isn't a known mode.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Current),
            1 => Some(Self::Velocity),
            3 => Some(Self::Position),
            4 => Some(Self::ExtendedPosition),
            5 => Some(Self::CurrentBasedPosition),
            16 => Some(Self::Pwm),
            _ => None,
        }
    }

    /// Human readable name of the mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Current => "Current Control Mode",
            Self::Velocity => "Velocity Control Mode",
            Self::Position => "Position Control Mode",
            Self::ExtendedPosition => "Extended Position Control Mode",
            Self::CurrentBasedPosition => "Current-based Position Mode",
            Self::Pwm => "PWM Control Mode",
        }
    }

    /// Label for a raw mode value, falling back to `Mode N` for unknown values.
    pub fn label_for(raw: i32) -> String {
        match Self::from_raw(raw) {
            Some(m) => m.name().to_string(),
            None => format!("Mode {}", raw),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mode_labels() {
        assert_eq!(OperatingMode::label_for(3), "Position Control Mode");
        assert_eq!(OperatingMode::label_for(16), "PWM Control Mode");
        assert_eq!(OperatingMode::label_for(2), "Mode 2");
        assert_eq!(OperatingMode::from_raw(5), Some(OperatingMode::CurrentBasedPosition));
        assert_eq!(OperatingMode::Pwm as i32, 16);
    }
}
