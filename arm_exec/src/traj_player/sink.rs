//! Destinations for the requests produced during playback

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt::Debug;
use std::sync::mpsc::Sender;

use comms_if::bus::BusRequest;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Something which forwards requests to the actuator bus.
pub trait CommandSink: Debug {
    fn send(&mut self, request: BusRequest) -> Result<(), SinkError>;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("The bus transport is disconnected")]
    Disconnected,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CommandSink for Sender<BusRequest> {
    fn send(&mut self, request: BusRequest) -> Result<(), SinkError> {
        Sender::send(self, request).map_err(|_| SinkError::Disconnected)
    }
}
