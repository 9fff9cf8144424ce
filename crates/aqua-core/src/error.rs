//! Error types shared by the station components
//!
//! None of these are fatal in steady-state operation. The station logs them
//! and moves on to the next tick.

use embedded_io_async::ErrorKind;
use thiserror_no_std::Error;

use crate::sensors::SensorChannel;

/// Failure reading a raw sample from an analog input
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("{channel} sample failed: {details}")]
    ReadFailed {
        channel: SensorChannel,
        details: &'static str,
    },
}

/// Failure writing to the character display
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    #[error("display draw failed")]
    DrawFailed,
    #[error("cursor ({col}, {row}) is outside the character grid")]
    CursorOutOfBounds { col: u8, row: u8 },
}

/// Failure delivering a reading to the remote endpoint
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UplinkError {
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(&'static str),
    #[error("DNS lookup failed")]
    Dns,
    #[error("TCP connect failed")]
    Connect,
    #[error("socket I/O failed: {0:?}")]
    Io(ErrorKind),
    #[error("malformed HTTP response: {0}")]
    MalformedResponse(&'static str),
    #[error("failed to serialize reading")]
    Serialize,
}

/// Top-level errors raised while bringing the station up
#[derive(Error, Debug)]
pub enum AppError {
    #[error("WiFi setup failed: {0}")]
    Wifi(heapless::String<64>),
    #[error("Display setup failed: {0}")]
    Display(heapless::String<64>),
    #[error("Uplink setup failed: {0}")]
    Uplink(UplinkError),
}

impl From<UplinkError> for AppError {
    fn from(value: UplinkError) -> Self {
        Self::Uplink(value)
    }
}

impl AppError {
    /// Build an error variant from a message, truncating anything past 64 bytes.
    pub fn message(kind: fn(heapless::String<64>) -> Self, text: &str) -> Self {
        let mut message = heapless::String::new();
        for c in text.chars() {
            if message.push(c).is_err() {
                break;
            }
        }
        kind(message)
    }
}
