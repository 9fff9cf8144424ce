//! Hardware-independent core library for aqua-rs
//!
//! This crate contains all platform-agnostic logic for the aqua water-quality
//! station: sensor calibration, the two-line display presenter, the JSON
//! uplink, threshold alerts, and the station loop that ties them together.
//!
//! Hardware is reached only through ports (traits):
//!
//! - [`sensors::AnalogSource`]: raw ADC samples per sensor channel
//! - [`display::CharacterDisplay`]: a 16x2 character surface
//! - [`uplink::NetworkLink`]: polled Wi-Fi association state
//! - [`uplink::HttpTransport`]: one blocking POST per call
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets (ESP32-S3) and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod alerts;
pub mod config;
pub mod display;
pub mod error;
pub mod sensors;
pub mod station;
pub mod uplink;

#[cfg(test)]
pub(crate) mod test_support;

pub use alerts::{Alert, AlertEvaluator, Alerts};
pub use config::{InternetConfig, StationConfig, Thresholds, Timing};
pub use display::{CharacterDisplay, GraphicsCharacterDisplay, Presenter};
pub use error::{AppError, DisplayError, SensorError, UplinkError};
pub use sensors::{AnalogSource, Calibration, Reading, SensorChannel, SensorReader};
pub use station::{Station, TickReport};
pub use uplink::{Endpoint, HttpResponse, HttpTransport, NetworkLink, SendOutcome, Uplink};
