//! Station configuration
//!
//! Everything here is fixed when the station is built and passed around by
//! reference afterwards. Nothing mutates it at runtime.

use serde::{Deserialize, Serialize};

use crate::sensors::Calibration;

/// Endpoint used when no other URL is configured
pub const DEFAULT_ENDPOINT: &str = "http://yourserver.com/post-data";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct StationConfig<'a> {
    pub internet: InternetConfig<'a>,
    /// Fixed `http://host[:port]/path` URL readings are POSTed to
    pub endpoint: &'a str,
    pub calibration: Calibration,
    pub thresholds: Thresholds,
    pub timing: Timing,
    /// When false the temperature channel is never sampled
    pub temperature_sensor_present: bool,
    /// Whether [`crate::Station::run`] raises threshold alerts after each tick
    pub alerts_enabled: bool,
}

impl<'a> StationConfig<'a> {
    /// Create a configuration with default calibration, thresholds and timing
    pub const fn new(internet: InternetConfig<'a>, endpoint: &'a str) -> Self {
        Self {
            internet,
            endpoint,
            calibration: Calibration::DEFAULT,
            thresholds: Thresholds::DEFAULT,
            timing: Timing::DEFAULT,
            temperature_sensor_present: true,
            alerts_enabled: false,
        }
    }
}

impl Default for StationConfig<'_> {
    fn default() -> Self {
        Self::new(InternetConfig::default(), DEFAULT_ENDPOINT)
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InternetConfig<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
}

/// Alert limits. All comparisons are exclusive: a value sitting exactly on a
/// limit does not alert.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub ph_min: f32,
    pub ph_max: f32,
    /// Turbidity above this raises an alert
    pub turbidity_max: f32,
}

impl Thresholds {
    pub const DEFAULT: Self = Self {
        ph_min: 6.5,
        ph_max: 8.5,
        turbidity_max: 5.0,
    };

    pub fn ph_out_of_range(&self, ph: f32) -> bool {
        ph < self.ph_min || ph > self.ph_max
    }

    pub fn turbidity_too_high(&self, turbidity: f32) -> bool {
        turbidity > self.turbidity_max
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Fixed delays, all in milliseconds
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Pause between the end of one tick and the start of the next
    pub tick_interval_ms: u32,
    /// Poll period while waiting for the link at startup
    pub connect_retry_ms: u32,
    /// How long each alert message stays on screen
    pub alert_hold_ms: u32,
    /// How long the startup banner stays on screen
    pub splash_ms: u32,
}

impl Timing {
    pub const DEFAULT: Self = Self {
        tick_interval_ms: 10_000,
        connect_retry_ms: 1_000,
        alert_hold_ms: 2_000,
        splash_ms: 2_000,
    };
}

impl Default for Timing {
    fn default() -> Self {
        Self::DEFAULT
    }
}
