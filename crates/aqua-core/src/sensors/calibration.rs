//! Linear calibration from raw ADC counts to physical values

use serde::{Deserialize, Serialize};

/// Slope of the pH probe response in pH units per volt
pub const PH_VOLTS_SLOPE: f32 = -5.7;

/// Output voltage of the temperature sensor at 0 °C
pub const TEMPERATURE_ZERO_VOLTS: f32 = 0.5;

/// Temperature sensor scale in °C per volt
pub const TEMPERATURE_DEGREES_PER_VOLT: f32 = 100.0;

/// Calibration constants shared by all analog channels
///
/// Raw counts become a voltage with `raw * (reference_voltage / max_raw)`,
/// then each channel applies its own affine formula. No clamping is done:
/// a disconnected probe still yields a finite, meaningless value.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    /// ADC full-scale voltage
    pub reference_voltage: f32,
    /// Raw count corresponding to `reference_voltage`
    pub max_raw: u16,
    /// pH at 0 V
    pub ph_offset: f32,
    /// Turbidity units per volt
    pub turbidity_gain: f32,
}

impl Calibration {
    /// 10-bit ADC at 5 V with the stock probe constants
    pub const DEFAULT: Self = Self {
        reference_voltage: 5.0,
        max_raw: 1023,
        ph_offset: 3.5,
        turbidity_gain: 2.0,
    };

    pub const fn new(reference_voltage: f32, max_raw: u16, ph_offset: f32, turbidity_gain: f32) -> Self {
        Self {
            reference_voltage,
            max_raw,
            ph_offset,
            turbidity_gain,
        }
    }

    #[inline]
    pub fn voltage(&self, raw: u16) -> f32 {
        raw as f32 * (self.reference_voltage / self.max_raw as f32)
    }

    #[inline]
    pub fn ph(&self, raw: u16) -> f32 {
        PH_VOLTS_SLOPE * self.voltage(raw) + self.ph_offset
    }

    #[inline]
    pub fn turbidity(&self, raw: u16) -> f32 {
        self.turbidity_gain * self.voltage(raw)
    }

    #[inline]
    pub fn temperature(&self, raw: u16) -> f32 {
        (self.voltage(raw) - TEMPERATURE_ZERO_VOLTS) * TEMPERATURE_DEGREES_PER_VOLT
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::DEFAULT
    }
}
