//! ADC1 probe inputs
//!
//! | Probe       | Pin    |
//! |-------------|--------|
//! | pH          | GPIO1  |
//! | Turbidity   | GPIO2  |
//! | Temperature | GPIO3  |

use aqua_core::{AnalogSource, Calibration, SensorChannel, SensorError};
use esp_hal::Blocking;
use esp_hal::analog::adc::{Adc, AdcConfig, AdcPin, Attenuation};
use esp_hal::peripherals::{ADC1, GPIO1, GPIO2, GPIO3};

/// ADC1 at 11 dB attenuation reads 0..~3.1 V as 12-bit counts.
pub const ESP32S3_CALIBRATION: Calibration = Calibration {
    reference_voltage: 3.1,
    max_raw: 4095,
    ..Calibration::DEFAULT
};

pub struct EspAnalogSource<'d> {
    adc: Adc<'d, ADC1<'d>, Blocking>,
    ph: AdcPin<GPIO1<'d>, ADC1<'d>>,
    turbidity: AdcPin<GPIO2<'d>, ADC1<'d>>,
    temperature: AdcPin<GPIO3<'d>, ADC1<'d>>,
}

impl<'d> EspAnalogSource<'d> {
    pub fn new(adc1: ADC1<'d>, ph: GPIO1<'d>, turbidity: GPIO2<'d>, temperature: GPIO3<'d>) -> Self {
        let mut config = AdcConfig::default();
        let ph = config.enable_pin(ph, Attenuation::_11dB);
        let turbidity = config.enable_pin(turbidity, Attenuation::_11dB);
        let temperature = config.enable_pin(temperature, Attenuation::_11dB);

        Self {
            adc: Adc::new(adc1, config),
            ph,
            turbidity,
            temperature,
        }
    }
}

impl AnalogSource for EspAnalogSource<'_> {
    async fn sample(&mut self, channel: SensorChannel) -> Result<u16, SensorError> {
        // Oneshot conversions take a few microseconds; not worth yielding for.
        let raw = match channel {
            SensorChannel::Ph => self.adc.read_blocking(&mut self.ph),
            SensorChannel::Turbidity => self.adc.read_blocking(&mut self.turbidity),
            SensorChannel::Temperature => self.adc.read_blocking(&mut self.temperature),
        };
        Ok(raw)
    }
}
