mod calibration;

pub use calibration::*;

use core::fmt;

use log::debug;
use serde::Serialize;

pub use crate::error::SensorError;

/// The fixed analog inputs the station samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorChannel {
    Ph,
    Turbidity,
    Temperature,
}

impl SensorChannel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ph => "pH",
            Self::Turbidity => "turbidity",
            Self::Temperature => "temperature",
        }
    }
}

impl fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One tick's calibrated values.
///
/// Serializes to the flat JSON object sent upstream. An absent temperature
/// sensor serializes as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    pub ph: f32,
    pub turbidity: f32,
    pub temperature: Option<f32>,
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pH: {:.2}, Turbidity: {:.2}, Temp: ", self.ph, self.turbidity)?;
        match self.temperature {
            Some(t) => write!(f, "{:.2}", t),
            None => f.write_str("--"),
        }
    }
}

/// Port for raw analog samples.
///
/// One call takes exactly one conversion on the given channel.
pub trait AnalogSource {
    fn sample(&mut self, channel: SensorChannel) -> impl Future<Output = Result<u16, SensorError>>;
}

/// Turns raw samples into calibrated values.
pub struct SensorReader<'c, A> {
    source: A,
    calibration: &'c Calibration,
    temperature_present: bool,
}

impl<'c, A: AnalogSource> SensorReader<'c, A> {
    pub fn new(source: A, calibration: &'c Calibration, temperature_present: bool) -> Self {
        Self {
            source,
            calibration,
            temperature_present,
        }
    }

    pub async fn read_ph(&mut self) -> Result<f32, SensorError> {
        let raw = self.source.sample(SensorChannel::Ph).await?;
        Ok(self.calibration.ph(raw))
    }

    pub async fn read_turbidity(&mut self) -> Result<f32, SensorError> {
        let raw = self.source.sample(SensorChannel::Turbidity).await?;
        Ok(self.calibration.turbidity(raw))
    }

    /// Returns `None` without touching the ADC when no sensor is fitted.
    pub async fn read_temperature(&mut self) -> Result<Option<f32>, SensorError> {
        if !self.temperature_present {
            return Ok(None);
        }
        let raw = self.source.sample(SensorChannel::Temperature).await?;
        Ok(Some(self.calibration.temperature(raw)))
    }

    /// Sample every channel once and build a reading.
    ///
    /// Any failed sample aborts the whole reading, so a `Reading` never mixes
    /// values from different ticks.
    pub async fn read(&mut self) -> Result<Reading, SensorError> {
        let ph = self.read_ph().await?;
        let turbidity = self.read_turbidity().await?;
        let temperature = self.read_temperature().await?;
        debug!("Sampled pH={} turbidity={} temperature={:?}", ph, turbidity, temperature);

        Ok(Reading {
            ph,
            turbidity,
            temperature,
        })
    }

    pub fn source(&self) -> &A {
        &self.source
    }
}
