//! Threshold alerts for out-of-range readings
//!
//! Evaluation is stateless: every call looks only at the reading it is given.
//! There is no history, hysteresis or suppression of repeats.

use embedded_hal_async::delay::DelayNs;
use log::warn;

use crate::config::Thresholds;
use crate::display::CharacterDisplay;
use crate::sensors::Reading;

const MAX_ALERTS: usize = 2;

/// Alerts raised for a single reading, in evaluation order
pub type Alerts = heapless::Vec<Alert, MAX_ALERTS>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    /// pH below the minimum or above the maximum
    PhOutOfRange,
    /// Turbidity above the maximum
    HighTurbidity,
}

impl Alert {
    /// Line written to the log when the alert fires
    pub const fn log_message(self) -> &'static str {
        match self {
            Self::PhOutOfRange => "Warning: pH out of range!",
            Self::HighTurbidity => "Warning: High Turbidity!",
        }
    }

    /// Text shown on the display while the alert is held
    pub const fn display_message(self) -> &'static str {
        match self {
            Self::PhOutOfRange => "pH Alert!",
            Self::HighTurbidity => "Turbidity Alert!",
        }
    }
}

pub struct AlertEvaluator<'c> {
    thresholds: &'c Thresholds,
    hold_ms: u32,
}

impl<'c> AlertEvaluator<'c> {
    pub fn new(thresholds: &'c Thresholds, hold_ms: u32) -> Self {
        Self {
            thresholds,
            hold_ms,
        }
    }

    /// Which alerts a reading triggers, without side effects
    pub fn check(&self, reading: &Reading) -> Alerts {
        [
            (self.thresholds.ph_out_of_range(reading.ph), Alert::PhOutOfRange),
            (
                self.thresholds.turbidity_too_high(reading.turbidity),
                Alert::HighTurbidity,
            ),
        ]
        .into_iter()
        .filter_map(|(hit, alert)| hit.then_some(alert))
        .collect()
    }

    /// Raise every triggered alert in turn.
    ///
    /// Each one is logged, replaces the display contents, and is held on
    /// screen for the configured duration before the next is shown.
    pub async fn evaluate<D, W>(&self, reading: &Reading, display: &mut D, delay: &mut W) -> Alerts
    where
        D: CharacterDisplay,
        W: DelayNs,
    {
        let alerts = self.check(reading);
        for alert in &alerts {
            warn!("{}", alert.log_message());
            let shown = display
                .clear()
                .and_then(|()| display.print(alert.display_message()));
            if let Err(e) = shown {
                warn!("Could not show alert on display: {}", e);
            }
            delay.delay_ms(self.hold_ms).await;
        }
        alerts
    }
}
