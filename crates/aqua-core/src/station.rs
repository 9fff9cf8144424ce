//! The station loop
//!
//! A single cooperative loop: sample, render, transmit, wait. All waiting goes
//! through the [`DelayNs`] port so the loop yields to the executor instead of
//! spinning.

use embedded_hal_async::delay::DelayNs;
use log::{error, info};

use crate::alerts::{AlertEvaluator, Alerts};
use crate::config::StationConfig;
use crate::display::{CharacterDisplay, Presenter};
use crate::error::UplinkError;
use crate::sensors::{AnalogSource, Reading, SensorReader};
use crate::uplink::{HttpTransport, NetworkLink, SendOutcome, Uplink};

/// Result of one completed tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub reading: Reading,
    pub outcome: SendOutcome,
}

pub struct Station<'c, A, D, L, T, W> {
    config: &'c StationConfig<'c>,
    reader: SensorReader<'c, A>,
    presenter: Presenter<D>,
    uplink: Uplink<'c, L, T>,
    alerts: AlertEvaluator<'c>,
    delay: W,
}

impl<'c, A, D, L, T, W> Station<'c, A, D, L, T, W>
where
    A: AnalogSource,
    D: CharacterDisplay,
    L: NetworkLink,
    T: HttpTransport,
    W: DelayNs,
{
    /// Wire the components together. Fails only on an unusable endpoint URL.
    pub fn new(
        config: &'c StationConfig<'c>,
        source: A,
        display: D,
        link: L,
        transport: T,
        delay: W,
    ) -> Result<Self, UplinkError> {
        Ok(Self {
            config,
            reader: SensorReader::new(source, &config.calibration, config.temperature_sensor_present),
            presenter: Presenter::new(display),
            uplink: Uplink::new(link, transport, config.endpoint)?,
            alerts: AlertEvaluator::new(&config.thresholds, config.timing.alert_hold_ms),
            delay,
        })
    }

    /// Block until the link is up, then show the startup banner.
    ///
    /// There is no timeout. Returns the number of failed polls.
    pub async fn start(&mut self) -> u32 {
        let mut attempts = 0;
        while !self.uplink.link().is_connected() {
            info!("Connecting to WiFi...");
            attempts += 1;
            self.delay.delay_ms(self.config.timing.connect_retry_ms).await;
        }
        info!("Connected to WiFi");

        self.presenter.splash();
        self.delay.delay_ms(self.config.timing.splash_ms).await;
        self.presenter.clear();

        attempts
    }

    /// Sample, render and transmit one reading.
    ///
    /// Returns `None` when a sensor read failed; the tick is then skipped
    /// entirely and nothing is rendered or sent.
    pub async fn tick(&mut self) -> Option<TickReport> {
        let reading = match self.reader.read().await {
            Ok(reading) => reading,
            Err(e) => {
                error!("Skipping tick: {}", e);
                return None;
            }
        };
        info!("{}", reading);

        self.presenter.render(&reading);
        let outcome = self.uplink.send(&reading).await;

        Some(TickReport { reading, outcome })
    }

    /// Check a reading against the thresholds and show any alerts.
    ///
    /// Not part of [`Self::tick`]; whoever drives the loop decides whether to call it.
    pub async fn raise_alerts(&mut self, reading: &Reading) -> Alerts {
        self.alerts
            .evaluate(reading, self.presenter.display_mut(), &mut self.delay)
            .await
    }

    /// Wait out the fixed inter-tick interval.
    pub async fn idle(&mut self) {
        self.delay.delay_ms(self.config.timing.tick_interval_ms).await;
    }

    /// Run forever. Alerts are raised after each tick only when
    /// [`StationConfig::alerts_enabled`] is set.
    pub async fn run(&mut self) -> ! {
        loop {
            if let Some(report) = self.tick().await {
                if self.config.alerts_enabled {
                    self.raise_alerts(&report.reading).await;
                }
            }
            self.idle().await;
        }
    }

    pub fn config(&self) -> &'c StationConfig<'c> {
        self.config
    }

    pub fn presenter_mut(&mut self) -> &mut Presenter<D> {
        &mut self.presenter
    }

    pub fn uplink(&self) -> &Uplink<'c, L, T> {
        &self.uplink
    }

    pub fn delay(&self) -> &W {
        &self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::Alert;
    use crate::sensors::SensorChannel;
    use crate::test_support::{
        DisplayOp, FakeAdc, FakeLink, FakeTransport, RecordingDelay, RecordingDisplay,
    };
    use alloc::vec;
    use embassy_futures::block_on;

    type TestStation<'c> =
        Station<'c, FakeAdc, RecordingDisplay, FakeLink, FakeTransport, RecordingDelay>;

    fn station<'c>(config: &'c StationConfig<'c>, adc: FakeAdc, link: FakeLink) -> TestStation<'c> {
        Station::new(
            config,
            adc,
            RecordingDisplay::default(),
            link,
            FakeTransport::replying(200),
            RecordingDelay::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_start_polls_until_connected() {
        let config = StationConfig::default();
        let mut station = station(&config, FakeAdc::new(0, 0, 0), FakeLink::connected_after(3));

        let attempts = block_on(station.start());

        assert_eq!(attempts, 3);
        assert_eq!(station.delay().waits_ms, vec![1000, 1000, 1000, 2000]);
        assert_eq!(
            station.presenter_mut().display_mut().ops,
            vec![
                DisplayOp::Clear,
                DisplayOp::Cursor(0, 0),
                DisplayOp::Print("Water Quality".into()),
                DisplayOp::Clear,
            ]
        );
    }

    #[test]
    fn test_tick_renders_then_sends() {
        let config = StationConfig::default();
        let mut station = station(&config, FakeAdc::new(512, 100, 614), FakeLink::connected());

        let report = block_on(station.tick()).unwrap();

        assert_eq!(report.outcome, SendOutcome::Delivered { status: 200 });
        assert!((report.reading.ph - -10.764).abs() < 1e-3);
        assert!((report.reading.turbidity - 0.978).abs() < 1e-3);
        assert!((report.reading.temperature.unwrap() - 250.098).abs() < 1e-3);

        let ops = &station.presenter_mut().display_mut().ops;
        assert_eq!(ops[1], DisplayOp::Print("pH: -10.76      ".into()));
        assert_eq!(ops[3], DisplayOp::Print("Turbidity: 0.98 ".into()));

        let posts = &station.uplink().transport().posts;
        assert_eq!(posts.len(), 1);
        assert!(posts[0].body.starts_with(r#"{"ph":-10.76"#));
    }

    #[test]
    fn test_tick_does_not_raise_alerts() {
        let config = StationConfig::default();
        let mut station = station(&config, FakeAdc::new(512, 1000, 0), FakeLink::connected());

        block_on(station.tick()).unwrap();

        assert!(station.delay().waits_ms.is_empty());
        assert!(!station
            .presenter_mut()
            .display_mut()
            .ops
            .contains(&DisplayOp::Clear));
    }

    #[test]
    fn test_disconnected_tick_still_renders() {
        let config = StationConfig::default();
        let mut station = station(&config, FakeAdc::new(512, 100, 614), FakeLink::disconnected());

        let report = block_on(station.tick()).unwrap();

        assert_eq!(report.outcome, SendOutcome::Disconnected);
        assert_eq!(station.presenter_mut().display_mut().ops.len(), 4);
        assert!(station.uplink().transport().posts.is_empty());
    }

    #[test]
    fn test_sensor_failure_skips_tick() {
        let config = StationConfig::default();
        let adc = FakeAdc::new(512, 100, 614).failing_on(SensorChannel::Ph);
        let mut station = station(&config, adc, FakeLink::connected());

        assert_eq!(block_on(station.tick()), None);
        assert!(station.presenter_mut().display_mut().ops.is_empty());
        assert!(station.uplink().transport().posts.is_empty());
    }

    #[test]
    fn test_raise_alerts_uses_station_display_and_delay() {
        let config = StationConfig::default();
        let mut station = station(&config, FakeAdc::new(0, 0, 0), FakeLink::connected());
        let reading = Reading {
            ph: 3.5,
            turbidity: 0.0,
            temperature: None,
        };

        let alerts = block_on(station.raise_alerts(&reading));

        assert_eq!(alerts.as_slice(), &[Alert::PhOutOfRange]);
        assert_eq!(station.delay().waits_ms, vec![2000]);
        assert_eq!(
            station.presenter_mut().display_mut().ops,
            vec![DisplayOp::Clear, DisplayOp::Print("pH Alert!".into())]
        );
    }

    #[test]
    fn test_idle_waits_tick_interval() {
        let mut config = StationConfig::default();
        config.timing.tick_interval_ms = 250;
        let mut station = station(&config, FakeAdc::new(0, 0, 0), FakeLink::connected());

        block_on(station.idle());

        assert_eq!(station.delay().waits_ms, vec![250]);
    }
}
