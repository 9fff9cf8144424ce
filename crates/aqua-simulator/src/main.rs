//! Desktop simulator for the aqua-rs water-quality station.
//!
//! Runs the real `aqua_core::Station` against host stand-ins for every port:
//!
//! | Port             | Stand-in                                              |
//! |------------------|-------------------------------------------------------|
//! | `AnalogSource`   | Slowly drifting synthetic ADC counts                  |
//! | `CharacterDisplay` | `GraphicsCharacterDisplay` on a `SimulatorDisplay`  |
//! | `NetworkLink`    | Comes up after `--connect-polls` polls; drops after startup with `--offline` |
//! | `HttpTransport`  | Loopback stream answering `200 OK`                    |
//!
//! The last frame is written to `--frame` as a PNG, or every frame when
//! running without `--ticks`. Build with `--features window` to watch the
//! display live in an SDL window.

use std::cell::Cell;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{OutputSettings, OutputSettingsBuilder, SimulatorDisplay};
use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{ErrorType, Read, Write};
use log::{debug, error, info};

use aqua_core::config::DEFAULT_ENDPOINT;
use aqua_core::uplink::http;
use aqua_core::{
    AnalogSource, Endpoint, GraphicsCharacterDisplay, HttpResponse, HttpTransport, InternetConfig,
    NetworkLink, SensorChannel, SensorError, Station, StationConfig, UplinkError,
};

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

const DISPLAY_WIDTH_PX: u32 = 320;
const DISPLAY_HEIGHT_PX: u32 = 240;

/// Pixel scale factor for exported frames and the SDL window.
const WINDOW_SCALE: u32 = 2;

/// Offset of a typical gravity pH probe, so synthetic readings land near pH 7.
const PROBE_PH_OFFSET: f32 = 21.34;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "aqua-simulator", about = "Run the water-quality station on the desktop")]
struct Args {
    /// Number of ticks to run; runs until interrupted when omitted
    #[arg(long)]
    ticks: Option<u32>,

    /// Divide every station delay by this factor
    #[arg(long, default_value_t = 100)]
    speedup: u32,

    /// Link polls that fail before the link comes up
    #[arg(long, default_value_t = 2)]
    connect_polls: u32,

    /// Bring the link up for startup, then report it down for every send
    #[arg(long)]
    offline: bool,

    /// Raise threshold alerts after each tick
    #[arg(long)]
    alerts: bool,

    /// Simulate a station without the optional temperature probe
    #[arg(long)]
    no_temperature: bool,

    /// Endpoint URL the readings are framed for
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Where to write the final display frame
    #[arg(long, default_value = "aqua-frame.png")]
    frame: PathBuf,
}

// ---------------------------------------------------------------------------
// Port stand-ins
// ---------------------------------------------------------------------------

/// Generates ADC counts that wander through and past the alert thresholds.
struct SyntheticAdc {
    tick: u32,
}

impl SyntheticAdc {
    fn new() -> Self {
        Self { tick: 0 }
    }

    fn wave(&self, center: f64, amplitude: f64, period: f64) -> u16 {
        let t = self.tick as f64;
        (center + amplitude * (t / period).sin() + 0.1 * amplitude * (t / 3.7).cos())
            .clamp(0.0, 1023.0) as u16
    }
}

impl AnalogSource for SyntheticAdc {
    async fn sample(&mut self, channel: SensorChannel) -> Result<u16, SensorError> {
        let raw = match channel {
            // pH first in every tick, so it advances the clock.
            SensorChannel::Ph => {
                self.tick += 1;
                // Swings across pH 6.5..8.5 with PROBE_PH_OFFSET
                self.wave(496.0, 50.0, 12.0)
            }
            SensorChannel::Turbidity => self.wave(350.0, 250.0, 20.0),
            SensorChannel::Temperature => self.wave(150.0, 20.0, 40.0),
        };
        debug!("ADC {} -> {}", channel, raw);
        Ok(raw)
    }
}

struct SimLink {
    polls_left: Cell<u32>,
    offline: bool,
    started: Cell<bool>,
}

impl NetworkLink for SimLink {
    fn is_connected(&self) -> bool {
        if self.started.get() {
            return !self.offline;
        }
        match self.polls_left.get() {
            0 => {
                self.started.set(true);
                true
            }
            n => {
                self.polls_left.set(n - 1);
                false
            }
        }
    }
}

/// In-memory stream: captures the request and replays a fixed response.
struct LoopbackStream {
    request: Vec<u8>,
    reply: &'static [u8],
    read_pos: usize,
}

impl ErrorType for LoopbackStream {
    type Error = Infallible;
}

impl Read for LoopbackStream {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        let n = buf.len().min(self.reply.len() - self.read_pos);
        buf[..n].copy_from_slice(&self.reply[self.read_pos..self.read_pos + n]);
        self.read_pos += n;
        Ok(n)
    }
}

impl Write for LoopbackStream {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
        self.request.extend_from_slice(buf);
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

const LOOPBACK_REPLY: &[u8] =
    b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 8\r\n\r\naccepted";

struct LoopbackTransport {
    buffer: [u8; 512],
}

impl HttpTransport for LoopbackTransport {
    async fn post(
        &mut self,
        endpoint: &Endpoint<'_>,
        content_type: &str,
        body: &[u8],
    ) -> Result<HttpResponse, UplinkError> {
        let mut stream = LoopbackStream {
            request: Vec::new(),
            reply: LOOPBACK_REPLY,
            read_pos: 0,
        };
        let response = http::exchange(&mut stream, endpoint, content_type, body, &mut self.buffer).await;
        info!("POST {}:{}{}", endpoint.host, endpoint.port, endpoint.path);
        debug!("{}", String::from_utf8_lossy(&stream.request));
        response
    }
}

/// Real sleeps, shortened by the speedup factor.
struct SimDelay {
    speedup: u32,
}

impl DelayNs for SimDelay {
    async fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns / self.speedup.max(1))));
    }

    async fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)) / self.speedup.max(1));
    }
}

// ---------------------------------------------------------------------------
// Frame output
// ---------------------------------------------------------------------------

type Panel = SimulatorDisplay<Rgb565>;

fn output_settings() -> OutputSettings {
    OutputSettingsBuilder::new().scale(WINDOW_SCALE).build()
}

fn save_frame(panel: &Panel, path: &Path) {
    match panel.to_rgb_output_image(&output_settings()).save_png(path) {
        Ok(()) => info!("Wrote display frame to {}", path.display()),
        Err(e) => error!("Could not write {}: {}", path.display(), e),
    }
}

#[cfg(feature = "window")]
struct FrameSink {
    window: embedded_graphics_simulator::Window,
}

#[cfg(feature = "window")]
impl FrameSink {
    fn new() -> Self {
        Self {
            window: embedded_graphics_simulator::Window::new("Aqua Simulator", &output_settings()),
        }
    }

    /// Push the frame to the window. Returns false once the window is closed.
    fn show(&mut self, panel: &Panel) -> bool {
        self.window.update(panel);
        !self
            .window
            .events()
            .any(|e| matches!(e, embedded_graphics_simulator::SimulatorEvent::Quit))
    }
}

#[cfg(not(feature = "window"))]
struct FrameSink;

#[cfg(not(feature = "window"))]
impl FrameSink {
    fn new() -> Self {
        Self
    }

    fn show(&mut self, _panel: &Panel) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Station driver
// ---------------------------------------------------------------------------

type SimStation<'c> = Station<
    'c,
    SyntheticAdc,
    GraphicsCharacterDisplay<Panel>,
    SimLink,
    LoopbackTransport,
    SimDelay,
>;

/// Start the station and tick it, handing each finished frame to `on_frame`.
///
/// Stops after `ticks` ticks, or never when `None`, or as soon as `on_frame`
/// returns false. Returns the number of ticks run.
async fn drive(
    station: &mut SimStation<'_>,
    ticks: Option<u32>,
    mut on_frame: impl FnMut(&Panel) -> bool,
) -> u32 {
    let attempts = station.start().await;
    info!("Link up after {} failed polls", attempts);

    let limit = ticks.unwrap_or(u32::MAX);
    let alerts_enabled = station.config().alerts_enabled;
    let mut ran = 0;
    while ran < limit {
        ran += 1;
        match station.tick().await {
            Some(report) => {
                info!("Tick {}: {:?}", ran, report.outcome);
                if alerts_enabled {
                    let alerts = station.raise_alerts(&report.reading).await;
                    if !alerts.is_empty() {
                        info!("Tick {}: alerts {:?}", ran, alerts.as_slice());
                    }
                }
            }
            None => info!("Tick {}: skipped", ran),
        }

        if !on_frame(station.presenter_mut().display_mut().target()) {
            break;
        }
        if ran < limit {
            station.idle().await;
        }
    }
    ran
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut config = StationConfig::new(
        InternetConfig {
            ssid: "simulator",
            password: "",
        },
        &args.endpoint,
    );
    config.calibration.ph_offset = PROBE_PH_OFFSET;
    config.temperature_sensor_present = !args.no_temperature;
    config.alerts_enabled = args.alerts;

    info!("Starting aqua-rs simulator");
    info!(
        "Display: {}×{} (scale {}×), speedup {}×",
        DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX, WINDOW_SCALE, args.speedup
    );

    let panel = Panel::new(Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX));
    let link = SimLink {
        polls_left: Cell::new(args.connect_polls),
        offline: args.offline,
        started: Cell::new(false),
    };

    let mut station = match Station::new(
        &config,
        SyntheticAdc::new(),
        GraphicsCharacterDisplay::new(panel),
        link,
        LoopbackTransport { buffer: [0; 512] },
        SimDelay {
            speedup: args.speedup,
        },
    ) {
        Ok(station) => station,
        Err(e) => {
            error!("Cannot start station: {}", e);
            return;
        }
    };

    let mut sink = FrameSink::new();
    let ran = embassy_futures::block_on(drive(&mut station, args.ticks, |panel| {
        let open = sink.show(panel);
        if args.ticks.is_none() {
            save_frame(panel, &args.frame);
        }
        open
    }));
    info!("Ran {} ticks", ran);

    let panel = station.presenter_mut().display_mut().target();
    save_frame(panel, &args.frame);
    info!("Simulator exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embedded_graphics::primitives::PointsIter;

    fn station<'c>(config: &'c StationConfig<'c>) -> SimStation<'c> {
        Station::new(
            config,
            SyntheticAdc::new(),
            GraphicsCharacterDisplay::new(Panel::new(Size::new(
                DISPLAY_WIDTH_PX,
                DISPLAY_HEIGHT_PX,
            ))),
            SimLink {
                polls_left: Cell::new(0),
                offline: false,
                started: Cell::new(false),
            },
            LoopbackTransport { buffer: [0; 512] },
            SimDelay { speedup: 100_000 },
        )
        .unwrap()
    }

    #[test]
    fn test_unbounded_run_shows_frames_until_closed() {
        let config = StationConfig::default();
        let mut station = station(&config);
        let mut frames = 0;

        let ran = block_on(drive(&mut station, None, |_| {
            frames += 1;
            frames < 3
        }));

        assert_eq!(ran, 3);
        assert_eq!(frames, 3);
    }

    #[test]
    fn test_bounded_run_shows_every_tick() {
        let config = StationConfig::default();
        let mut station = station(&config);
        let mut lit_frames = 0;

        let ran = block_on(drive(&mut station, Some(2), |panel| {
            if panel.bounding_box().points().any(|p| panel.get_pixel(p) != Rgb565::BLACK) {
                lit_frames += 1;
            }
            true
        }));

        assert_eq!(ran, 2);
        assert_eq!(lit_frames, 2);
    }
}
