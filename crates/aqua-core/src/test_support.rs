//! Fakes for the hardware ports, shared by the unit tests

use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use embedded_hal_async::delay::DelayNs;

use crate::display::CharacterDisplay;
use crate::error::{DisplayError, SensorError, UplinkError};
use crate::sensors::{AnalogSource, SensorChannel};
use crate::uplink::{Endpoint, HttpResponse, HttpTransport, NetworkLink};

/// ADC returning fixed raw values and recording which channels were sampled
pub struct FakeAdc {
    ph: u16,
    turbidity: u16,
    temperature: u16,
    fail_on: Option<SensorChannel>,
    calls: RefCell<Vec<SensorChannel>>,
}

impl FakeAdc {
    pub fn new(ph: u16, turbidity: u16, temperature: u16) -> Self {
        Self {
            ph,
            turbidity,
            temperature,
            fail_on: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, channel: SensorChannel) -> Self {
        self.fail_on = Some(channel);
        self
    }

    pub fn calls(&self) -> Vec<SensorChannel> {
        self.calls.borrow().clone()
    }
}

impl AnalogSource for FakeAdc {
    async fn sample(&mut self, channel: SensorChannel) -> Result<u16, SensorError> {
        self.calls.borrow_mut().push(channel);
        if self.fail_on == Some(channel) {
            return Err(SensorError::ReadFailed {
                channel,
                details: "injected failure",
            });
        }
        Ok(match channel {
            SensorChannel::Ph => self.ph,
            SensorChannel::Turbidity => self.turbidity,
            SensorChannel::Temperature => self.temperature,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    Clear,
    Cursor(u8, u8),
    Print(String),
}

/// Character display that records every operation
#[derive(Default)]
pub struct RecordingDisplay {
    pub ops: Vec<DisplayOp>,
    pub fail: bool,
}

impl RecordingDisplay {
    pub fn failing() -> Self {
        Self {
            ops: Vec::new(),
            fail: true,
        }
    }

    fn record(&mut self, op: DisplayOp) -> Result<(), DisplayError> {
        if self.fail {
            return Err(DisplayError::DrawFailed);
        }
        self.ops.push(op);
        Ok(())
    }
}

impl CharacterDisplay for RecordingDisplay {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.record(DisplayOp::Clear)
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        self.record(DisplayOp::Cursor(col, row))
    }

    fn print(&mut self, text: &str) -> Result<(), DisplayError> {
        self.record(DisplayOp::Print(text.into()))
    }
}

/// Link that reports connected after a number of failed polls
pub struct FakeLink {
    polls_until_connected: Cell<u32>,
    pub polls: Cell<u32>,
}

impl FakeLink {
    pub fn connected() -> Self {
        Self::connected_after(0)
    }

    pub fn disconnected() -> Self {
        Self::connected_after(u32::MAX)
    }

    pub fn connected_after(polls: u32) -> Self {
        Self {
            polls_until_connected: Cell::new(polls),
            polls: Cell::new(0),
        }
    }
}

impl NetworkLink for FakeLink {
    fn is_connected(&self) -> bool {
        self.polls.set(self.polls.get() + 1);
        match self.polls_until_connected.get() {
            0 => true,
            u32::MAX => false,
            n => {
                self.polls_until_connected.set(n - 1);
                false
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPost {
    pub host: String,
    pub path: String,
    pub content_type: String,
    pub body: String,
}

/// Transport that records requests and replies with a scripted result
pub struct FakeTransport {
    pub posts: Vec<RecordedPost>,
    reply: Result<u16, UplinkError>,
}

impl FakeTransport {
    pub fn replying(status: u16) -> Self {
        Self {
            posts: Vec::new(),
            reply: Ok(status),
        }
    }

    pub fn failing(err: UplinkError) -> Self {
        Self {
            posts: Vec::new(),
            reply: Err(err),
        }
    }
}

impl HttpTransport for FakeTransport {
    async fn post(
        &mut self,
        endpoint: &Endpoint<'_>,
        content_type: &str,
        body: &[u8],
    ) -> Result<HttpResponse, UplinkError> {
        self.posts.push(RecordedPost {
            host: endpoint.host.into(),
            path: endpoint.path.into(),
            content_type: content_type.into(),
            body: String::from_utf8_lossy(body).into_owned(),
        });
        self.reply.map(|status| HttpResponse {
            status,
            body: "ok".into(),
        })
    }
}

/// Delay that returns immediately and records the requested durations
#[derive(Default)]
pub struct RecordingDelay {
    pub waits_ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.waits_ms.push(ns / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}

/// Per-thread capture of `log` records, so parallel tests see only their own
pub mod logs {
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use log::{Level, LevelFilter, Log, Metadata, Record};

    struct CaptureLogger;

    static LOGGER: CaptureLogger = CaptureLogger;

    std::thread_local! {
        static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
    }

    impl Log for CaptureLogger {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            RECORDS.with(|records| {
                records
                    .borrow_mut()
                    .push((record.level(), record.args().to_string()))
            });
        }

        fn flush(&self) {}
    }

    /// Install the capturing logger and forget anything this thread logged so far.
    pub fn capture() {
        // Only the first test to get here installs it; the rest reuse it.
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
        RECORDS.with(|records| records.borrow_mut().clear());
    }

    /// Records logged on this thread since [`capture`]
    pub fn take() -> Vec<(Level, String)> {
        RECORDS.with(|records| core::mem::take(&mut *records.borrow_mut()))
    }
}
