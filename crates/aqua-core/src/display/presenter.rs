use core::fmt::Write;

use log::warn;

use super::{COLUMNS, CharacterDisplay};
use crate::sensors::Reading;

/// Banner shown while the station starts up
pub const SPLASH_TEXT: &str = "Water Quality";

const LINE_CAPACITY: usize = 32;
const TEMPERATURE_COLUMN: u8 = 8;

type Line = heapless::String<LINE_CAPACITY>;

/// Writes readings onto the character display.
///
/// Display failures are logged and swallowed; the station keeps sampling and
/// transmitting even with a dead screen.
pub struct Presenter<D> {
    display: D,
}

impl<D: CharacterDisplay> Presenter<D> {
    pub fn new(display: D) -> Self {
        Self { display }
    }

    /// Overwrite the two fixed lines in place: pH on row 0, turbidity on row 1.
    ///
    /// Each line is padded to the full width so a shorter value erases the
    /// tail of the previous one.
    pub fn render(&mut self, reading: &Reading) {
        self.write_at(0, 0, &value_line("pH: ", reading.ph));
        self.write_at(0, 1, &value_line("Turbidity: ", reading.turbidity));
    }

    /// Clear, redraw both lines, then add the temperature on row 1.
    pub fn render_full(&mut self, reading: &Reading) {
        self.clear();
        self.render(reading);

        let mut line = Line::new();
        // Overflow only drops characters the display could not show anyway.
        let _ = match reading.temperature {
            Some(t) => write!(line, "Temp: {:.2}", t),
            None => write!(line, "Temp: --"),
        };
        self.write_at(TEMPERATURE_COLUMN, 1, &line);
    }

    pub fn splash(&mut self) {
        self.clear();
        self.write_at(0, 0, SPLASH_TEXT);
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.display.clear() {
            warn!("Display clear failed: {}", e);
        }
    }

    /// Direct access for collaborators that draw their own messages
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    fn write_at(&mut self, col: u8, row: u8, text: &str) {
        let result = self
            .display
            .set_cursor(col, row)
            .and_then(|()| self.display.print(text));
        if let Err(e) = result {
            warn!("Display update failed: {}", e);
        }
    }
}

fn value_line(label: &str, value: f32) -> Line {
    let mut line = Line::new();
    let _ = write!(line, "{}{:.2}", label, value);
    while line.len() < COLUMNS as usize {
        let _ = line.push(' ');
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{DisplayOp, RecordingDisplay};
    use alloc::format;
    use alloc::vec;

    fn padded(text: &str) -> DisplayOp {
        DisplayOp::Print(format!("{:<16}", text))
    }

    fn reading(temperature: Option<f32>) -> Reading {
        Reading {
            ph: 7.126,
            turbidity: 0.9775,
            temperature,
        }
    }

    #[test]
    fn test_render_writes_two_fixed_lines() {
        let mut presenter = Presenter::new(RecordingDisplay::default());
        presenter.render(&reading(Some(21.0)));

        assert_eq!(
            presenter.display_mut().ops,
            vec![
                DisplayOp::Cursor(0, 0),
                padded("pH: 7.13"),
                DisplayOp::Cursor(0, 1),
                padded("Turbidity: 0.98"),
            ]
        );
    }

    #[test]
    fn test_shorter_value_overwrites_previous_line() {
        let mut presenter = Presenter::new(RecordingDisplay::default());
        let wide = Reading {
            ph: -10.764,
            turbidity: 12.5,
            temperature: None,
        };
        presenter.render(&wide);
        presenter.render(&reading(None));

        let ops = &presenter.display_mut().ops;
        assert_eq!(ops[1], padded("pH: -10.76"));
        assert_eq!(ops[5], DisplayOp::Print("pH: 7.13        ".into()));
        assert_eq!(ops[7], DisplayOp::Print("Turbidity: 0.98 ".into()));
    }

    #[test]
    fn test_render_full_clears_and_adds_temperature() {
        let mut presenter = Presenter::new(RecordingDisplay::default());
        presenter.render_full(&reading(Some(-20.0)));

        let ops = &presenter.display_mut().ops;
        assert_eq!(ops.first(), Some(&DisplayOp::Clear));
        assert_eq!(
            &ops[ops.len() - 2..],
            &[
                DisplayOp::Cursor(8, 1),
                DisplayOp::Print("Temp: -20.00".into())
            ]
        );
    }

    #[test]
    fn test_render_full_without_temperature_sensor() {
        let mut presenter = Presenter::new(RecordingDisplay::default());
        presenter.render_full(&reading(None));

        assert_eq!(
            presenter.display_mut().ops.last(),
            Some(&DisplayOp::Print("Temp: --".into()))
        );
    }

    #[test]
    fn test_splash() {
        let mut presenter = Presenter::new(RecordingDisplay::default());
        presenter.splash();

        assert_eq!(
            presenter.display_mut().ops,
            vec![
                DisplayOp::Clear,
                DisplayOp::Cursor(0, 0),
                DisplayOp::Print(SPLASH_TEXT.into()),
            ]
        );
    }

    #[test]
    fn test_display_failure_is_swallowed() {
        let mut presenter = Presenter::new(RecordingDisplay::failing());
        presenter.render_full(&reading(Some(10.0)));
        assert!(presenter.display_mut().ops.is_empty());
    }
}
