use embedded_graphics::{
    mono_font::{MonoTextStyle, MonoTextStyleBuilder, ascii::FONT_10X20},
    pixelcolor::Rgb565,
    prelude::*,
    text::{Baseline, Text},
};

use super::{COLUMNS, CharacterDisplay, DisplayError, ROWS};

const CHAR_WIDTH: i32 = 10;
const LINE_HEIGHT: i32 = 24;

/// Character grid rendered onto a pixel panel.
///
/// The 16x2 grid is centered on the target. Every print draws with an opaque
/// background so overwriting a cell erases what was there before, the same
/// way a real character LCD behaves.
pub struct GraphicsCharacterDisplay<D> {
    target: D,
    origin: Point,
    cursor: (u8, u8),
    style: MonoTextStyle<'static, Rgb565>,
    background: Rgb565,
}

impl<D> GraphicsCharacterDisplay<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    pub fn new(target: D) -> Self {
        Self::with_colors(target, Rgb565::WHITE, Rgb565::BLACK)
    }

    pub fn with_colors(target: D, foreground: Rgb565, background: Rgb565) -> Self {
        let grid = Size::new(
            (COLUMNS as i32 * CHAR_WIDTH) as u32,
            (ROWS as i32 * LINE_HEIGHT) as u32,
        );
        let bounds = target.bounding_box();
        let origin = bounds.top_left
            + Point::new(
                (bounds.size.width as i32 - grid.width as i32).max(0) / 2,
                (bounds.size.height as i32 - grid.height as i32).max(0) / 2,
            );

        let style = MonoTextStyleBuilder::new()
            .font(&FONT_10X20)
            .text_color(foreground)
            .background_color(background)
            .build();

        Self {
            target,
            origin,
            cursor: (0, 0),
            style,
            background,
        }
    }

    /// Current (column, row) of the cursor
    pub fn cursor(&self) -> (u8, u8) {
        self.cursor
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    fn cell_origin(&self, col: u8, row: u8) -> Point {
        self.origin + Point::new(col as i32 * CHAR_WIDTH, row as i32 * LINE_HEIGHT)
    }
}

impl<D> CharacterDisplay for GraphicsCharacterDisplay<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.target
            .clear(self.background)
            .map_err(|_| DisplayError::DrawFailed)?;
        self.cursor = (0, 0);
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        if col >= COLUMNS || row >= ROWS {
            return Err(DisplayError::CursorOutOfBounds { col, row });
        }
        self.cursor = (col, row);
        Ok(())
    }

    fn print(&mut self, text: &str) -> Result<(), DisplayError> {
        let (col, row) = self.cursor;
        let remaining = COLUMNS.saturating_sub(col) as usize;
        let end = text
            .char_indices()
            .nth(remaining)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        let visible = &text[..end];
        if visible.is_empty() {
            return Ok(());
        }

        Text::with_baseline(visible, self.cell_origin(col, row), self.style, Baseline::Top)
            .draw(&mut self.target)
            .map_err(|_| DisplayError::DrawFailed)?;

        self.cursor.0 = col + visible.chars().count() as u8;
        Ok(())
    }
}
