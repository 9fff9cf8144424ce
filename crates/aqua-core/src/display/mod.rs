//! Two-line character display
//!
//! The station only ever needs a small character LCD: clear it, move the
//! cursor, print text. [`CharacterDisplay`] is that port;
//! [`GraphicsCharacterDisplay`] emulates it on any embedded-graphics panel.

mod graphics;
mod presenter;

pub use graphics::*;
pub use presenter::*;

pub use crate::error::DisplayError;

/// Number of character columns on the display
pub const COLUMNS: u8 = 16;

/// Number of character rows on the display
pub const ROWS: u8 = 2;

/// Port for a character-cell display
pub trait CharacterDisplay {
    /// Blank the whole surface and home the cursor to (0, 0)
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Move the cursor to a zero-based column and row
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError>;

    /// Write text at the cursor and advance it. Characters past the last
    /// column are dropped.
    fn print(&mut self, text: &str) -> Result<(), DisplayError>;
}

impl<T: CharacterDisplay + ?Sized> CharacterDisplay for &mut T {
    fn clear(&mut self) -> Result<(), DisplayError> {
        (**self).clear()
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        (**self).set_cursor(col, row)
    }

    fn print(&mut self, text: &str) -> Result<(), DisplayError> {
        (**self).print(text)
    }
}
