//! Error types for the LCD driver.

use core::fmt;

/// Errors that can occur while driving the LCD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LcdError<E> {
    /// Underlying I2C bus error.
    I2c(E),

    /// Cursor position outside the configured columns/rows.
    OutOfBounds,

    /// CGRAM slot index above 7.
    InvalidGlyphSlot,
}

// Allow `?` on raw I2C results.
impl<E> From<E> for LcdError<E> {
    fn from(error: E) -> Self {
        LcdError::I2c(error)
    }
}

impl<E: fmt::Debug> fmt::Display for LcdError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LcdError::I2c(e) => write!(f, "I2C error: {:?}", e),
            LcdError::OutOfBounds => write!(f, "Cursor position out of bounds"),
            LcdError::InvalidGlyphSlot => write!(f, "Invalid glyph slot (must be 0-7)"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for LcdError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            LcdError::I2c(e) => defmt::write!(f, "I2C error: {}", e),
            LcdError::OutOfBounds => defmt::write!(f, "Cursor out of bounds"),
            LcdError::InvalidGlyphSlot => defmt::write!(f, "Invalid glyph slot"),
        }
    }
}
