//! HD44780 instruction set and PCF8574 backpack wiring.
//!
//! The backpack drives the controller in 4-bit mode. Every byte written to
//! the PCF8574 sets all eight expander pins at once:
//!
//! ```text
//!   P7  P6  P5  P4  P3  P2  P1  P0
//!   D7  D6  D5  D4  BL  EN  RW  RS
//! ```

// ---------------------------------------------------------------------------
// Expander pins
// ---------------------------------------------------------------------------

/// Register select: high for data, low for instructions.
pub const PIN_RS: u8 = 0x01;

/// Read/write select. Always low; the driver never reads.
pub const PIN_RW: u8 = 0x02;

/// Enable strobe. Data is latched on the falling edge.
pub const PIN_EN: u8 = 0x04;

/// Backlight transistor.
pub const PIN_BACKLIGHT: u8 = 0x08;

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

pub const CLEAR_DISPLAY: u8 = 0x01;
pub const ENTRY_MODE_SET: u8 = 0x04;
pub const DISPLAY_CONTROL: u8 = 0x08;
pub const FUNCTION_SET: u8 = 0x20;
pub const SET_CGRAM_ADDR: u8 = 0x40;
pub const SET_DDRAM_ADDR: u8 = 0x80;

// Entry mode flags
pub const ENTRY_INCREMENT: u8 = 0x02;

// Display control flags
pub const DISPLAY_ON: u8 = 0x04;

// Function set flags
pub const TWO_LINES: u8 = 0x08;

/// Nibble sent three times to force 8-bit mode from any state.
pub const INIT_8BIT: u8 = 0x03;

/// Nibble that switches the controller into 4-bit mode.
pub const INIT_4BIT: u8 = 0x02;

// ---------------------------------------------------------------------------
// Geometry and timing
// ---------------------------------------------------------------------------

/// DDRAM address of the first column of each row.
pub const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// Number of CGRAM glyph slots.
pub const GLYPH_SLOTS: u8 = 8;

/// Power-on settling time before the first instruction.
pub const POWER_ON_DELAY_MS: u32 = 50;

/// Wait after each of the first two `INIT_8BIT` nibbles.
pub const INIT_DELAY_US: u32 = 4_500;

/// Execution time of an ordinary instruction or data write.
pub const EXEC_DELAY_US: u32 = 50;

/// Execution time of `CLEAR_DISPLAY`.
pub const CLEAR_DELAY_US: u32 = 2_000;
