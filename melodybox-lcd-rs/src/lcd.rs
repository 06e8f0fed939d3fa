//! High-level character LCD interface.
//!
//! [`CharLcd`] wraps [`Pcf8574Bus`] with the HD44780 init sequence, cursor
//! addressing, glyph upload and whole-frame writes.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use melodybox::render::{Frame, COLS, ROWS, VOLUME_GLYPHS};

use crate::commands::{
    CLEAR_DELAY_US, CLEAR_DISPLAY, DISPLAY_CONTROL, DISPLAY_ON, ENTRY_INCREMENT, ENTRY_MODE_SET,
    FUNCTION_SET, GLYPH_SLOTS, INIT_4BIT, INIT_8BIT, INIT_DELAY_US, POWER_ON_DELAY_MS,
    ROW_OFFSETS, SET_CGRAM_ADDR, SET_DDRAM_ADDR, TWO_LINES,
};
use crate::driver::{Mode, Pcf8574Bus};
use crate::error::LcdError;

/// Display geometry and bus address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LcdConfig {
    /// 7-bit I2C address of the PCF8574 backpack.
    pub address: u8,
    /// Characters per row.
    pub columns: u8,
    /// Number of rows.
    pub rows: u8,
}

impl Default for LcdConfig {
    /// The 1602 module with a PCF8574T backpack: address 0x27, 16×2.
    fn default() -> Self {
        Self {
            address: 0x27,
            columns: COLS as u8,
            rows: ROWS as u8,
        }
    }
}

/// Async HD44780 character LCD on a PCF8574 backpack.
///
/// # Lifecycle
///
/// 1. [`CharLcd::new()`]: no I2C traffic.
/// 2. [`CharLcd::init()`]: 4-bit init sequence, clears the screen and turns
///    the backlight on.
/// 3. [`CharLcd::load_volume_glyphs()`]: upload the bar glyphs.
/// 4. [`CharLcd::show_frame()`] for every new screen.
///
/// # Example
///
/// ```no_run
/// use melodybox_lcd_rs::{CharLcd, LcdConfig};
///
/// # async fn example(
/// #     i2c: impl embedded_hal_async::i2c::I2c,
/// #     delay: impl embedded_hal_async::delay::DelayNs,
/// # ) {
/// let mut lcd = CharLcd::new(i2c, delay, LcdConfig::default());
/// lcd.init().await.unwrap();
/// lcd.write_text(0, 0, "Hello").await.unwrap();
/// # }
/// ```
pub struct CharLcd<I2C, D> {
    bus: Pcf8574Bus<I2C, D>,
    config: LcdConfig,
}

impl<I2C, D> CharLcd<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Create a driver. No I2C traffic is generated.
    pub fn new(i2c: I2C, delay: D, config: LcdConfig) -> Self {
        Self {
            bus: Pcf8574Bus::new(i2c, delay, config.address),
            config,
        }
    }

    /// Geometry and address this driver was built with.
    pub fn config(&self) -> &LcdConfig {
        &self.config
    }

    /// Run the HD44780 4-bit initialisation sequence.
    ///
    /// The controller may power up in 8-bit mode or halfway through a
    /// 4-bit transfer; three `0x3` nibbles resynchronise it before `0x2`
    /// selects 4-bit mode.
    pub async fn init(&mut self) -> Result<(), LcdError<I2C::Error>> {
        self.bus.delay_ms(POWER_ON_DELAY_MS).await;

        self.bus.write_nibble(INIT_8BIT, Mode::Command).await?;
        self.bus.delay_us(INIT_DELAY_US).await;
        self.bus.write_nibble(INIT_8BIT, Mode::Command).await?;
        self.bus.delay_us(INIT_DELAY_US).await;
        self.bus.write_nibble(INIT_8BIT, Mode::Command).await?;
        self.bus.write_nibble(INIT_4BIT, Mode::Command).await?;

        let lines = if self.config.rows > 1 { TWO_LINES } else { 0 };
        self.bus.command(FUNCTION_SET | lines).await?;
        self.bus.command(DISPLAY_CONTROL | DISPLAY_ON).await?;
        self.clear().await?;
        self.bus.command(ENTRY_MODE_SET | ENTRY_INCREMENT).await?;
        self.bus.set_backlight(true).await?;

        #[cfg(feature = "defmt")]
        defmt::info!("LCD initialised at {=u8:#x}", self.config.address);

        Ok(())
    }

    /// Blank the screen and home the cursor.
    pub async fn clear(&mut self) -> Result<(), LcdError<I2C::Error>> {
        self.bus.command(CLEAR_DISPLAY).await?;
        self.bus.delay_us(CLEAR_DELAY_US).await;
        Ok(())
    }

    /// Move the DDRAM cursor to `(col, row)`.
    ///
    /// # Errors
    /// * [`LcdError::OutOfBounds`] if the position is off screen
    pub async fn move_cursor(&mut self, col: u8, row: u8) -> Result<(), LcdError<I2C::Error>> {
        if col >= self.config.columns || row >= self.config.rows {
            return Err(LcdError::OutOfBounds);
        }
        let offset = ROW_OFFSETS[usize::from(row) % ROW_OFFSETS.len()];
        self.bus.command(SET_DDRAM_ADDR | (offset + col)).await
    }

    /// Write raw character codes from `(col, row)`, truncated at the right
    /// edge.
    pub async fn write_bytes(
        &mut self,
        col: u8,
        row: u8,
        bytes: &[u8],
    ) -> Result<(), LcdError<I2C::Error>> {
        self.move_cursor(col, row).await?;
        let room = usize::from(self.config.columns - col);
        for &byte in bytes.iter().take(room) {
            self.bus.data(byte).await?;
        }
        Ok(())
    }

    /// Write ASCII text from `(col, row)`. Other characters become `?`.
    pub async fn write_text(
        &mut self,
        col: u8,
        row: u8,
        text: &str,
    ) -> Result<(), LcdError<I2C::Error>> {
        self.move_cursor(col, row).await?;
        let room = usize::from(self.config.columns - col);
        for ch in text.chars().take(room) {
            let byte = if ch.is_ascii() { ch as u8 } else { b'?' };
            self.bus.data(byte).await?;
        }
        Ok(())
    }

    /// Store a 5×8 glyph in CGRAM `slot` (0–7). Only the low five bits of
    /// each row are used. The cursor is left at `(0, 0)`.
    ///
    /// # Errors
    /// * [`LcdError::InvalidGlyphSlot`] if `slot >= 8`
    pub async fn define_glyph(
        &mut self,
        slot: u8,
        pattern: [u8; 8],
    ) -> Result<(), LcdError<I2C::Error>> {
        if slot >= GLYPH_SLOTS {
            return Err(LcdError::InvalidGlyphSlot);
        }
        self.bus.command(SET_CGRAM_ADDR | (slot << 3)).await?;
        for row in pattern {
            self.bus.data(row & 0x1F).await?;
        }
        self.move_cursor(0, 0).await
    }

    /// Upload the six volume bar glyphs to slots 0–5.
    pub async fn load_volume_glyphs(&mut self) -> Result<(), LcdError<I2C::Error>> {
        for (slot, pattern) in VOLUME_GLYPHS.iter().enumerate() {
            self.define_glyph(slot as u8, *pattern).await?;
        }
        Ok(())
    }

    /// Switch the backlight without touching the screen contents.
    pub async fn backlight(&mut self, on: bool) -> Result<(), LcdError<I2C::Error>> {
        self.bus.set_backlight(on).await
    }

    /// Last backlight state written.
    pub fn is_backlight_on(&self) -> bool {
        self.bus.backlight()
    }

    /// Overwrite the whole screen with `frame`. No clear is issued, so the
    /// update does not flicker.
    pub async fn show_frame(&mut self, frame: &Frame) -> Result<(), LcdError<I2C::Error>> {
        let rows = usize::from(self.config.rows).min(ROWS);
        for row in 0..rows {
            self.write_bytes(0, row as u8, frame.line(row)).await?;
        }
        Ok(())
    }

    /// Release the I2C peripheral and delay source.
    pub fn release(self) -> (I2C, D) {
        self.bus.release()
    }
}
