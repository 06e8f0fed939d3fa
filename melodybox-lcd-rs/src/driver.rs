//! Low-level PCF8574 nibble writer.
//!
//! The HD44780 sees a 4-bit bus behind the expander: each byte goes out as
//! two nibbles, each latched by an enable pulse. [`Pcf8574Bus`] owns the
//! I2C peripheral and the delay source and keeps the backlight bit set on
//! every write so the backlight does not flicker.
//!
//! Consumers normally use [`CharLcd`](crate::CharLcd) instead.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::commands::{EXEC_DELAY_US, PIN_BACKLIGHT, PIN_EN, PIN_RS};
use crate::error::LcdError;

/// Whether a byte is an instruction or display data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Command,
    Data,
}

impl Mode {
    fn rs_bit(self) -> u8 {
        match self {
            Mode::Command => 0,
            Mode::Data => PIN_RS,
        }
    }
}

/// 4-bit HD44780 bus behind a PCF8574 I/O expander.
pub struct Pcf8574Bus<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    backlight: bool,
}

impl<I2C, D> Pcf8574Bus<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Create a bus handle. No I2C traffic is generated.
    ///
    /// # Arguments
    /// * `i2c`: I2C peripheral (takes ownership for exclusive access)
    /// * `delay`: delay source for enable pulses and execution times
    /// * `address`: 7-bit expander address (typically 0x27 or 0x3F)
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            backlight: true,
        }
    }

    /// Whether the backlight bit is set on writes.
    pub fn backlight(&self) -> bool {
        self.backlight
    }

    fn backlight_bit(&self) -> u8 {
        if self.backlight {
            PIN_BACKLIGHT
        } else {
            0
        }
    }

    /// Switch the backlight, writing the expander immediately.
    pub async fn set_backlight(&mut self, on: bool) -> Result<(), LcdError<I2C::Error>> {
        self.backlight = on;
        self.i2c.write(self.address, &[self.backlight_bit()]).await?;
        Ok(())
    }

    /// Strobe one nibble (low four bits of `nibble`).
    ///
    /// Used on its own only during the init sequence, before the controller
    /// is in 4-bit mode.
    pub async fn write_nibble(
        &mut self,
        nibble: u8,
        mode: Mode,
    ) -> Result<(), LcdError<I2C::Error>> {
        let bits = (nibble << 4) | mode.rs_bit() | self.backlight_bit();
        self.i2c.write(self.address, &[bits | PIN_EN, bits]).await?;
        self.delay.delay_us(EXEC_DELAY_US).await;
        Ok(())
    }

    /// Send a full byte as two nibbles in one I2C transaction.
    pub async fn write_byte(&mut self, byte: u8, mode: Mode) -> Result<(), LcdError<I2C::Error>> {
        let base = mode.rs_bit() | self.backlight_bit();
        let high = (byte & 0xF0) | base;
        let low = (byte << 4) | base;
        self.i2c
            .write(self.address, &[high | PIN_EN, high, low | PIN_EN, low])
            .await?;
        self.delay.delay_us(EXEC_DELAY_US).await;
        Ok(())
    }

    /// Send an instruction byte (RS low).
    pub async fn command(&mut self, command: u8) -> Result<(), LcdError<I2C::Error>> {
        self.write_byte(command, Mode::Command).await
    }

    /// Send a data byte (RS high).
    pub async fn data(&mut self, byte: u8) -> Result<(), LcdError<I2C::Error>> {
        self.write_byte(byte, Mode::Data).await
    }

    /// Wait `us` microseconds on the bus's delay source.
    pub async fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us).await;
    }

    /// Wait `ms` milliseconds on the bus's delay source.
    pub async fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms).await;
    }

    /// Release the I2C peripheral and delay source.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}
