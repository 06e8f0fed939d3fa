//! Frame flush task.
//!
//! [`frame_flush_task`] waits on the two signals of a [`DisplayChannel`]
//! and pushes whatever arrives to the LCD.

use embassy_futures::select::{select, Either};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use melodybox::render::{DisplayChannel, Frame};

use crate::lcd::CharLcd;

/// Display update loop.
///
/// This is a regular `async fn`, **not** an Embassy `#[task]`. Callers
/// create a thin, concrete task wrapper, since Embassy tasks cannot be
/// generic:
///
/// ```ignore
/// #[embassy_executor::task]
/// async fn lcd_task(lcd: CharLcd<MyI2c, Delay>, channel: &'static DisplayChannel) {
///     frame_flush_task(lcd, channel).await;
/// }
/// ```
///
/// # Control flow
///
/// 1. Initialise the controller and upload the volume bar glyphs.
/// 2. Wait for either a new frame or a backlight change.
///    - **Frame**: skip it if identical to the last frame drawn, otherwise
///      write both lines.
///    - **Backlight**: switch the backlight. The screen contents are kept.
///
/// # Errors
///
/// * Initialisation failure: logs the error and **returns** (task exits).
/// * Write failure: logs the error and waits for the next frame. The failed
///   frame is not remembered, so an identical retry is drawn.
pub async fn frame_flush_task<I2C, D>(mut lcd: CharLcd<I2C, D>, channel: &'static DisplayChannel)
where
    I2C: I2c,
    D: DelayNs,
{
    // ── Initialisation ───────────────────────────────────────────────
    if let Err(_e) = lcd.init().await {
        #[cfg(feature = "defmt")]
        defmt::error!("LCD init failed: {}", defmt::Debug2Format(&_e));
        return;
    }
    if let Err(_e) = lcd.load_volume_glyphs().await {
        #[cfg(feature = "defmt")]
        defmt::error!("LCD glyph upload failed: {}", defmt::Debug2Format(&_e));
        return;
    }

    let mut last: Option<Frame> = None;

    // ── Main loop ────────────────────────────────────────────────────
    loop {
        match select(channel.frames.wait(), channel.backlight.wait()).await {
            Either::First(frame) => {
                if last == Some(frame) {
                    continue;
                }
                match lcd.show_frame(&frame).await {
                    Ok(()) => last = Some(frame),
                    Err(_e) => {
                        #[cfg(feature = "defmt")]
                        defmt::error!("LCD flush failed: {}", defmt::Debug2Format(&_e));
                        last = None;
                    }
                }
            }
            Either::Second(on) => {
                if let Err(_e) = lcd.backlight(on).await {
                    #[cfg(feature = "defmt")]
                    defmt::error!("LCD backlight failed: {}", defmt::Debug2Format(&_e));
                }
            }
        }
    }
}
