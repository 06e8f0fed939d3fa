//! Async driver for an HD44780 16×2 character LCD behind a PCF8574 I2C
//! backpack.
//!
//! [`CharLcd`] covers the controller: init sequence, cursor addressing,
//! text, custom glyphs, backlight and whole-[`Frame`] writes.
//! [`frame_flush_task`] (behind the `task` feature) drains the frames the
//! melodybox core posts to its display channel.
//!
//! # Quick Start
//!
//! ```ignore
//! use melodybox_lcd_rs::{frame_flush_task, CharLcd, LcdConfig};
//!
//! // In your Embassy main:
//! let lcd = CharLcd::new(i2c, embassy_time::Delay, LcdConfig::default());
//! spawner.spawn(lcd_task(lcd, &DISPLAY)).unwrap();
//!
//! // Thin task wrapper (Embassy tasks cannot be generic):
//! #[embassy_executor::task]
//! async fn lcd_task(lcd: CharLcd<MyI2c, Delay>, channel: &'static DisplayChannel) {
//!     frame_flush_task(lcd, channel).await;
//! }
//! ```
//!
//! # Crate Features
//!
//! - **`defmt`**: structured logging via [`defmt`](https://docs.rs/defmt).
//! - **`task`**: [`frame_flush_task`] and the core's `DisplayChannel`.
//!
//! [`Frame`]: melodybox::Frame

#![cfg_attr(not(test), no_std)]

pub mod commands;
#[cfg(feature = "task")]
pub mod display_task;
pub mod driver;
pub mod error;
pub mod lcd;

// ── Re-exports for convenience ───────────────────────────────────────────

#[cfg(feature = "task")]
pub use display_task::frame_flush_task;
pub use driver::Pcf8574Bus;
pub use error::LcdError;
pub use lcd::{CharLcd, LcdConfig};
