//! Playback and navigation core for the melodybox.
//!
//! The device plays short melodies on a piezo buzzer, shows a two-level menu
//! and a player screen on a 16×2 character LCD and reads five push buttons.
//! This crate holds everything that is not a hardware wrapper:
//!
//! - [`catalog`]: the static melody table.
//! - [`state`]: [`AppState`], the single shared record, and the write
//!   ports that give each execution context exclusive fields.
//! - [`menu`]: menu topology and the navigation stack.
//! - [`playback`]: the note stepping engine driving an [`AudioOutput`].
//! - [`blink`]: the periodic "Paused" indicator toggler.
//! - [`input`]: button polling, debounce and command routing.
//! - [`render`]: pure functions turning state into a [`Frame`].
//! - [`store`]: persisted settings (volume) and a NOR-flash log store.
//!
//! # Execution contexts
//!
//! ```text
//!   input task ──── InputPort ────┐
//!   playback task ─ PlaybackPort ─┼──► AppState (atomics, no locks)
//!   blink task ──── BlinkPort ────┘
//!        │               │               │
//!        └────── Frame ──┴───── Frame ───┴──► FrameSink (LCD task)
//! ```
//!
//! Every field of [`AppState`] has exactly one writer. The ports are handed
//! out once by [`AppState::split`], so the rule is checked by the compiler
//! rather than by a runtime lock. Readers may observe fields from slightly
//! different instants; every consumer re-polls within 100 ms.
//!
//! # Crate features
//!
//! - **`defmt`**: `defmt::Format` derives and log statements.
//! - **`task`**: async run loops built on `embassy-time`, and
//!   [`render::DisplayChannel`], a signal-based [`FrameSink`].

#![cfg_attr(not(test), no_std)]

pub mod blink;
pub mod catalog;
pub mod config;
pub mod error;
pub mod input;
pub mod menu;
pub mod playback;
pub mod render;
pub mod state;
pub mod store;
pub mod volume;

pub use blink::BlinkIndicator;
pub use catalog::{Melody, Note, MELODIES};
pub use error::{OutputError, StoreError};
pub use input::{Button, ButtonPad, Command, InputDispatcher, Response};
pub use menu::{Direction, MenuAction, MenuId, Navigator};
pub use playback::{AudioOutput, PlaybackEngine, Step};
pub use render::{Frame, FrameSink, PlayerHint};
pub use state::{AppState, BlinkPort, DisplayMode, InputPort, PlaybackPort, PlaybackStatus, Ports};
pub use store::{FlashStore, SettingKey, SettingsStore};
pub use volume::Volume;
