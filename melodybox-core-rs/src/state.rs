//! The shared application record and its single-writer ports.
//!
//! [`AppState`] is a plain struct of atomics, meant to live in a `static`
//! and be read from every task through `&AppState`. Writes go through three
//! port types, one per execution context:
//!
//! | Port             | Writes                                                  |
//! |------------------|---------------------------------------------------------|
//! | [`InputPort`]    | volume, intent, session, melody, stop option, menu view |
//! | [`PlaybackPort`] | note index, note session, completed session             |
//! | [`BlinkPort`]    | paused blink flag                                       |
//!
//! [`AppState::split`] hands the ports out exactly once.
//!
//! # Derived status
//!
//! Both the input context (Start, Pause, Resume, Stop) and the playback
//! context (end of melody) move the player between states, but each cell has
//! one writer. The status is therefore computed rather than stored:
//!
//! - the input context writes the *intent* and bumps the *session* counter
//!   on every Start;
//! - the playback context records the *completed session* when a melody
//!   runs out of notes.
//!
//! `status()` is `Stopped` if the intent is `Stopped` or the current session
//! has completed, and the intent otherwise. The note index, the stop option
//! and the display mode are derived from the status the same way, so
//! `Stopped ⇒ note_index = 0 ∧ Normal ∧ no stop option` holds at every read.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use crate::catalog::{self, Melody};
use crate::menu::MenuId;
use crate::volume::Volume;

/// Where the player is in its `Stopped → Playing ⇄ Paused → Stopped` cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PlaybackStatus {
    Stopped = 0,
    Playing = 1,
    Paused = 2,
}

impl PlaybackStatus {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => PlaybackStatus::Playing,
            2 => PlaybackStatus::Paused,
            _ => PlaybackStatus::Stopped,
        }
    }
}

/// Which player screen is shown while a melody is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    /// Volume readout and bar.
    Normal,
    /// Melody name and the blinking "Paused" indicator.
    Paused,
    /// Melody name and the "> Stop" option.
    ShowStopOption,
}

/// The single shared record.
///
/// All fields are private atomics; see the module docs for who writes what.
///
/// ```
/// use melodybox::{AppState, PlaybackStatus};
///
/// static STATE: AppState = AppState::new();
///
/// let ports = STATE.split().unwrap();
/// assert!(STATE.split().is_none());
///
/// ports.input.start(0);
/// assert_eq!(STATE.status(), PlaybackStatus::Playing);
/// assert_eq!(STATE.current_melody().map(|m| m.name), Some("Mario"));
/// ```
pub struct AppState {
    // ── Input context ────────────────────────────────────────────────
    volume: AtomicU8,
    intent: AtomicU8,
    session: AtomicU32,
    melody: AtomicU8,
    show_stop_option: AtomicBool,
    menu: AtomicU8,
    selected_item: AtomicU8,

    // ── Playback context ─────────────────────────────────────────────
    note_index: AtomicU32,
    note_session: AtomicU32,
    completed_session: AtomicU32,

    // ── Blink context ────────────────────────────────────────────────
    paused_blink: AtomicBool,

    split: AtomicBool,
}

impl AppState {
    /// Power-on state: default volume, stopped, Main menu.
    pub const fn new() -> Self {
        Self {
            volume: AtomicU8::new(Volume::DEFAULT.level()),
            intent: AtomicU8::new(PlaybackStatus::Stopped as u8),
            session: AtomicU32::new(0),
            melody: AtomicU8::new(0),
            show_stop_option: AtomicBool::new(false),
            menu: AtomicU8::new(MenuId::Main as u8),
            selected_item: AtomicU8::new(0),
            note_index: AtomicU32::new(0),
            note_session: AtomicU32::new(0),
            completed_session: AtomicU32::new(0),
            paused_blink: AtomicBool::new(false),
            split: AtomicBool::new(false),
        }
    }

    /// Hand out the three write ports. Returns `None` on every call after
    /// the first.
    pub fn split(&self) -> Option<Ports<'_>> {
        if self.split.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(Ports {
            input: InputPort { state: self },
            playback: PlaybackPort { state: self },
            blink: BlinkPort { state: self },
        })
    }

    // ── Readers ──────────────────────────────────────────────────────

    /// Current output volume.
    pub fn volume(&self) -> Volume {
        Volume::new(self.volume.load(Ordering::Acquire))
    }

    /// Current playback status, derived from the intent and the session
    /// bookkeeping.
    pub fn status(&self) -> PlaybackStatus {
        let intent = PlaybackStatus::from_u8(self.intent.load(Ordering::Acquire));
        if intent == PlaybackStatus::Stopped
            || self.completed_session.load(Ordering::Acquire) == self.session()
        {
            PlaybackStatus::Stopped
        } else {
            intent
        }
    }

    /// Counter bumped by every Start. Identifies one playback run.
    pub fn session(&self) -> u32 {
        self.session.load(Ordering::Acquire)
    }

    /// Catalog index of the most recently started melody.
    pub fn current_melody_index(&self) -> usize {
        usize::from(self.melody.load(Ordering::Acquire))
    }

    /// The active melody, or `None` when stopped.
    pub fn current_melody(&self) -> Option<&'static Melody> {
        if self.status() == PlaybackStatus::Stopped {
            return None;
        }
        catalog::melody(self.current_melody_index())
    }

    /// Index of the next note of the active session; `0` when stopped or
    /// before the playback context has picked up the session.
    pub fn note_index(&self) -> usize {
        if self.status() == PlaybackStatus::Stopped
            || self.note_session.load(Ordering::Acquire) != self.session()
        {
            return 0;
        }
        self.note_index.load(Ordering::Acquire) as usize
    }

    /// Whether the "> Stop" option is shown. Always `false` when stopped.
    pub fn show_stop_option(&self) -> bool {
        self.status() != PlaybackStatus::Stopped && self.show_stop_option.load(Ordering::Acquire)
    }

    /// Screen variant implied by the status and the stop option.
    pub fn display_mode(&self) -> DisplayMode {
        match self.status() {
            PlaybackStatus::Paused => DisplayMode::Paused,
            PlaybackStatus::Playing if self.show_stop_option() => DisplayMode::ShowStopOption,
            _ => DisplayMode::Normal,
        }
    }

    /// Menu on top of the navigation stack, as last published by the input
    /// context.
    pub fn menu(&self) -> MenuId {
        MenuId::from_u8(self.menu.load(Ordering::Acquire))
    }

    /// Highlighted item of [`menu`](Self::menu).
    pub fn selected_item(&self) -> u8 {
        self.selected_item.load(Ordering::Acquire)
    }

    /// Whether the blinking "Paused" label is currently visible.
    pub fn paused_blink(&self) -> bool {
        self.paused_blink.load(Ordering::Acquire)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// The three write ports returned by [`AppState::split`].
pub struct Ports<'a> {
    pub input: InputPort<'a>,
    pub playback: PlaybackPort<'a>,
    pub blink: BlinkPort<'a>,
}

// ── Input port ───────────────────────────────────────────────────────────

/// Write access for the input context.
pub struct InputPort<'a> {
    state: &'a AppState,
}

impl<'a> InputPort<'a> {
    /// The shared state this port writes to.
    pub fn state(&self) -> &'a AppState {
        self.state
    }

    /// Store a new volume. Takes effect from the next note.
    pub fn set_volume(&self, volume: Volume) {
        self.state.volume.store(volume.level(), Ordering::Release);
    }

    /// Start melody `index` in a fresh session and return the session id.
    ///
    /// Any melody already playing is superseded; the playback context
    /// notices the new session at its next step.
    pub fn start(&self, index: usize) -> u32 {
        let s = self.state;
        s.melody.store(index as u8, Ordering::Release);
        s.show_stop_option.store(false, Ordering::Release);
        let session = s.session().wrapping_add(1);
        s.session.store(session, Ordering::Release);
        s.intent.store(PlaybackStatus::Playing as u8, Ordering::Release);
        session
    }

    /// Playing → Paused. Returns `false` if nothing was playing.
    pub fn pause(&self) -> bool {
        if self.state.status() != PlaybackStatus::Playing {
            return false;
        }
        self.state.intent.store(PlaybackStatus::Paused as u8, Ordering::Release);
        true
    }

    /// Paused → Playing. Returns `false` if nothing was paused.
    pub fn resume(&self) -> bool {
        if self.state.status() != PlaybackStatus::Paused {
            return false;
        }
        self.state.intent.store(PlaybackStatus::Playing as u8, Ordering::Release);
        true
    }

    /// Stop the active session. Returns `false` if already stopped.
    pub fn stop(&self) -> bool {
        let was_active = self.state.status() != PlaybackStatus::Stopped;
        self.state.intent.store(PlaybackStatus::Stopped as u8, Ordering::Release);
        self.state.show_stop_option.store(false, Ordering::Release);
        was_active
    }

    /// Show or hide the "> Stop" option on the player screen.
    pub fn set_show_stop_option(&self, show: bool) {
        self.state.show_stop_option.store(show, Ordering::Release);
    }

    /// Publish the navigator's top menu and selection for other readers.
    pub fn publish_menu(&self, menu: MenuId, selected: u8) {
        self.state.menu.store(menu as u8, Ordering::Release);
        self.state.selected_item.store(selected, Ordering::Release);
    }
}

// ── Playback port ────────────────────────────────────────────────────────

/// Write access for the playback context.
pub struct PlaybackPort<'a> {
    state: &'a AppState,
}

impl<'a> PlaybackPort<'a> {
    /// The shared state this port writes to.
    pub fn state(&self) -> &'a AppState {
        self.state
    }

    /// Claim `session` and rewind the note index.
    pub fn begin(&self, session: u32) {
        self.state.note_index.store(0, Ordering::Release);
        self.state.note_session.store(session, Ordering::Release);
    }

    /// Record the index of the next note to play.
    pub fn set_note_index(&self, index: usize) {
        self.state.note_index.store(index as u32, Ordering::Release);
    }

    /// Mark `session` as played to the end. The status reads `Stopped` from
    /// here on unless a newer session has already started.
    pub fn finish(&self, session: u32) {
        self.state.note_index.store(0, Ordering::Release);
        self.state.completed_session.store(session, Ordering::Release);
    }

    /// Rewind after an aborted session.
    pub fn reset(&self) {
        self.state.note_index.store(0, Ordering::Release);
    }
}

// ── Blink port ───────────────────────────────────────────────────────────

/// Write access for the blink context.
pub struct BlinkPort<'a> {
    state: &'a AppState,
}

impl<'a> BlinkPort<'a> {
    /// The shared state this port writes to.
    pub fn state(&self) -> &'a AppState {
        self.state
    }

    /// Flip the paused indicator and return its new value.
    pub fn toggle(&self) -> bool {
        let next = !self.state.paused_blink();
        self.state.paused_blink.store(next, Ordering::Release);
        next
    }
}
