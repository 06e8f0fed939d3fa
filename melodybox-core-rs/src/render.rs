//! Pure frame builders for the 16×2 display.
//!
//! Nothing here talks to hardware: every function takes state and returns a
//! [`Frame`], which a [`FrameSink`] pushes to the LCD. Frames are always two
//! full 16-column lines padded with spaces.

use core::fmt::Write;

use heapless::String;

use crate::menu::MenuId;
use crate::state::{AppState, DisplayMode};
use crate::volume::Volume;

/// Display columns.
pub const COLS: usize = 16;
/// Display rows.
pub const ROWS: usize = 2;

/// Character code of an empty volume bar cell (CGRAM slot 0).
///
/// CGRAM slots 0–7 are also addressable as codes 0x08–0x0F; the high alias
/// keeps `0x00` out of the frame so lines stay printable.
pub const GLYPH_EMPTY: u8 = 0x08;
/// Character code of a full volume bar cell (CGRAM slot 5).
pub const GLYPH_FULL: u8 = 0x0D;

/// Custom glyphs uploaded to CGRAM slots 0–5 at boot: columns filled from
/// the left, 0 to 5 pixels wide.
pub const VOLUME_GLYPHS: [[u8; 8]; 6] = [
    [0x00; 8],
    [0x10; 8],
    [0x18; 8],
    [0x1C; 8],
    [0x1E; 8],
    [0x1F; 8],
];

/// One screenful of character codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    lines: [[u8; COLS]; ROWS],
}

impl Frame {
    /// A frame of spaces.
    pub const fn blank() -> Self {
        Self {
            lines: [[b' '; COLS]; ROWS],
        }
    }

    /// Raw character codes of `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= ROWS`.
    pub fn line(&self, row: usize) -> &[u8; COLS] {
        &self.lines[row]
    }

    /// `row` as text. Glyph cells come out as their control-code aliases.
    ///
    /// # Panics
    ///
    /// Panics if `row >= ROWS`.
    pub fn line_str(&self, row: usize) -> &str {
        core::str::from_utf8(&self.lines[row]).unwrap_or("")
    }

    /// Write `text` at `(col, row)`, truncated at the right edge. Non-ASCII
    /// characters are shown as `?`.
    pub fn put_text(&mut self, col: usize, row: usize, text: &str) {
        let Some(line) = self.lines.get_mut(row) else {
            return;
        };
        for (cell, ch) in line.iter_mut().skip(col).zip(text.chars()) {
            *cell = if ch.is_ascii() { ch as u8 } else { b'?' };
        }
    }

    /// Overwrite `row` with raw character codes.
    pub fn put_bytes(&mut self, row: usize, bytes: [u8; COLS]) {
        if let Some(line) = self.lines.get_mut(row) {
            *line = bytes;
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::blank()
    }
}

/// One-shot variation of the player screen requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayerHint {
    None,
    /// Playback just resumed: show the melody name over a blank line.
    Resumed,
}

/// Receives finished frames. Implemented by the display side.
pub trait FrameSink {
    /// Replace the screen contents.
    fn show(&self, frame: Frame);
    /// Switch the backlight.
    fn set_backlight(&self, on: bool);
}

// ── Frame builders ───────────────────────────────────────────────────────

/// Menu title over `">"` and the selected label.
pub fn menu_frame(menu: MenuId, selected: u8) -> Frame {
    let mut frame = Frame::blank();
    frame.put_text(0, 0, menu.definition().title);
    frame.put_text(0, 1, ">");
    frame.put_text(1, 1, menu.label(selected));
    frame
}

/// `"VOL: NNN%"` over a bar of [`GLYPH_FULL`] / [`GLYPH_EMPTY`] cells.
pub fn volume_frame(volume: Volume) -> Frame {
    let mut frame = Frame::blank();

    let mut header: String<COLS> = String::new();
    // Cannot overflow: "VOL: 100%" is 9 characters.
    let _ = write!(header, "VOL: {:3}%", volume.percent());
    frame.put_text(0, 0, &header);

    let filled = volume.bar_cells(COLS);
    let mut bar = [GLYPH_EMPTY; COLS];
    for cell in bar.iter_mut().take(filled) {
        *cell = GLYPH_FULL;
    }
    frame.put_bytes(1, bar);
    frame
}

/// Player screen for the active melody.
pub fn player_frame(state: &AppState, hint: PlayerHint) -> Frame {
    let name = state.current_melody().map(|m| m.name).unwrap_or("");
    let mut frame = Frame::blank();

    if hint == PlayerHint::Resumed {
        frame.put_text(0, 0, name);
        return frame;
    }

    match state.display_mode() {
        DisplayMode::Normal => return volume_frame(state.volume()),
        DisplayMode::Paused => {
            frame.put_text(0, 0, name);
            if state.paused_blink() {
                frame.put_text(0, 1, "Paused");
            }
        }
        DisplayMode::ShowStopOption => {
            frame.put_text(0, 0, name);
            frame.put_text(0, 1, "> Stop");
        }
    }
    frame
}

/// A transient message over a blank line.
pub fn message_frame(text: &str) -> Frame {
    let mut frame = Frame::blank();
    frame.put_text(0, 0, text);
    frame
}

/// Boot screen.
pub fn splash_frame() -> Frame {
    let mut frame = Frame::blank();
    frame.put_text(0, 0, "Audio Player");
    frame.put_text(0, 1, "Loading...");
    frame
}

/// Whatever the status says should be on screen: the player while a melody
/// is active, the published menu otherwise.
pub fn current_frame(state: &AppState) -> Frame {
    if state.current_melody().is_some() {
        player_frame(state, PlayerHint::None)
    } else {
        menu_frame(state.menu(), state.selected_item())
    }
}

// ── Signal-backed sink ───────────────────────────────────────────────────

/// A [`FrameSink`] that hands frames to the display task through two
/// latest-value signals. A frame posted before the previous one was drawn
/// replaces it.
#[cfg(feature = "task")]
pub struct DisplayChannel {
    pub frames: embassy_sync::signal::Signal<
        embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex,
        Frame,
    >,
    pub backlight: embassy_sync::signal::Signal<
        embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex,
        bool,
    >,
}

#[cfg(feature = "task")]
impl DisplayChannel {
    pub const fn new() -> Self {
        Self {
            frames: embassy_sync::signal::Signal::new(),
            backlight: embassy_sync::signal::Signal::new(),
        }
    }
}

#[cfg(feature = "task")]
impl Default for DisplayChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "task")]
impl FrameSink for DisplayChannel {
    fn show(&self, frame: Frame) {
        self.frames.signal(frame);
    }

    fn set_backlight(&self, on: bool) {
        self.backlight.signal(on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    fn fresh() -> &'static AppState {
        Box::leak(Box::new(AppState::new()))
    }

    #[test]
    fn menu_frame_layout() {
        let frame = menu_frame(MenuId::Melodies, 1);
        assert_eq!(frame.line_str(0), "Select Melody   ");
        assert_eq!(frame.line_str(1), ">1.2 Twinkle    ");
    }

    #[test]
    fn long_labels_are_truncated() {
        let frame = menu_frame(MenuId::Main, 0);
        assert_eq!(frame.line_str(1), ">1.Select Melody");
        let frame = message_frame("This message is far too long");
        assert_eq!(frame.line_str(0).len(), COLS);
        assert_eq!(frame.line_str(0), "This message is ");
    }

    #[test]
    fn writes_off_screen_are_dropped() {
        let mut frame = Frame::blank();
        frame.put_text(0, ROWS, "x");
        frame.put_bytes(ROWS, [b'y'; COLS]);
        assert_eq!(frame, Frame::blank());
    }

    #[test]
    #[should_panic]
    fn reading_past_last_row_panics() {
        let _ = Frame::blank().line(ROWS);
    }

    #[test]
    fn volume_frame_at_default() {
        let frame = volume_frame(Volume::DEFAULT);
        assert_eq!(frame.line_str(0), "VOL:  50%       ");
        let bar = frame.line(1);
        assert_eq!(bar.iter().filter(|&&c| c == GLYPH_FULL).count(), 8);
        assert!(bar[..8].iter().all(|&c| c == GLYPH_FULL));
        assert!(bar[8..].iter().all(|&c| c == GLYPH_EMPTY));
    }

    #[test]
    fn volume_frame_extremes() {
        let frame = volume_frame(Volume::MAX);
        assert_eq!(frame.line_str(0), "VOL: 100%       ");
        assert!(frame.line(1).iter().all(|&c| c == GLYPH_FULL));

        let frame = volume_frame(Volume::MIN);
        assert_eq!(frame.line_str(0), "VOL:   0%       ");
        assert!(frame.line(1).iter().all(|&c| c == GLYPH_EMPTY));
    }

    #[test]
    fn player_frames_follow_display_mode() {
        let state = fresh();
        let ports = state.split().unwrap();
        ports.input.start(0);

        assert_eq!(player_frame(state, PlayerHint::None), volume_frame(state.volume()));

        ports.input.set_show_stop_option(true);
        let frame = player_frame(state, PlayerHint::None);
        assert_eq!(frame.line_str(0), "Mario           ");
        assert_eq!(frame.line_str(1), "> Stop          ");

        ports.input.pause();
        let frame = player_frame(state, PlayerHint::None);
        assert_eq!(frame.line_str(1), "                ");
        ports.blink.toggle();
        let frame = player_frame(state, PlayerHint::None);
        assert_eq!(frame.line_str(1), "Paused          ");
    }

    #[test]
    fn resumed_hint_shows_name_only() {
        let state = fresh();
        let ports = state.split().unwrap();
        ports.input.start(2);
        let frame = player_frame(state, PlayerHint::Resumed);
        assert_eq!(frame.line_str(0), "Jingle          ");
        assert_eq!(frame.line_str(1), "                ");
    }

    #[test]
    fn current_frame_picks_menu_when_stopped() {
        let state = fresh();
        let ports = state.split().unwrap();
        ports.input.publish_menu(MenuId::Settings, 2);
        assert_eq!(current_frame(state), menu_frame(MenuId::Settings, 2));

        ports.input.start(0);
        assert_eq!(current_frame(state), volume_frame(state.volume()));
    }

    #[test]
    fn splash_text() {
        let frame = splash_frame();
        assert_eq!(frame.line_str(0), "Audio Player    ");
        assert_eq!(frame.line_str(1), "Loading...      ");
    }

    #[test]
    fn non_ascii_is_replaced() {
        let mut frame = Frame::blank();
        frame.put_text(0, 0, "Vol→5");
        assert_eq!(frame.line_str(0), "Vol?5           ");
        frame.put_text(0, 5, "ignored");
    }
}
