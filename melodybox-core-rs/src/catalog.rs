//! Static melody table.
//!
//! Melodies are written as raw frequency tables (Hz, `0` = rest) and
//! converted to [`Note`]s at compile time. Raw values outside
//! `(0, MAX_TONE_HZ]` become [`Note::Rest`].

use crate::config::MAX_TONE_HZ;

/// One step of a melody.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Note {
    /// A square-wave tone at the given frequency in Hz.
    Tone(u32),
    /// Silence for one step.
    Rest,
}

impl Note {
    /// Convert a raw catalog value into a note.
    ///
    /// `0`, negative values and values above [`MAX_TONE_HZ`] are rests.
    ///
    /// ```
    /// use melodybox::Note;
    ///
    /// assert_eq!(Note::from_hz(660), Note::Tone(660));
    /// assert_eq!(Note::from_hz(0), Note::Rest);
    /// assert_eq!(Note::from_hz(25_000), Note::Rest);
    /// ```
    pub const fn from_hz(hz: i32) -> Self {
        if hz <= 0 || hz as u32 > MAX_TONE_HZ {
            Note::Rest
        } else {
            Note::Tone(hz as u32)
        }
    }

    /// Frequency to drive the buzzer at, or `None` if this step is silent.
    ///
    /// A `Tone` built by hand with an out-of-range frequency is silent too.
    pub fn frequency(self) -> Option<u32> {
        match self {
            Note::Tone(hz) if hz > 0 && hz <= MAX_TONE_HZ => Some(hz),
            _ => None,
        }
    }
}

/// A named note sequence played at a fixed step length.
#[derive(Debug)]
pub struct Melody {
    /// Name shown on the player screen (truncated to 16 columns).
    pub name: &'static str,
    /// Notes in playback order.
    pub notes: &'static [Note],
    /// Delay between consecutive notes in milliseconds.
    pub tempo_ms: u32,
}

const fn to_notes<const N: usize>(raw: [i32; N]) -> [Note; N] {
    let mut notes = [Note::Rest; N];
    let mut i = 0;
    while i < N {
        notes[i] = Note::from_hz(raw[i]);
        i += 1;
    }
    notes
}

const MARIO_RAW: [i32; 46] = [
    660, 660, 0, 660, 0, 510, 660, 0, 770, 0, 0, 0, 380, 0, 0, 0, //
    510, 0, 0, 380, 0, 0, 320, 0, 0, 440, 0, 480, 0, 450, 430, 0, //
    380, 660, 760, 860, 0, 700, 760, 0, 660, 0, 520, 580, 480, 0,
];

const TWINKLE_RAW: [i32; 48] = [
    262, 262, 392, 392, 440, 440, 392, 0, 349, 349, 330, 330, 294, 294, 262, 0, //
    392, 392, 349, 349, 330, 330, 294, 0, 392, 392, 349, 349, 330, 330, 294, 0, //
    262, 262, 392, 392, 440, 440, 392, 0, 349, 349, 330, 330, 294, 294, 262, 0,
];

const JINGLE_RAW: [i32; 32] = [
    330, 330, 330, 0, 330, 330, 330, 0, 330, 392, 262, 294, 330, 0, 0, 0, //
    349, 349, 349, 349, 349, 330, 330, 330, 330, 294, 294, 330, 294, 0, 392, 0,
];

static MARIO: [Note; MARIO_RAW.len()] = to_notes(MARIO_RAW);
static TWINKLE: [Note; TWINKLE_RAW.len()] = to_notes(TWINKLE_RAW);
static JINGLE: [Note; JINGLE_RAW.len()] = to_notes(JINGLE_RAW);

/// Number of melodies in [`MELODIES`].
pub const MELODY_COUNT: usize = 3;

/// The melody catalog, indexed by the "Select Melody" menu position.
pub static MELODIES: [Melody; MELODY_COUNT] = [
    Melody {
        name: "Mario",
        notes: &MARIO,
        tempo_ms: 150,
    },
    Melody {
        name: "Twinkle",
        notes: &TWINKLE,
        tempo_ms: 600,
    },
    Melody {
        name: "Jingle",
        notes: &JINGLE,
        tempo_ms: 250,
    },
];

/// Look up a melody by catalog index.
pub fn melody(index: usize) -> Option<&'static Melody> {
    MELODIES.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_frequencies_are_rests() {
        assert_eq!(Note::from_hz(-1), Note::Rest);
        assert_eq!(Note::from_hz(20_001), Note::Rest);
        assert_eq!(Note::from_hz(20_000), Note::Tone(20_000));
        assert_eq!(Note::Tone(30_000).frequency(), None);
        assert_eq!(Note::Tone(0).frequency(), None);
        assert_eq!(Note::Rest.frequency(), None);
    }

    #[test]
    fn catalog_order_matches_menu() {
        let names: [&str; MELODY_COUNT] = [MELODIES[0].name, MELODIES[1].name, MELODIES[2].name];
        assert_eq!(names, ["Mario", "Twinkle", "Jingle"]);
        assert!(melody(3).is_none());
    }

    #[test]
    fn mario_opens_on_660() {
        let mario = melody(0).unwrap();
        assert_eq!(mario.notes[0], Note::Tone(660));
        assert_eq!(mario.notes[2], Note::Rest);
        assert_eq!(mario.tempo_ms, 150);
    }

    #[test]
    fn every_melody_is_playable() {
        for m in &MELODIES {
            assert!(!m.notes.is_empty(), "{} has no notes", m.name);
            assert!(m.name.len() <= 16);
            assert!(m.tempo_ms > 0);
        }
    }
}
