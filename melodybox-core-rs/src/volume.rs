//! Output volume: a level from 0 to 10 with its buzzer intensity,
//! percentage and bar width.

use crate::config::{DEFAULT_VOLUME, MAX_VOLUME};

/// Buzzer intensity (PWM duty on a 16-bit scale) for each volume level.
pub const INTENSITY_TABLE: [u16; MAX_VOLUME as usize + 1] = [
    1000, 2000, 3000, 4000, 5000, 6500, 8000, 10000, 13000, 17000, 20000,
];

/// Volume level in `[0, 10]`.
///
/// Every constructor and step clamps, so an out-of-range `Volume` cannot
/// exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Volume(u8);

impl Volume {
    /// Silent-most level.
    pub const MIN: Volume = Volume(0);
    /// Loudest level.
    pub const MAX: Volume = Volume(MAX_VOLUME);
    /// Level used at first boot and by "Reset Vol".
    pub const DEFAULT: Volume = Volume(DEFAULT_VOLUME);

    /// Clamp `level` into `[0, 10]`.
    pub const fn new(level: u8) -> Self {
        if level > Self::MAX.0 {
            Self::MAX
        } else {
            Volume(level)
        }
    }

    /// Validate a persisted value. Returns `None` if it is out of range.
    pub fn from_stored(raw: i32) -> Option<Self> {
        u8::try_from(raw)
            .ok()
            .filter(|&level| level <= Self::MAX.0)
            .map(Volume)
    }

    /// Raw level in `[0, 10]`.
    pub const fn level(self) -> u8 {
        self.0
    }

    /// One level louder; no-op at [`Volume::MAX`].
    pub fn step_up(self) -> Self {
        Self::new(self.0.saturating_add(1))
    }

    /// One level quieter; no-op at [`Volume::MIN`].
    pub fn step_down(self) -> Self {
        Volume(self.0.saturating_sub(1))
    }

    /// Buzzer intensity for this level, from [`INTENSITY_TABLE`].
    pub fn intensity(self) -> u16 {
        INTENSITY_TABLE[usize::from(self.0)]
    }

    /// Level as a percentage (`0..=100`).
    pub fn percent(self) -> u8 {
        self.0 * 10
    }

    /// Number of filled cells in a bar of `width` cells, rounded to nearest.
    pub fn bar_cells(self, width: usize) -> usize {
        let max = usize::from(MAX_VOLUME);
        (usize::from(self.0) * width + max / 2) / max
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_clamp_at_the_ends() {
        assert_eq!(Volume::MAX.step_up(), Volume::MAX);
        assert_eq!(Volume::MIN.step_down(), Volume::MIN);
        assert_eq!(Volume::new(4).step_up().level(), 5);
        assert_eq!(Volume::new(4).step_down().level(), 3);
    }

    #[test]
    fn new_clamps() {
        assert_eq!(Volume::new(200), Volume::MAX);
        assert_eq!(Volume::new(7).level(), 7);
    }

    #[test]
    fn every_step_sequence_stays_in_range() {
        let mut v = Volume::DEFAULT;
        for i in 0..64u32 {
            v = if (i / 7) % 2 == 0 { v.step_up() } else { v.step_down() };
            assert!(v.level() <= 10);
        }
    }

    #[test]
    fn from_stored_rejects_out_of_range() {
        assert_eq!(Volume::from_stored(0), Some(Volume::MIN));
        assert_eq!(Volume::from_stored(10), Some(Volume::MAX));
        assert_eq!(Volume::from_stored(11), None);
        assert_eq!(Volume::from_stored(-1), None);
        assert_eq!(Volume::from_stored(i32::MAX), None);
    }

    #[test]
    fn intensity_table_is_monotonic() {
        assert!(INTENSITY_TABLE.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(Volume::DEFAULT.intensity(), 6500);
        assert_eq!(Volume::MAX.intensity(), 20000);
    }

    #[test]
    fn bar_rounds_to_nearest_cell() {
        assert_eq!(Volume::new(0).bar_cells(16), 0);
        assert_eq!(Volume::new(1).bar_cells(16), 2); // 1.6
        assert_eq!(Volume::new(3).bar_cells(16), 5); // 4.8
        assert_eq!(Volume::new(5).bar_cells(16), 8);
        assert_eq!(Volume::new(7).bar_cells(16), 11); // 11.2
        assert_eq!(Volume::new(10).bar_cells(16), 16);
    }
}
