//! Timing and range constants shared by the execution contexts.

/// Minimum time between two accepted button presses, in milliseconds.
///
/// A button held down is accepted again every time the window elapses,
/// so holding Enter or Left/Right auto-repeats at this rate.
pub const DEBOUNCE_MS: u64 = 200;

/// Period of the input polling loop.
pub const INPUT_POLL_MS: u64 = 20;

/// Sleep between status checks while no melody is playing.
pub const IDLE_POLL_MS: u64 = 100;

/// Sleep between status checks while a melody is paused.
pub const PAUSE_POLL_MS: u64 = 50;

/// Period of the "Paused" indicator toggle.
pub const BLINK_PERIOD_MS: u64 = 500;

/// How long a transient message ("Volume Reset", ...) stays on screen.
pub const MESSAGE_HOLD_MS: u64 = 1000;

/// How long the boot splash stays on screen.
pub const SPLASH_MS: u64 = 1000;

/// Highest frequency the buzzer is asked to play; anything above is a rest.
pub const MAX_TONE_HZ: u32 = 20_000;

/// Volume level used at first boot, on a bad stored value and by "Reset Vol".
pub const DEFAULT_VOLUME: u8 = 5;

/// Loudest volume level; levels run from 0 to this value.
pub const MAX_VOLUME: u8 = 10;
