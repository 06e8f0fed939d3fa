//! Blinking "Paused" indicator.

use crate::render::{self, FrameSink, PlayerHint};
use crate::state::{BlinkPort, PlaybackStatus};

/// Toggles the paused indicator every [`BLINK_PERIOD_MS`](crate::config::BLINK_PERIOD_MS)
/// while the player is paused and redraws the player screen.
pub struct BlinkIndicator<'a, F> {
    port: BlinkPort<'a>,
    sink: &'a F,
}

impl<'a, F: FrameSink> BlinkIndicator<'a, F> {
    /// Create the indicator. Nothing is drawn until the first tick.
    pub fn new(port: BlinkPort<'a>, sink: &'a F) -> Self {
        Self { port, sink }
    }

    /// One blink period. Returns `true` if the indicator was toggled.
    pub fn tick(&mut self) -> bool {
        let state = self.port.state();
        if state.status() != PlaybackStatus::Paused {
            return false;
        }
        self.port.toggle();
        self.sink.show(render::player_frame(state, PlayerHint::None));
        true
    }

    /// Tick every blink period forever.
    #[cfg(feature = "task")]
    pub async fn run(mut self) -> ! {
        let period = embassy_time::Duration::from_millis(crate::config::BLINK_PERIOD_MS);
        loop {
            embassy_time::Timer::after(period).await;
            self.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Frame;
    use crate::state::AppState;
    use core::cell::RefCell;

    #[derive(Default)]
    struct Screen {
        frames: RefCell<Vec<Frame>>,
    }

    impl FrameSink for Screen {
        fn show(&self, frame: Frame) {
            self.frames.borrow_mut().push(frame);
        }
        fn set_backlight(&self, _on: bool) {}
    }

    #[test]
    fn idle_unless_paused() {
        let state = Box::leak(Box::new(AppState::new()));
        let ports = state.split().unwrap();
        let screen = Screen::default();
        let mut blink = BlinkIndicator::new(ports.blink, &screen);

        assert!(!blink.tick());
        ports.input.start(0);
        assert!(!blink.tick());
        assert!(screen.frames.borrow().is_empty());
        assert!(!state.paused_blink());
    }

    #[test]
    fn alternates_while_paused() {
        let state = Box::leak(Box::new(AppState::new()));
        let ports = state.split().unwrap();
        let screen = Screen::default();
        let mut blink = BlinkIndicator::new(ports.blink, &screen);

        ports.input.start(1);
        ports.input.pause();

        assert!(blink.tick());
        assert!(blink.tick());
        let frames = screen.frames.borrow();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].line_str(1), "Paused          ");
        assert_eq!(frames[1].line_str(1), "                ");
        assert_eq!(frames[0].line_str(0), "Twinkle         ");
    }
}
