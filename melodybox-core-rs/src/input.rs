//! Button polling, debounce and command routing.
//!
//! The input context is the only place user intent enters the system.
//! [`InputDispatcher::poll`] reads the pad once, picks at most one
//! [`Command`] and carries it out; [`InputDispatcher::run`] (behind the
//! `task` feature) polls every [`INPUT_POLL_MS`](crate::config::INPUT_POLL_MS)
//! and holds transient messages on screen.
//!
//! # Routing
//!
//! While a melody is active, buttons are checked in this order and the
//! first that applies wins:
//!
//! | Button | Condition                         | Command            |
//! |--------|-----------------------------------|--------------------|
//! | Left   | volume > 0, stop option hidden    | `VolumeDown`       |
//! | Right  | volume < 10, stop option hidden   | `VolumeUp`         |
//! | Enter  | stop option shown                 | `Stop`             |
//! | Enter  | stop option hidden                | `TogglePause`      |
//! | Down   |                                   | `ToggleStopOption` |
//!
//! Otherwise Up and Down move the menu selection and Enter activates it.

use crate::catalog;
use crate::config::DEBOUNCE_MS;
use crate::menu::{Direction, MenuAction, Navigator};
use crate::playback::AudioOutput;
use crate::render::{self, FrameSink, PlayerHint};
use crate::state::{InputPort, PlaybackStatus};
use crate::store::{self, SettingsStore};
use crate::volume::Volume;

/// The five buttons on the pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Enter,
}

/// Current button levels. Implementations normalise active-low wiring so
/// `true` always means "pressed".
pub trait ButtonPad {
    fn is_pressed(&self, button: Button) -> bool;
}

/// A routed button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    VolumeDown,
    VolumeUp,
    TogglePause,
    Stop,
    ToggleStopOption,
    Navigate(Direction),
    Activate,
}

/// Result of one [`InputDispatcher::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// Nothing accepted.
    Idle,
    /// `Command` was carried out and the screen redrawn.
    Handled(Command),
    /// A transient message is on screen. The caller holds it for
    /// [`MESSAGE_HOLD_MS`](crate::config::MESSAGE_HOLD_MS) and then calls
    /// [`InputDispatcher::end_message`].
    Message(&'static str),
}

/// Global debounce window shared by all buttons.
#[derive(Debug, Default)]
pub struct Debouncer {
    last_accept_ms: Option<u64>,
}

impl Debouncer {
    /// A debouncer that accepts the first input.
    pub const fn new() -> Self {
        Self {
            last_accept_ms: None,
        }
    }

    /// Whether an input at `now_ms` falls outside the window.
    pub fn ready(&self, now_ms: u64) -> bool {
        match self.last_accept_ms {
            Some(last) => now_ms.saturating_sub(last) >= DEBOUNCE_MS,
            None => true,
        }
    }

    /// Open a new window at `now_ms`.
    pub fn accept(&mut self, now_ms: u64) {
        self.last_accept_ms = Some(now_ms);
    }
}

/// Owns the navigation stack and turns button presses into state changes.
pub struct InputDispatcher<'a, A, S, F> {
    port: InputPort<'a>,
    audio: &'a A,
    store: S,
    sink: &'a F,
    nav: Navigator,
    debounce: Debouncer,
}

impl<'a, A, S, F> InputDispatcher<'a, A, S, F>
where
    A: AudioOutput,
    S: SettingsStore,
    F: FrameSink,
{
    /// Create the dispatcher at the Main menu and publish it.
    pub fn new(port: InputPort<'a>, audio: &'a A, store: S, sink: &'a F) -> Self {
        let nav = Navigator::new();
        port.publish_menu(nav.current(), nav.selected());
        Self {
            port,
            audio,
            store,
            sink,
            nav,
            debounce: Debouncer::new(),
        }
    }

    /// The menu stack.
    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    /// The settings store the volume is persisted to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the persisted volume into the shared state.
    pub fn restore_volume(&mut self) -> Volume {
        let volume = store::load_volume(&mut self.store);
        self.port.set_volume(volume);
        volume
    }

    /// Draw whatever the current status calls for.
    pub fn redraw(&self) {
        self.sink.show(render::current_frame(self.port.state()));
    }

    /// Read the pad once at `now_ms` and handle at most one press.
    pub fn poll<P: ButtonPad>(&mut self, now_ms: u64, pad: &P) -> Response {
        if !self.debounce.ready(now_ms) {
            return Response::Idle;
        }
        let Some(command) = self.route(pad) else {
            return Response::Idle;
        };
        self.debounce.accept(now_ms);

        #[cfg(feature = "defmt")]
        defmt::debug!("input: {}", command);

        self.execute(command)
    }

    fn route<P: ButtonPad>(&self, pad: &P) -> Option<Command> {
        let state = self.port.state();

        if state.status() == PlaybackStatus::Stopped {
            return if pad.is_pressed(Button::Up) {
                Some(Command::Navigate(Direction::Up))
            } else if pad.is_pressed(Button::Down) {
                Some(Command::Navigate(Direction::Down))
            } else if pad.is_pressed(Button::Enter) {
                Some(Command::Activate)
            } else {
                None
            };
        }

        let stop_shown = state.show_stop_option();
        let volume = state.volume();
        if pad.is_pressed(Button::Left) && volume > Volume::MIN && !stop_shown {
            Some(Command::VolumeDown)
        } else if pad.is_pressed(Button::Right) && volume < Volume::MAX && !stop_shown {
            Some(Command::VolumeUp)
        } else if pad.is_pressed(Button::Enter) {
            Some(if stop_shown {
                Command::Stop
            } else {
                Command::TogglePause
            })
        } else if pad.is_pressed(Button::Down) {
            Some(Command::ToggleStopOption)
        } else {
            None
        }
    }

    /// Carry out `command` and redraw.
    pub fn execute(&mut self, command: Command) -> Response {
        let state = self.port.state();

        match command {
            Command::VolumeDown | Command::VolumeUp => {
                let current = state.volume();
                let next = if command == Command::VolumeUp {
                    current.step_up()
                } else {
                    current.step_down()
                };
                self.port.set_volume(next);
                self.persist_volume(next);
                self.sink.show(render::player_frame(state, PlayerHint::None));
            }
            Command::TogglePause => {
                if self.port.pause() {
                    self.audio.silence();
                    self.sink.show(render::player_frame(state, PlayerHint::None));
                } else if self.port.resume() {
                    self.sink.show(render::player_frame(state, PlayerHint::Resumed));
                }
            }
            Command::Stop => {
                self.port.stop();
                self.audio.silence();
                self.redraw();
            }
            Command::ToggleStopOption => {
                self.port.set_show_stop_option(!state.show_stop_option());
                self.sink.show(render::player_frame(state, PlayerHint::None));
            }
            Command::Navigate(direction) => {
                self.nav.navigate(direction);
                self.publish_menu();
                self.redraw();
            }
            Command::Activate => return self.activate(),
        }
        Response::Handled(command)
    }

    fn activate(&mut self) -> Response {
        let Some(action) = self.nav.activate() else {
            return Response::Idle;
        };

        #[cfg(feature = "defmt")]
        defmt::info!("menu: {}", action);

        match action {
            MenuAction::Open(_) | MenuAction::Back => {
                self.publish_menu();
                self.redraw();
            }
            MenuAction::Play(index) => {
                if catalog::melody(index).is_some() {
                    self.port.start(index);
                }
                self.redraw();
            }
            MenuAction::ResetVolume => {
                self.port.set_volume(Volume::DEFAULT);
                self.persist_volume(Volume::DEFAULT);
                return self.message("Volume Reset");
            }
            MenuAction::Backlight(on) => {
                self.sink.set_backlight(on);
                return self.message(if on { "Backlight ON" } else { "Backlight OFF" });
            }
        }
        Response::Handled(Command::Activate)
    }

    fn message(&self, text: &'static str) -> Response {
        self.sink.show(render::message_frame(text));
        Response::Message(text)
    }

    /// Take a transient message off the screen.
    pub fn end_message(&self) {
        self.redraw();
    }

    fn publish_menu(&self) {
        self.port.publish_menu(self.nav.current(), self.nav.selected());
    }

    fn persist_volume(&mut self, volume: Volume) {
        if let Err(_e) = store::save_volume(&mut self.store, volume) {
            #[cfg(feature = "defmt")]
            defmt::warn!("volume not saved: {}", _e);
        }
    }

    /// Poll the pad forever.
    #[cfg(feature = "task")]
    pub async fn run<P: ButtonPad>(mut self, pad: P) -> ! {
        use embassy_time::{Duration, Instant, Timer};

        use crate::config::{INPUT_POLL_MS, MESSAGE_HOLD_MS};

        loop {
            let now = Instant::now().as_millis();
            if let Response::Message(_) = self.poll(now, &pad) {
                Timer::after(Duration::from_millis(MESSAGE_HOLD_MS)).await;
                self.end_message();
            }
            Timer::after(Duration::from_millis(INPUT_POLL_MS)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debounce_window() {
        let mut d = Debouncer::new();
        assert!(d.ready(0));
        d.accept(1000);
        assert!(!d.ready(1050));
        assert!(!d.ready(1199));
        assert!(d.ready(1200));
    }

    #[test]
    fn debounce_ignores_clock_going_backwards() {
        let mut d = Debouncer::new();
        d.accept(500);
        assert!(!d.ready(100));
    }
}
