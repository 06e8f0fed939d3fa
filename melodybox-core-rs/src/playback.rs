//! Melody playback engine.
//!
//! [`PlaybackEngine::step`] does one unit of work and says how long to wait
//! before the next one; [`PlaybackEngine::run`] (behind the `task` feature)
//! is the loop that sleeps between steps. Keeping the step synchronous lets
//! host tests walk through a whole melody without a timer.
//!
//! ```text
//!            Start (input)          last note played
//!  Stopped ──────────────► Playing ──────────────────► Stopped
//!     ▲                    │    ▲
//!     │   Stop (input)     │    │ Resume (input)
//!     └────────────────────┤    │
//!                          ▼    │
//!                          Paused
//! ```

use crate::catalog::{self, Melody};
use crate::config::{IDLE_POLL_MS, PAUSE_POLL_MS};
use crate::error::OutputError;
use crate::render::{self, FrameSink};
use crate::state::{PlaybackPort, PlaybackStatus};

/// Tone generator driven by the engine.
///
/// Methods take `&self` because the input context also silences the output
/// on Pause and Stop; implementations serialise access internally.
pub trait AudioOutput {
    /// Start (or retune) a square wave at `hz`.
    fn set_frequency(&self, hz: u32) -> Result<(), OutputError>;
    /// Set the loudness, on the scale of [`INTENSITY_TABLE`](crate::volume::INTENSITY_TABLE).
    fn set_intensity(&self, level: u16);
    /// Stop producing sound.
    fn silence(&self);
}

/// Outcome of one [`PlaybackEngine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Nothing to play.
    Idle,
    /// Paused; position kept, output untouched.
    Held,
    /// A note (or rest) was emitted and lasts `hold_ms`.
    Note { hold_ms: u32 },
    /// The melody ran out of notes.
    Finished,
    /// The session was stopped or superseded.
    Aborted,
}

impl Step {
    /// How long to wait before the next step.
    pub fn delay_ms(self) -> u64 {
        match self {
            Step::Idle | Step::Finished => IDLE_POLL_MS,
            Step::Held => PAUSE_POLL_MS,
            Step::Note { hold_ms } => u64::from(hold_ms),
            Step::Aborted => 0,
        }
    }
}

#[derive(Clone, Copy)]
struct Session {
    id: u32,
    melody: &'static Melody,
    position: usize,
}

/// Walks the active melody note by note.
pub struct PlaybackEngine<'a, A, F> {
    port: PlaybackPort<'a>,
    audio: &'a A,
    sink: &'a F,
    session: Option<Session>,
}

impl<'a, A, F> PlaybackEngine<'a, A, F>
where
    A: AudioOutput,
    F: FrameSink,
{
    /// Create an idle engine.
    pub fn new(port: PlaybackPort<'a>, audio: &'a A, sink: &'a F) -> Self {
        Self {
            port,
            audio,
            sink,
            session: None,
        }
    }

    /// Advance the state machine by one step.
    ///
    /// 1. A session that was stopped or replaced by a newer Start is
    ///    aborted: the output is silenced and the note index rewound.
    /// 2. While paused, nothing happens.
    /// 3. With no session, a Playing status claims the current one.
    /// 4. Past the last note, the output is silenced, the session is marked
    ///    complete and the menu is redrawn.
    /// 5. Otherwise the next note is emitted at the current volume.
    pub fn step(&mut self) -> Step {
        let state = self.port.state();
        let status = state.status();
        let live = state.session();

        if let Some(session) = self.session {
            if session.id != live || status == PlaybackStatus::Stopped {
                return self.abort();
            }
        }

        match status {
            PlaybackStatus::Stopped => return Step::Idle,
            PlaybackStatus::Paused => return Step::Held,
            PlaybackStatus::Playing => {}
        }

        let mut session = match self.session {
            Some(session) => session,
            None => match catalog::melody(state.current_melody_index()) {
                Some(melody) => {
                    #[cfg(feature = "defmt")]
                    defmt::info!("playback: start {} (session {})", melody.name, live);
                    self.port.begin(live);
                    Session {
                        id: live,
                        melody,
                        position: 0,
                    }
                }
                None => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("playback: no melody at index {}", state.current_melody_index());
                    self.port.finish(live);
                    return Step::Finished;
                }
            },
        };

        let Some(&note) = session.melody.notes.get(session.position) else {
            return self.finish(session.id);
        };

        match note.frequency() {
            Some(hz) => match self.audio.set_frequency(hz) {
                Ok(()) => self.audio.set_intensity(state.volume().intensity()),
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("playback: {} Hz rejected: {}", hz, _e);
                    self.audio.silence();
                }
            },
            None => self.audio.silence(),
        }

        session.position += 1;
        self.port.set_note_index(session.position);
        self.session = Some(session);

        Step::Note {
            hold_ms: session.melody.tempo_ms,
        }
    }

    fn finish(&mut self, id: u32) -> Step {
        self.audio.silence();
        self.port.finish(id);
        self.session = None;

        #[cfg(feature = "defmt")]
        defmt::info!("playback: session {} finished", id);

        self.sink.show(render::current_frame(self.port.state()));
        Step::Finished
    }

    fn abort(&mut self) -> Step {
        self.audio.silence();
        self.port.reset();
        self.session = None;

        #[cfg(feature = "defmt")]
        defmt::info!("playback: session aborted");

        Step::Aborted
    }

    /// Run the engine forever, sleeping between steps.
    #[cfg(feature = "task")]
    pub async fn run(mut self) -> ! {
        loop {
            let delay = self.step().delay_ms();
            embassy_time::Timer::after(embassy_time::Duration::from_millis(delay)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Frame;
    use crate::state::AppState;
    use core::cell::RefCell;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Frequency(u32),
        Intensity(u16),
        Silence,
    }

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<Call>>,
        reject_above: Option<u32>,
    }

    impl AudioOutput for Recorder {
        fn set_frequency(&self, hz: u32) -> Result<(), OutputError> {
            if self.reject_above.is_some_and(|max| hz > max) {
                return Err(OutputError::FrequencyRejected);
            }
            self.calls.borrow_mut().push(Call::Frequency(hz));
            Ok(())
        }
        fn set_intensity(&self, level: u16) {
            self.calls.borrow_mut().push(Call::Intensity(level));
        }
        fn silence(&self) {
            self.calls.borrow_mut().push(Call::Silence);
        }
    }

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

    fn fresh() -> &'static AppState {
        Box::leak(Box::new(AppState::new()))
    }

    #[test]
    fn idle_when_stopped() {
        let state = fresh();
        let ports = state.split().unwrap();
        let (audio, screen) = (Recorder::default(), Screen::default());
        let mut engine = PlaybackEngine::new(ports.playback, &audio, &screen);

        assert_eq!(engine.step(), Step::Idle);
        assert_eq!(Step::Idle.delay_ms(), IDLE_POLL_MS);
        assert!(audio.calls.borrow().is_empty());
    }

    #[test]
    fn mario_first_note_at_default_volume() {
        let state = fresh();
        let ports = state.split().unwrap();
        let (audio, screen) = (Recorder::default(), Screen::default());
        let mut engine = PlaybackEngine::new(ports.playback, &audio, &screen);

        ports.input.start(0);
        assert_eq!(engine.step(), Step::Note { hold_ms: 150 });
        assert_eq!(
            *audio.calls.borrow(),
            [Call::Frequency(660), Call::Intensity(6500)]
        );
        assert_eq!(state.note_index(), 1);
    }

    #[test]
    fn rests_silence() {
        let state = fresh();
        let ports = state.split().unwrap();
        let (audio, screen) = (Recorder::default(), Screen::default());
        let mut engine = PlaybackEngine::new(ports.playback, &audio, &screen);

        ports.input.start(0);
        engine.step();
        engine.step();
        audio.calls.borrow_mut().clear();
        engine.step(); // third Mario note is a rest
        assert_eq!(*audio.calls.borrow(), [Call::Silence]);
    }

    #[test]
    fn rejected_frequency_becomes_silence() {
        let state = fresh();
        let ports = state.split().unwrap();
        let audio = Recorder {
            reject_above: Some(500),
            ..Default::default()
        };
        let screen = Screen::default();
        let mut engine = PlaybackEngine::new(ports.playback, &audio, &screen);

        ports.input.start(0);
        assert_eq!(engine.step(), Step::Note { hold_ms: 150 });
        assert_eq!(*audio.calls.borrow(), [Call::Silence]);
        assert_eq!(state.note_index(), 1);
    }

    #[test]
    fn volume_is_read_per_note() {
        let state = fresh();
        let ports = state.split().unwrap();
        let (audio, screen) = (Recorder::default(), Screen::default());
        let mut engine = PlaybackEngine::new(ports.playback, &audio, &screen);

        ports.input.start(0);
        engine.step();
        ports.input.set_volume(crate::Volume::MAX);
        engine.step();
        assert_eq!(audio.calls.borrow().last(), Some(&Call::Intensity(20000)));
    }

    #[test]
    fn pause_holds_position() {
        let state = fresh();
        let ports = state.split().unwrap();
        let (audio, screen) = (Recorder::default(), Screen::default());
        let mut engine = PlaybackEngine::new(ports.playback, &audio, &screen);

        ports.input.start(1);
        engine.step();
        ports.input.pause();
        audio.calls.borrow_mut().clear();

        for _ in 0..5 {
            assert_eq!(engine.step(), Step::Held);
        }
        assert!(audio.calls.borrow().is_empty());
        assert_eq!(state.note_index(), 1);

        ports.input.resume();
        assert!(matches!(engine.step(), Step::Note { .. }));
        assert_eq!(state.note_index(), 2);
    }

    #[test]
    fn full_melody_finishes_and_redraws_menu() {
        let state = fresh();
        let ports = state.split().unwrap();
        let (audio, screen) = (Recorder::default(), Screen::default());
        let mut engine = PlaybackEngine::new(ports.playback, &audio, &screen);

        ports.input.publish_menu(crate::MenuId::Melodies, 2);
        ports.input.start(2);
        let len = catalog::MELODIES[2].notes.len();
        for _ in 0..len {
            assert!(matches!(engine.step(), Step::Note { .. }));
        }
        assert_eq!(engine.step(), Step::Finished);

        assert_eq!(state.status(), PlaybackStatus::Stopped);
        assert_eq!(state.note_index(), 0);
        assert_eq!(audio.calls.borrow().last(), Some(&Call::Silence));
        assert_eq!(
            screen.frames.borrow().last(),
            Some(&render::menu_frame(crate::MenuId::Melodies, 2))
        );
        assert_eq!(engine.step(), Step::Idle);
    }

    #[test]
    fn stop_aborts_and_silences() {
        let state = fresh();
        let ports = state.split().unwrap();
        let (audio, screen) = (Recorder::default(), Screen::default());
        let mut engine = PlaybackEngine::new(ports.playback, &audio, &screen);

        ports.input.start(0);
        engine.step();
        engine.step();
        ports.input.stop();

        assert_eq!(engine.step(), Step::Aborted);
        assert_eq!(audio.calls.borrow().last(), Some(&Call::Silence));
        assert_eq!(state.note_index(), 0);
        assert_eq!(engine.step(), Step::Idle);
    }

    #[test]
    fn newer_start_replaces_session() {
        let state = fresh();
        let ports = state.split().unwrap();
        let (audio, screen) = (Recorder::default(), Screen::default());
        let mut engine = PlaybackEngine::new(ports.playback, &audio, &screen);

        ports.input.start(0);
        engine.step();
        engine.step();
        ports.input.stop();
        ports.input.start(1);

        assert_eq!(engine.step(), Step::Aborted);
        audio.calls.borrow_mut().clear();
        assert_eq!(engine.step(), Step::Note { hold_ms: 600 });
        assert_eq!(audio.calls.borrow()[0], Call::Frequency(262));
        assert_eq!(state.note_index(), 1);
    }
}
