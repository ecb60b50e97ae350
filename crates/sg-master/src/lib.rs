//! Headless controller for the stepgrid sequencer.
//!
//! Owns a [`Sequencer`] plus the wall-clock timers that drive its two
//! loops, so both the GUI and the CLI only need to call [`Controller::poll`]
//! and [`Controller::frame`] from their event loop.

mod config;
mod pattern_file;
mod render;
mod timers;

use std::cell::Ref;
use std::path::Path;
use std::time::Instant;

use sg_engine::Sequencer;

// Re-export common types so callers don't need sg-ir/sg-engine directly.
pub use config::{ConfigError, Settings, DEFAULT_SAMPLE_RATE};
pub use pattern_file::{load_pattern, parse_pattern, pattern_to_toml, save_pattern, PatternFileError};
pub use render::{frames_to_wav, render_frames, write_wav};
pub use sg_audio::{AudioError, CpalSink, OfflineSink};
pub use sg_engine::{AudioSink, DisplaySink, Frame, NullDisplay, PlayState};
pub use sg_ir::{Action, NoteCell, NoteId, Pattern, PitchTable, TransportState};
pub use timers::LoopTimers;

#[derive(Debug)]
pub enum ControllerError {
    Audio(AudioError),
    Config(ConfigError),
}

impl std::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerError::Audio(e) => write!(f, "{}", e),
            ControllerError::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<AudioError> for ControllerError {
    fn from(e: AudioError) -> Self {
        ControllerError::Audio(e)
    }
}

impl From<ConfigError> for ControllerError {
    fn from(e: ConfigError) -> Self {
        ControllerError::Config(e)
    }
}

/// Headless sequencer controller.
pub struct Controller<A, D> {
    settings: Settings,
    sequencer: Sequencer<A, D>,
    timers: LoopTimers,
}

impl<D: DisplaySink + 'static> Controller<CpalSink, D> {
    /// Open the default output device. Audio stays suspended until the
    /// first play.
    pub fn open(settings: Settings, display: D) -> Result<Self, ControllerError> {
        let audio = CpalSink::open()?;
        Ok(Self::with_audio(settings, audio, display))
    }
}

impl<A, D> Controller<A, D>
where
    A: AudioSink + 'static,
    D: DisplaySink + 'static,
{
    pub fn with_audio(settings: Settings, audio: A, display: D) -> Self {
        let sequencer = Sequencer::new(
            settings.sequencer_config(),
            settings.pitch_table().clone(),
            audio,
            display,
        );
        Self {
            settings,
            sequencer,
            timers: LoopTimers::new(Instant::now()),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sequencer(&self) -> &Sequencer<A, D> {
        &self.sequencer
    }

    pub fn pattern(&self) -> &Pattern {
        self.sequencer.pattern()
    }

    pub fn pitches(&self) -> &PitchTable {
        self.sequencer.pitches()
    }

    pub fn display(&self) -> Ref<'_, D> {
        self.sequencer.display()
    }

    // --- Playback ---

    pub fn play_pause(&mut self, now: Instant) -> PlayState {
        self.timers.set_now(now);
        self.sequencer.toggle_playback(&mut self.timers)
    }

    pub fn is_playing(&self) -> bool {
        self.sequencer.is_playing()
    }

    /// Run the beat loop if its timer is due. Returns whether it ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        self.timers.set_now(now);
        if !self.timers.take_due_beat(now) {
            return false;
        }
        self.sequencer.run_beat_loop(&mut self.timers);
        true
    }

    /// Run one draw tick if one was requested. Call once per refresh.
    pub fn frame(&mut self) -> bool {
        if !self.timers.take_frame_request() {
            return false;
        }
        self.sequencer.draw(&mut self.timers);
        true
    }

    /// When the beat timer next fires, if armed.
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.timers.beat_deadline()
    }

    pub fn frame_pending(&self) -> bool {
        self.timers.frame_pending()
    }

    // --- Transport ---

    pub fn transport(&self) -> TransportState {
        *self.sequencer.transport()
    }

    pub fn bpm(&self) -> f64 {
        self.sequencer.transport().bpm
    }

    pub fn volume(&self) -> f32 {
        self.sequencer.transport().volume
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.sequencer.set_bpm(bpm);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.sequencer.set_volume(volume);
    }

    pub fn dispatch_named(&mut self, name: &str, payload: Option<f64>) {
        self.sequencer.dispatch_named(name, payload);
    }

    // --- Pattern ---

    pub fn toggle_note(&mut self, beat: usize, note: NoteId) -> bool {
        self.sequencer.toggle_note(beat, note)
    }

    pub fn toggle_named(&mut self, beat: usize, name: &str) -> Option<bool> {
        self.sequencer.toggle_named(beat, name)
    }

    pub fn clear_pattern(&mut self) {
        self.sequencer.clear_pattern();
    }

    pub fn load_pattern(&mut self, pattern: Pattern) {
        self.sequencer.load_pattern(pattern);
    }

    pub fn load_pattern_file(&mut self, path: &Path) -> Result<(), PatternFileError> {
        let pattern = load_pattern(path, self.pitches())?;
        log::info!(target: "controller", "loaded {} ({} beats)", path.display(), pattern.total_beats());
        self.load_pattern(pattern);
        Ok(())
    }

    pub fn save_pattern_file(&self, path: &Path) -> Result<(), PatternFileError> {
        save_pattern(path, self.pattern(), self.pitches())
    }

    // --- Offline rendering ---

    /// Render `seconds` of the current pattern at the current tempo and
    /// volume, independent of live playback.
    pub fn render_frames(&self, seconds: f64) -> Vec<Frame> {
        let frames = (seconds.max(0.0) * self.settings.sample_rate as f64).round() as usize;
        render_frames(&self.settings, self.transport(), self.pattern(), frames)
    }

    pub fn render_to_wav(&self, path: &Path, seconds: f64) -> Result<(), hound::Error> {
        let frames = self.render_frames(seconds);
        write_wav(path, &frames, self.settings.sample_rate)
    }
}
