//! Boundaries between the scheduler and its collaborators.

use core::time::Duration;
use sg_ir::{NoteCell, Tone};

/// Whether the audio clock is advancing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioState {
    Suspended,
    Running,
}

/// The host audio layer: a precise clock, tone scheduling and one shared
/// gain stage.
pub trait AudioSink {
    /// Precise clock in seconds. Only advances while `Running`.
    fn now(&self) -> f64;

    fn state(&self) -> AudioState;

    /// Start the clock. Failures are handled (logged) by the sink.
    fn resume(&mut self);

    /// Sound `tone` at its start time. Fire-and-forget.
    fn schedule_tone(&mut self, tone: Tone);

    /// Set the master gain, effective immediately for every voice.
    fn set_gain(&mut self, gain: f32);
}

/// The grid renderer.
pub trait DisplaySink {
    /// Clear the previously highlighted column, then mark `beat`.
    fn highlight_beat(&mut self, beat: usize);

    fn draw_note_cell(&mut self, cell: NoteCell);

    fn clear_note_cell(&mut self, cell: NoteCell);
}

/// Timer services for the two playback loops.
///
/// The host multiplexes a coarse one-shot beat timer and a per-refresh
/// frame callback onto one thread.
pub trait LoopHost {
    /// Fire the beat loop once after `delay`, replacing any pending timer.
    fn arm_beat_timer(&mut self, delay: Duration);

    fn cancel_beat_timer(&mut self);

    /// Run the draw loop once on the next display refresh.
    fn request_frame(&mut self);
}

/// A display that ignores everything (offline rendering, headless tests).
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn highlight_beat(&mut self, _beat: usize) {}
    fn draw_note_cell(&mut self, _cell: NoteCell) {}
    fn clear_note_cell(&mut self, _cell: NoteCell) {}
}
