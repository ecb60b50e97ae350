//! In-memory collaborators for scheduler and sequencer tests.

use alloc::vec::Vec;
use core::time::Duration;
use sg_ir::{NoteCell, Tone};

use crate::sinks::{AudioSink, AudioState, DisplaySink, LoopHost};

/// Audio sink with a hand-driven clock that records every tone.
#[derive(Debug)]
pub struct FakeAudio {
    pub now: f64,
    pub state: AudioState,
    pub tones: Vec<Tone>,
    pub gain: f32,
    pub resumes: usize,
}

impl FakeAudio {
    pub fn running_at(now: f64) -> Self {
        Self {
            now,
            state: AudioState::Running,
            tones: Vec::new(),
            gain: 1.0,
            resumes: 0,
        }
    }
}

impl AudioSink for FakeAudio {
    fn now(&self) -> f64 {
        self.now
    }

    fn state(&self) -> AudioState {
        self.state
    }

    fn resume(&mut self) {
        self.resumes += 1;
        self.state = AudioState::Running;
    }

    fn schedule_tone(&mut self, tone: Tone) {
        self.tones.push(tone);
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }
}

#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub highlights: Vec<usize>,
    pub drawn: Vec<NoteCell>,
    pub cleared: Vec<NoteCell>,
}

impl DisplaySink for RecordingDisplay {
    fn highlight_beat(&mut self, beat: usize) {
        self.highlights.push(beat);
    }

    fn draw_note_cell(&mut self, cell: NoteCell) {
        self.drawn.push(cell);
    }

    fn clear_note_cell(&mut self, cell: NoteCell) {
        self.cleared.push(cell);
    }
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    pub armed: Vec<Duration>,
    pub cancels: usize,
    pub frames: usize,
}

impl LoopHost for RecordingHost {
    fn arm_beat_timer(&mut self, delay: Duration) {
        self.armed.push(delay);
    }

    fn cancel_beat_timer(&mut self) {
        self.cancels += 1;
    }

    fn request_frame(&mut self) {
        self.frames += 1;
    }
}
