//! In-memory audio sink.

use sg_engine::{AudioSink, AudioState, Frame, ToneSynth};
use sg_ir::Tone;

/// Audio sink whose clock advances only when [`render`](Self::render) is
/// called. Used for WAV export and deterministic tests.
#[derive(Debug)]
pub struct OfflineSink {
    synth: ToneSynth,
    state: AudioState,
    dropped: usize,
}

impl OfflineSink {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            synth: ToneSynth::new(sample_rate),
            state: AudioState::Suspended,
            dropped: 0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.synth.sample_rate()
    }

    pub fn synth(&self) -> &ToneSynth {
        &self.synth
    }

    /// Tones that ended before they could be scheduled.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Render `frames` frames, advancing the clock. A suspended sink
    /// renders nothing.
    pub fn render(&mut self, frames: usize) -> Vec<Frame> {
        let mut out = vec![Frame::silence(); frames];
        self.render_into(&mut out);
        out
    }

    /// Fill `out`, advancing the clock by `out.len()` frames.
    pub fn render_into(&mut self, out: &mut [Frame]) {
        match self.state {
            AudioState::Running => self.synth.render_into(out),
            AudioState::Suspended => out.fill(Frame::silence()),
        }
    }
}

impl AudioSink for OfflineSink {
    fn now(&self) -> f64 {
        self.synth.now()
    }

    fn state(&self) -> AudioState {
        self.state
    }

    fn resume(&mut self) {
        self.state = AudioState::Running;
    }

    fn schedule_tone(&mut self, tone: Tone) {
        if self.synth.schedule(tone).is_none() {
            self.dropped += 1;
            log::debug!(target: "audio", "dropped tone at {:.3}s, already over", tone.start);
        }
    }

    fn set_gain(&mut self, gain: f32) {
        self.synth.set_gain(gain);
    }
}
