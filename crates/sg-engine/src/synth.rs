//! Sample-accurate sawtooth tone renderer.
//!
//! This is the host audio layer behind both the device sink and the
//! offline sink: tones are scheduled by absolute start time, the clock is
//! the number of rendered frames, and one gain stage scales the mix.

use sg_ir::Tone;
use slotmap::SlotMap;

use crate::frame::Frame;

slotmap::new_key_type! {
    /// Key of a scheduled voice.
    pub struct VoiceKey;
}

/// Voices preallocated by [`ToneSynth::new`].
pub const VOICE_CAPACITY: usize = 256;

/// A scheduled sawtooth oscillator.
#[derive(Clone, Copy, Debug)]
struct Voice {
    /// Position in the cycle, 0.0..1.0
    phase: f32,
    /// Phase advance per frame (frequency / sample rate)
    increment: f32,
    /// First frame that sounds
    start_frame: u64,
    /// First frame after the voice has stopped
    end_frame: u64,
}

/// Renders scheduled tones one frame at a time.
pub struct ToneSynth {
    sample_rate: u32,
    voices: SlotMap<VoiceKey, Voice>,
    /// Upper bound on live voices, if the pool must never grow
    limit: Option<usize>,
    overflowed: u64,
    gain: f32,
    frames_rendered: u64,
}

impl ToneSynth {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            voices: SlotMap::with_capacity_and_key(VOICE_CAPACITY),
            limit: None,
            overflowed: 0,
            gain: 1.0,
            frames_rendered: 0,
        }
    }

    /// A synth whose pool is allocated once and never grows. Tones past
    /// `voices` live voices are dropped and counted in [`overflowed`](Self::overflowed).
    pub fn bounded(sample_rate: u32, voices: usize) -> Self {
        Self {
            voices: SlotMap::with_capacity_and_key(voices),
            limit: Some(voices),
            ..Self::new(sample_rate)
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Clock position in seconds.
    pub fn now(&self) -> f64 {
        self.frames_rendered as f64 / self.sample_rate as f64
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Takes effect on the next rendered frame, for every voice.
    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Tones refused because a bounded pool was full.
    pub fn overflowed(&self) -> u64 {
        self.overflowed
    }

    /// Schedule `tone`. A start time in the past starts it on the next
    /// frame; a tone that has already ended is dropped.
    pub fn schedule(&mut self, tone: Tone) -> Option<VoiceKey> {
        let rate = self.sample_rate as f64;
        let start_frame = self.frame_at(tone.start * rate).max(self.frames_rendered);
        let end_frame = self.frame_at(tone.end() * rate);
        if end_frame <= start_frame {
            return None;
        }
        if self.limit.is_some_and(|limit| self.voices.len() >= limit) {
            self.overflowed += 1;
            return None;
        }

        Some(self.voices.insert(Voice {
            phase: 0.5,
            increment: tone.frequency / self.sample_rate as f32,
            start_frame,
            end_frame,
        }))
    }

    fn frame_at(&self, position: f64) -> u64 {
        libm::round(position).max(0.0) as u64
    }

    /// Render one frame and advance the clock. Never allocates.
    pub fn render_frame(&mut self) -> Frame {
        let frame = self.frames_rendered;
        let mut mix = 0.0_f32;

        for voice in self.voices.values_mut() {
            if frame < voice.start_frame {
                continue;
            }
            mix += 2.0 * voice.phase - 1.0;
            voice.phase += voice.increment;
            if voice.phase >= 1.0 {
                voice.phase -= libm::floorf(voice.phase);
            }
        }

        self.frames_rendered += 1;
        let next = self.frames_rendered;
        self.voices.retain(|_, v| v.end_frame > next);

        Frame::mono(mix * self.gain)
    }

    pub fn render_into(&mut self, out: &mut [Frame]) {
        for slot in out.iter_mut() {
            *slot = self.render_frame();
        }
    }
}

impl core::fmt::Debug for ToneSynth {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ToneSynth")
            .field("sample_rate", &self.sample_rate)
            .field("voices", &self.voices.len())
            .field("limit", &self.limit)
            .field("gain", &self.gain)
            .field("frames_rendered", &self.frames_rendered)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    const RATE: u32 = 1000;

    fn tone(start: f64, duration: f64) -> Tone {
        Tone { frequency: 100.0, start, duration }
    }

    fn render(synth: &mut ToneSynth, frames: usize) -> Vec<Frame> {
        let mut out = vec![Frame::silence(); frames];
        synth.render_into(&mut out);
        out
    }

    #[test]
    fn clock_counts_frames() {
        let mut synth = ToneSynth::new(RATE);
        render(&mut synth, 250);
        assert_eq!(synth.frames_rendered(), 250);
        assert_eq!(synth.now(), 0.25);
    }

    #[test]
    fn tone_sounds_only_inside_its_window() {
        let mut synth = ToneSynth::new(RATE);
        synth.schedule(tone(0.1, 0.1));
        let out = render(&mut synth, 300);

        assert!(out[..100].iter().all(Frame::is_silent));
        assert!(out[101..200].iter().any(|f| !f.is_silent()));
        assert!(out[200..].iter().all(Frame::is_silent));
        assert_eq!(synth.active_voices(), 0);
    }

    #[test]
    fn sawtooth_ramps_and_wraps() {
        let mut synth = ToneSynth::new(RATE);
        synth.schedule(tone(0.0, 0.1));
        let out = render(&mut synth, 12);
        // 100 Hz at 1 kHz: ten frames per cycle starting mid-ramp.
        assert_eq!(out[0].left, 0.0);
        assert!(out[1].left > out[0].left);
        assert!(out.iter().any(|f| f.left < -0.5));
        assert!(out.iter().all(|f| (-1.0..=1.0).contains(&f.left)));
    }

    #[test]
    fn past_start_plays_immediately() {
        let mut synth = ToneSynth::new(RATE);
        render(&mut synth, 100);
        assert!(synth.schedule(tone(0.05, 0.1)).is_some());
        assert!(synth.schedule(tone(0.0, 0.05)).is_none());
        let out = render(&mut synth, 60);
        assert!(out[1..50].iter().any(|f| !f.is_silent()));
        assert!(out[50..].iter().all(Frame::is_silent));
    }

    #[test]
    fn gain_scales_the_mix() {
        let mut loud = ToneSynth::new(RATE);
        let mut quiet = ToneSynth::new(RATE);
        quiet.set_gain(0.25);
        loud.schedule(tone(0.0, 0.1));
        quiet.schedule(tone(0.0, 0.1));

        let a = render(&mut loud, 20);
        let b = render(&mut quiet, 20);
        for (x, y) in a.iter().zip(&b) {
            assert!((x.left * 0.25 - y.left).abs() < 1e-6);
        }
    }

    #[test]
    fn overlapping_tones_mix() {
        let mut synth = ToneSynth::new(RATE);
        synth.schedule(tone(0.0, 0.1));
        synth.schedule(tone(0.0, 0.1));
        assert_eq!(synth.active_voices(), 2);
        let out = render(&mut synth, 3);
        let mut single = ToneSynth::new(RATE);
        single.schedule(tone(0.0, 0.1));
        let one = render(&mut single, 3);
        assert!((out[1].left - 2.0 * one[1].left).abs() < 1e-6);
    }

    #[test]
    fn bounded_pool_drops_extra_tones() {
        let mut synth = ToneSynth::bounded(RATE, 2);
        assert!(synth.schedule(tone(0.0, 0.1)).is_some());
        assert!(synth.schedule(tone(0.0, 0.1)).is_some());
        assert!(synth.schedule(tone(0.0, 0.1)).is_none());
        assert_eq!(synth.active_voices(), 2);
        assert_eq!(synth.overflowed(), 1);

        render(&mut synth, 100);
        assert_eq!(synth.active_voices(), 0);
        assert!(synth.schedule(tone(0.1, 0.1)).is_some());
        assert_eq!(synth.overflowed(), 1);
    }

    #[test]
    fn unbounded_pool_grows_past_capacity() {
        let mut synth = ToneSynth::new(RATE);
        for _ in 0..VOICE_CAPACITY + 1 {
            assert!(synth.schedule(tone(0.0, 0.1)).is_some());
        }
        assert_eq!(synth.active_voices(), VOICE_CAPACITY + 1);
        assert_eq!(synth.overflowed(), 0);
    }
}
