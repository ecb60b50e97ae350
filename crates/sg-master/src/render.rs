//! Offline rendering.
//!
//! The same scheduler that drives the device is run against an
//! [`OfflineSink`], with the beat timer measured in rendered frames
//! instead of wall-clock time.

use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use sg_audio::OfflineSink;
use sg_engine::{Frame, LoopHost, NullDisplay, Sequencer};
use sg_ir::{Pattern, TransportState};

use crate::config::Settings;

/// Beat timer in units of rendered frames. Frame requests are ignored.
struct FrameTimer {
    sample_rate: u32,
    now: u64,
    beat_due: Option<u64>,
}

impl LoopHost for FrameTimer {
    fn arm_beat_timer(&mut self, delay: Duration) {
        let frames = (delay.as_secs_f64() * self.sample_rate as f64).round() as u64;
        self.beat_due = Some(self.now + frames.max(1));
    }

    fn cancel_beat_timer(&mut self) {
        self.beat_due = None;
    }

    fn request_frame(&mut self) {}
}

/// Play `pattern` from beat 0 for `frames` frames at the configured
/// sample rate.
pub fn render_frames(
    settings: &Settings,
    transport: TransportState,
    pattern: &Pattern,
    frames: usize,
) -> Vec<Frame> {
    let sample_rate = settings.sample_rate;
    let mut config = settings.sequencer_config();
    config.transport = transport;

    let mut sequencer = Sequencer::new(
        config,
        settings.pitch_table().clone(),
        OfflineSink::new(sample_rate),
        NullDisplay,
    );
    sequencer.load_pattern(pattern.clone());

    let mut timer = FrameTimer {
        sample_rate,
        now: 0,
        beat_due: None,
    };
    sequencer.toggle_playback(&mut timer);

    let mut out = vec![Frame::silence(); frames];
    let mut rendered = 0;
    while rendered < frames {
        let until = timer
            .beat_due
            .map_or(frames, |due| (due as usize).clamp(rendered, frames));
        sequencer.audio_mut().render_into(&mut out[rendered..until]);
        rendered = until;
        timer.now = rendered as u64;

        if timer.beat_due.is_some_and(|due| due <= timer.now) {
            timer.beat_due = None;
            sequencer.run_beat_loop(&mut timer);
        }
    }

    log::debug!(
        target: "render",
        "rendered {} frames at {} Hz, {} tones dropped",
        frames,
        sample_rate,
        sequencer.audio().dropped()
    );
    out
}

fn wav_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

fn write_frames<W>(writer: &mut hound::WavWriter<W>, frames: &[Frame]) -> Result<(), hound::Error>
where
    W: std::io::Write + std::io::Seek,
{
    for frame in frames {
        let (left, right) = frame.to_i16();
        writer.write_sample(left)?;
        writer.write_sample(right)?;
    }
    Ok(())
}

/// Write 16-bit stereo PCM to `path`.
pub fn write_wav(path: &Path, frames: &[Frame], sample_rate: u32) -> Result<(), hound::Error> {
    let mut writer = hound::WavWriter::create(path, wav_spec(sample_rate))?;
    write_frames(&mut writer, frames)?;
    writer.finalize()
}

/// Encode 16-bit stereo PCM in memory.
pub fn frames_to_wav(frames: &[Frame], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, wav_spec(sample_rate))?;
        write_frames(&mut writer, frames)?;
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_ir::NoteId;

    fn settings(sample_rate: u32) -> Settings {
        let mut settings = Settings::default();
        settings.sample_rate = sample_rate;
        settings
    }

    #[test]
    fn empty_pattern_renders_silence() {
        let s = settings(8000);
        let out = render_frames(&s, s.transport(), &Pattern::new(32), 8000);
        assert_eq!(out.len(), 8000);
        assert!(out.iter().all(Frame::is_silent));
    }

    #[test]
    fn notes_sound_on_their_beats() {
        let s = settings(8000);
        let mut pattern = Pattern::new(4);
        pattern.insert(1, NoteId(45));

        // 120 bpm: beat 1 at 0.125s (frame 1000) for 0.1s, repeating every 0.5s.
        let out = render_frames(&s, s.transport(), &pattern, 8000);
        assert!(out[..1000].iter().all(Frame::is_silent));
        assert!(out[1000..1800].iter().any(|f| !f.is_silent()));
        assert!(out[1800..5000].iter().all(Frame::is_silent));
        assert!(out[5000..5800].iter().any(|f| !f.is_silent()));
    }

    #[test]
    fn volume_sets_peak_level() {
        let s = settings(8000);
        let mut pattern = Pattern::new(4);
        pattern.insert(0, NoteId(45));
        let transport = TransportState { bpm: 120.0, volume: 0.5 };

        let out = render_frames(&s, transport, &pattern, 2000);
        let peak = out.iter().map(|f| f.left.abs()).fold(0.0, f32::max);
        assert!(peak > 0.4 && peak <= 0.5 + 1e-6);
    }

    #[test]
    fn wav_header_describes_stereo_pcm() {
        let frames = vec![Frame::mono(0.5); 100];
        let bytes = frames_to_wav(&frames, 8000).unwrap();

        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 8000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 200);
    }
}
