//! CPAL-based audio output.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use sg_engine::{AudioSink, AudioState, ToneSynth};
use sg_ir::Tone;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::AudioError;

/// Tones that can wait between two device callbacks. Also the size of
/// the callback's voice pool, which never grows.
pub const TONE_QUEUE_CAPACITY: usize = 1024;

/// State shared with the device callback.
struct Shared {
    running: AtomicBool,
    frames: AtomicU64,
    gain: AtomicU32,
    /// Tones the callback dropped because every voice was busy
    overflowed: AtomicU64,
}

/// Audio sink playing through the default output device.
///
/// The stream is created paused, so the sink starts `Suspended` and its
/// clock reads 0 until [`resume`](AudioSink::resume). Tones travel to the
/// device thread over a lock-free ring buffer.
pub struct CpalSink {
    stream: Stream,
    sample_rate: u32,
    producer: HeapProd<Tone>,
    shared: Arc<Shared>,
    overflow_reported: u64,
}

impl CpalSink {
    /// Open the default output device.
    pub fn open() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?;
        let config: StreamConfig = config.into();
        let sample_rate = config.sample_rate.0;
        let channels = config.channels as usize;

        let rb = HeapRb::<Tone>::new(TONE_QUEUE_CAPACITY);
        let (producer, consumer) = rb.split();

        let shared = Arc::new(Shared {
            running: AtomicBool::new(false),
            frames: AtomicU64::new(0),
            gain: AtomicU32::new(1.0_f32.to_bits()),
            overflowed: AtomicU64::new(0),
        });

        let mut render = Render {
            synth: ToneSynth::bounded(sample_rate, TONE_QUEUE_CAPACITY),
            consumer,
            shared: shared.clone(),
            channels,
        };

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    #[cfg(feature = "alloc_check")]
                    assert_no_alloc::assert_no_alloc(|| render.fill(data));
                    #[cfg(not(feature = "alloc_check"))]
                    render.fill(data);
                },
                |err| log::error!(target: "audio", "stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamCreate(e.to_string()))?;

        // Some hosts start streams on creation.
        stream.pause().map_err(|e| AudioError::Playback(e.to_string()))?;

        log::info!(
            target: "audio",
            "opened {} at {} Hz, {} channels",
            device.name().unwrap_or_else(|_| "output device".into()),
            sample_rate,
            channels
        );

        Ok(Self {
            stream,
            sample_rate,
            producer,
            shared,
            overflow_reported: 0,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Warn once per batch of tones the callback had no voice for.
    fn report_overflow(&mut self) {
        let overflowed = self.shared.overflowed.load(Ordering::Relaxed);
        if overflowed > self.overflow_reported {
            log::warn!(
                target: "audio",
                "voice pool full, dropped {} tones",
                overflowed - self.overflow_reported
            );
            self.overflow_reported = overflowed;
        }
    }
}

impl AudioSink for CpalSink {
    fn now(&self) -> f64 {
        self.shared.frames.load(Ordering::Acquire) as f64 / self.sample_rate as f64
    }

    fn state(&self) -> AudioState {
        if self.shared.running.load(Ordering::Acquire) {
            AudioState::Running
        } else {
            AudioState::Suspended
        }
    }

    fn resume(&mut self) {
        match self.stream.play() {
            Ok(()) => self.shared.running.store(true, Ordering::Release),
            Err(e) => log::warn!(target: "audio", "could not resume output: {}", e),
        }
    }

    fn schedule_tone(&mut self, tone: Tone) {
        self.report_overflow();
        if self.producer.try_push(tone).is_err() {
            log::warn!(target: "audio", "tone queue full, dropping {:.2} Hz at {:.3}s", tone.frequency, tone.start);
        }
    }

    fn set_gain(&mut self, gain: f32) {
        self.shared.gain.store(gain.to_bits(), Ordering::Relaxed);
    }
}

/// Everything the device callback owns.
struct Render {
    synth: ToneSynth,
    consumer: HeapCons<Tone>,
    shared: Arc<Shared>,
    channels: usize,
}

impl Render {
    fn fill(&mut self, data: &mut [f32]) {
        if !self.shared.running.load(Ordering::Acquire) {
            data.fill(0.0);
            return;
        }

        while let Some(tone) = self.consumer.try_pop() {
            self.synth.schedule(tone);
        }
        self.synth.set_gain(f32::from_bits(self.shared.gain.load(Ordering::Relaxed)));

        for chunk in data.chunks_mut(self.channels) {
            let frame = self.synth.render_frame();
            for (i, sample) in chunk.iter_mut().enumerate() {
                *sample = match i {
                    0 => frame.left,
                    1 => frame.right,
                    _ => 0.0,
                };
            }
        }

        self.shared.overflowed.store(self.synth.overflowed(), Ordering::Relaxed);
        self.shared.frames.store(self.synth.frames_rendered(), Ordering::Release);
    }
}
