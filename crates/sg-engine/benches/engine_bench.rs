use core::time::Duration;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sg_engine::{AudioSink, AudioState, BeatScheduler, Frame, LoopHost, SchedulerConfig, TempoHandle, ToneSynth};
use sg_ir::{NoteId, Pattern, PitchTable, Tone};

const BUFFER: usize = 512;

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    for voices in [1usize, 8, 32, 128] {
        let mut synth = ToneSynth::new(48_000);
        for v in 0..voices {
            synth.schedule(Tone {
                frequency: 110.0 + v as f32 * 7.0,
                start: 0.0,
                duration: 1.0e9,
            });
        }
        let mut out = vec![Frame::silence(); BUFFER];

        group.bench_with_input(BenchmarkId::from_parameter(voices), &voices, |b, _| {
            b.iter(|| {
                synth.render_into(&mut out);
                black_box(&out);
            });
        });
    }
    group.finish();
}

/// Sink that swallows tones; only the clock matters.
struct Clock {
    now: f64,
}

impl AudioSink for Clock {
    fn now(&self) -> f64 {
        self.now
    }
    fn state(&self) -> AudioState {
        AudioState::Running
    }
    fn resume(&mut self) {}
    fn schedule_tone(&mut self, tone: Tone) {
        black_box(tone);
    }
    fn set_gain(&mut self, _gain: f32) {}
}

struct NoHost;

impl LoopHost for NoHost {
    fn arm_beat_timer(&mut self, _delay: Duration) {}
    fn cancel_beat_timer(&mut self) {}
    fn request_frame(&mut self) {}
}

fn bench_beat_loop(c: &mut Criterion) {
    let pitches = PitchTable::standard();
    let mut pattern = Pattern::new(32);
    for beat in 0..32 {
        for note in (0..pitches.len()).step_by(6) {
            pattern.insert(beat, NoteId(note as u8));
        }
    }

    c.bench_function("beat_loop_dense_pattern", |b| {
        let mut scheduler = BeatScheduler::new(SchedulerConfig::default(), TempoHandle::new(240.0));
        let mut clock = Clock { now: 0.0 };
        scheduler.toggle_playback(&pattern, &pitches, &mut clock, &mut NoHost);
        b.iter(|| {
            clock.now += 0.025;
            scheduler.run_beat_loop(&pattern, &pitches, &mut clock, &mut NoHost);
        });
    });
}

criterion_group!(benches, bench_render, bench_beat_loop);
criterion_main!(benches);
