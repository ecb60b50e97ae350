use std::time::{Duration, Instant};

use sg_audio::OfflineSink;
use sg_engine::{AudioSink, DisplaySink, PlayState};
use sg_master::{Controller, NoteCell, Settings};

#[derive(Default)]
struct Highlights {
    beats: Vec<usize>,
    cells: usize,
}

impl DisplaySink for Highlights {
    fn highlight_beat(&mut self, beat: usize) {
        self.beats.push(beat);
    }
    fn draw_note_cell(&mut self, _cell: NoteCell) {
        self.cells += 1;
    }
    fn clear_note_cell(&mut self, _cell: NoteCell) {
        self.cells -= 1;
    }
}

fn controller() -> Controller<OfflineSink, Highlights> {
    let mut settings = Settings::default();
    settings.sample_rate = 8000;
    Controller::with_audio(settings, OfflineSink::new(8000), Highlights::default())
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn play_arms_both_loops() {
    let mut c = controller();
    let t0 = Instant::now();
    assert_eq!(c.play_pause(t0), PlayState::Playing);
    assert_eq!(c.next_wakeup(), Some(t0 + ms(25)));
    assert!(c.frame_pending());

    assert!(!c.poll(t0 + ms(10)));
    assert!(c.poll(t0 + ms(25)));
    assert_eq!(c.next_wakeup(), Some(t0 + ms(50)));
}

#[test]
fn draw_follows_the_audio_clock() {
    let mut c = controller();
    let t0 = Instant::now();
    c.play_pause(t0);

    // 0.13s of audio: beats 0 (0.0s) and 1 (0.125s) have started.
    c.sequencer().audio_mut().render(1040);
    c.poll(t0 + ms(25));
    assert!(c.frame());
    assert_eq!(c.display().beats, vec![1]);

    // Same beat again: no redraw.
    assert!(c.frame());
    assert_eq!(c.display().beats, vec![1]);
}

#[test]
fn stop_cancels_timer_and_ends_draw_loop() {
    let mut c = controller();
    let t0 = Instant::now();
    c.play_pause(t0);
    assert_eq!(c.play_pause(t0 + ms(5)), PlayState::Stopped);
    assert_eq!(c.next_wakeup(), None);
    assert!(!c.poll(t0 + ms(100)));

    // The frame requested at start runs once, then stops asking.
    assert!(c.frame());
    assert!(!c.frame());
}

#[test]
fn transport_and_pattern_edits_reach_sinks() {
    let mut c = controller();
    c.set_volume(0.4);
    c.dispatch_named("setBpm", Some(100.0));
    c.dispatch_named("setBpm", Some(-3.0));
    assert_eq!(c.volume(), 0.4);
    assert_eq!(c.bpm(), 100.0);
    assert_eq!(c.sequencer().scheduler().tempo().get(), 100.0);

    assert_eq!(c.toggle_named(3, "A4"), Some(true));
    assert_eq!(c.toggle_named(4, "G2"), Some(true));
    assert_eq!(c.display().cells, 2);
    c.clear_pattern();
    assert_eq!(c.display().cells, 0);
    assert!(c.pattern().is_empty());
}

#[test]
fn pattern_files_round_trip_through_the_controller() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("groove.toml");

    let mut c = controller();
    c.toggle_named(0, "C4");
    c.toggle_named(8, "Eb4");
    c.save_pattern_file(&path).unwrap();

    let mut other = controller();
    other.load_pattern_file(&path).unwrap();
    assert_eq!(other.pattern(), c.pattern());
    assert_eq!(other.display().cells, 2);

    std::fs::write(&path, "total_beats = 4\n[[notes]]\nbeat = 9\nnote = \"C4\"\n").unwrap();
    assert!(other.load_pattern_file(&path).is_err());
    assert_eq!(other.pattern(), c.pattern());
}

#[test]
fn exports_wav() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.wav");

    let mut c = controller();
    c.toggle_named(0, "A4");
    c.render_to_wav(&path, 0.5).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().sample_rate, 8000);
    assert_eq!(reader.len(), 8000);
    assert_eq!(c.sequencer().audio().now(), 0.0);
}
