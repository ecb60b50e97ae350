//! stepgrid CLI: headless playback and WAV export.
//!
//! Usage:
//!   sg-cli [pattern.toml] [--config file] [--bpm N] [--volume V] [--seconds S] [--wav out.wav]
//!
//! Without a pattern file a built-in demo pattern plays.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use std::{env, process};

use sg_ir::step_interval;
use sg_master::{Controller, DisplaySink, NoteCell, NullDisplay, OfflineSink, Settings};

const USAGE: &str =
    "Usage: sg-cli [pattern.toml] [--config file] [--bpm N] [--volume V] [--seconds S] [--wav out.wav]";

/// Longest sleep between polls while playing.
const FRAME_PERIOD: Duration = Duration::from_millis(16);

const DEMO: &[(usize, &str)] = &[
    (0, "C3"), (0, "C4"), (2, "E4"), (4, "G4"), (6, "C5"),
    (8, "A2"), (8, "A3"), (10, "C4"), (12, "E4"), (14, "A4"),
    (16, "F2"), (16, "F3"), (18, "A3"), (20, "C4"), (22, "F4"),
    (24, "G2"), (24, "G3"), (26, "B3"), (28, "D4"), (30, "G4"),
];

#[derive(Default)]
struct Args {
    pattern: Option<PathBuf>,
    config: Option<PathBuf>,
    bpm: Option<f64>,
    volume: Option<f32>,
    seconds: Option<f64>,
    wav: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().ok_or_else(|| format!("{} needs a value", flag));
        match arg.as_str() {
            "--config" => parsed.config = Some(value("--config")?.into()),
            "--wav" => parsed.wav = Some(value("--wav")?.into()),
            "--bpm" => parsed.bpm = Some(parse_number("--bpm", &value("--bpm")?)?),
            "--volume" => parsed.volume = Some(parse_number("--volume", &value("--volume")?)?),
            "--seconds" => parsed.seconds = Some(parse_number("--seconds", &value("--seconds")?)?),
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
            _ if parsed.pattern.is_none() => parsed.pattern = Some(PathBuf::from(&arg)),
            _ => return Err(format!("unexpected argument {}", arg)),
        }
    }
    Ok(parsed)
}

fn parse_number<T: std::str::FromStr>(flag: &str, s: &str) -> Result<T, String> {
    s.parse().map_err(|_| format!("{}: '{}' is not a number", flag, s))
}

/// Prints the highlighted beat on one terminal line.
struct TerminalDisplay;

impl DisplaySink for TerminalDisplay {
    fn highlight_beat(&mut self, beat: usize) {
        print!("\rBeat: {:02}", beat + 1);
        let _ = std::io::stdout().flush();
    }

    fn draw_note_cell(&mut self, _cell: NoteCell) {}

    fn clear_note_cell(&mut self, _cell: NoteCell) {}
}

fn main() {
    env_logger::init();

    let args = parse_args(env::args().skip(1)).unwrap_or_else(|e| {
        eprintln!("{}", e);
        eprintln!("{}", USAGE);
        process::exit(1);
    });

    let settings = match &args.config {
        Some(path) => Settings::from_path(path).unwrap_or_else(|e| fail(e)),
        None => Settings::load(),
    };

    match &args.wav {
        Some(wav) => {
            let sample_rate = settings.sample_rate;
            let mut ctrl = Controller::with_audio(settings, OfflineSink::new(sample_rate), NullDisplay);
            setup(&mut ctrl, &args);
            render_to_wav(&ctrl, wav, args.seconds);
        }
        None => {
            let mut ctrl = Controller::open(settings, TerminalDisplay).unwrap_or_else(|e| fail(e));
            setup(&mut ctrl, &args);
            play_audio(&mut ctrl, args.seconds);
        }
    }
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("sg-cli: {}", e);
    process::exit(1);
}

fn setup<A, D>(ctrl: &mut Controller<A, D>, args: &Args)
where
    A: sg_master::AudioSink + 'static,
    D: DisplaySink + 'static,
{
    match &args.pattern {
        Some(path) => ctrl.load_pattern_file(path).unwrap_or_else(|e| fail(e)),
        None => {
            for &(beat, name) in DEMO {
                if beat < ctrl.pattern().total_beats() {
                    ctrl.toggle_named(beat, name);
                }
            }
        }
    }
    if let Some(bpm) = args.bpm {
        ctrl.set_bpm(bpm);
    }
    if let Some(volume) = args.volume {
        ctrl.set_volume(volume);
    }

    println!("Beats:    {}", ctrl.pattern().total_beats());
    println!("Notes:    {}", ctrl.pattern().active_cells().count());
    println!("Tempo:    {} BPM", ctrl.bpm());
    println!("Volume:   {}", ctrl.volume());
    println!();
}

/// One pass through the pattern at the current tempo.
fn loop_seconds<A, D>(ctrl: &Controller<A, D>) -> f64
where
    A: sg_master::AudioSink + 'static,
    D: DisplaySink + 'static,
{
    ctrl.pattern().total_beats() as f64 * step_interval(ctrl.bpm())
}

fn play_audio<D: DisplaySink + 'static>(ctrl: &mut Controller<sg_master::CpalSink, D>, seconds: Option<f64>) {
    let start = Instant::now();
    ctrl.play_pause(start);
    println!("Playing...");

    let stop_at = seconds.map(|s| start + Duration::from_secs_f64(s.max(0.0)));
    loop {
        let now = Instant::now();
        if stop_at.is_some_and(|t| now >= t) {
            break;
        }
        ctrl.poll(now);
        ctrl.frame();

        let mut wake = now + FRAME_PERIOD;
        if let Some(deadline) = ctrl.next_wakeup() {
            wake = wake.min(deadline);
        }
        std::thread::sleep(wake.saturating_duration_since(Instant::now()));
    }

    ctrl.play_pause(Instant::now());
    println!("\rDone.          ");
}

fn render_to_wav<A, D>(ctrl: &Controller<A, D>, path: &Path, seconds: Option<f64>)
where
    A: sg_master::AudioSink + 'static,
    D: DisplaySink + 'static,
{
    let seconds = seconds.unwrap_or_else(|| loop_seconds(ctrl));
    println!(
        "Rendering {:.2}s to {} at {} Hz...",
        seconds,
        path.display(),
        ctrl.settings().sample_rate
    );
    ctrl.render_to_wav(path, seconds).unwrap_or_else(|e| fail(e));
    println!("Done.");
}
