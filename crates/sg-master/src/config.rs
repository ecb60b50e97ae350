//! Settings: embedded defaults merged with an optional user file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use sg_engine::{SchedulerConfig, SequencerConfig};
use sg_ir::{
    PitchTable, PitchTableError, TransportState, MAX_BPM, MAX_TOTAL_BEATS, MAX_VOLUME, NOTE_DURATION, TOTAL_BEATS,
};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

/// Offline render rate when nothing else is configured.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
    Pitches(PitchTableError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "could not read {}: {}", path.display(), e),
            ConfigError::Parse(e) => write!(f, "malformed config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
            ConfigError::Pitches(e) => write!(f, "invalid pitch table: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<PitchTableError> for ConfigError {
    fn from(e: PitchTableError) -> Self {
        ConfigError::Pitches(e)
    }
}

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    scheduler: SchedulerSection,
    #[serde(default)]
    transport: TransportSection,
    #[serde(default)]
    audio: AudioSection,
    pitches: Option<Vec<PitchEntry>>,
}

#[derive(Deserialize, Default)]
struct SchedulerSection {
    lookahead_ms: Option<u64>,
    schedule_ahead: Option<f64>,
    total_beats: Option<usize>,
    note_duration: Option<f64>,
}

#[derive(Deserialize, Default)]
struct TransportSection {
    bpm: Option<f64>,
    volume: Option<f32>,
}

#[derive(Deserialize, Default)]
struct AudioSection {
    sample_rate: Option<u32>,
}

#[derive(Deserialize, Clone)]
struct PitchEntry {
    name: String,
    frequency: f32,
}

/// Resolved, validated settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub lookahead: Duration,
    pub schedule_ahead: f64,
    pub total_beats: usize,
    pub note_duration: f64,
    pub bpm: f64,
    pub volume: f32,
    pub sample_rate: u32,
    pitches: PitchTable,
}

impl Settings {
    /// Embedded defaults, overridden by `<config dir>/stepgrid/config.toml`
    /// when it exists. A user file that can't be read, parsed or validated
    /// is reported and ignored.
    pub fn load() -> Self {
        let defaults = Self::default();
        let Some(path) = user_config_path() else {
            return defaults;
        };
        if !path.exists() {
            return defaults;
        }
        match Self::from_path(&path) {
            Ok(settings) => {
                log::info!(target: "config", "loaded {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!(target: "config", "ignoring {}: {}", path.display(), e);
                defaults
            }
        }
    }

    /// Embedded defaults overridden by the file at `path`.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml(&contents)
    }

    /// Embedded defaults overridden by `contents`.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let mut base = embedded();
        let user: ConfigFile = toml::from_str(contents)?;
        merge(&mut base, user);
        resolve(base)
    }

    pub fn pitch_table(&self) -> &PitchTable {
        &self.pitches
    }

    /// Initial transport values.
    pub fn transport(&self) -> TransportState {
        TransportState {
            bpm: self.bpm,
            volume: self.volume,
        }
    }

    pub fn sequencer_config(&self) -> SequencerConfig {
        SequencerConfig {
            scheduler: SchedulerConfig {
                lookahead: self.lookahead,
                schedule_ahead: self.schedule_ahead,
                note_duration: self.note_duration,
            },
            total_beats: self.total_beats,
            transport: self.transport(),
        }
    }
}

impl Default for Settings {
    /// The embedded `config.toml`.
    fn default() -> Self {
        resolve(embedded()).unwrap_or_else(|e| {
            log::error!(target: "config", "embedded config rejected: {}", e);
            fallback()
        })
    }
}

fn embedded() -> ConfigFile {
    toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|e| {
        log::error!(target: "config", "embedded config malformed: {}", e);
        ConfigFile::default()
    })
}

fn fallback() -> Settings {
    let scheduler = SchedulerConfig::default();
    let transport = TransportState::default();
    Settings {
        lookahead: scheduler.lookahead,
        schedule_ahead: scheduler.schedule_ahead,
        total_beats: TOTAL_BEATS,
        note_duration: NOTE_DURATION,
        bpm: transport.bpm,
        volume: transport.volume,
        sample_rate: DEFAULT_SAMPLE_RATE,
        pitches: PitchTable::standard(),
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("stepgrid").join("config.toml"))
}

fn merge(base: &mut ConfigFile, user: ConfigFile) {
    let (b, u) = (&mut base.scheduler, user.scheduler);
    if u.lookahead_ms.is_some() {
        b.lookahead_ms = u.lookahead_ms;
    }
    if u.schedule_ahead.is_some() {
        b.schedule_ahead = u.schedule_ahead;
    }
    if u.total_beats.is_some() {
        b.total_beats = u.total_beats;
    }
    if u.note_duration.is_some() {
        b.note_duration = u.note_duration;
    }

    if user.transport.bpm.is_some() {
        base.transport.bpm = user.transport.bpm;
    }
    if user.transport.volume.is_some() {
        base.transport.volume = user.transport.volume;
    }
    if user.audio.sample_rate.is_some() {
        base.audio.sample_rate = user.audio.sample_rate;
    }
    if user.pitches.is_some() {
        base.pitches = user.pitches;
    }
}

fn resolve(file: ConfigFile) -> Result<Settings, ConfigError> {
    let fb = fallback();
    let lookahead_ms = file.scheduler.lookahead_ms.unwrap_or(fb.lookahead.as_millis() as u64);
    let schedule_ahead = file.scheduler.schedule_ahead.unwrap_or(fb.schedule_ahead);
    let total_beats = file.scheduler.total_beats.unwrap_or(fb.total_beats);
    let note_duration = file.scheduler.note_duration.unwrap_or(fb.note_duration);
    let bpm = file.transport.bpm.unwrap_or(fb.bpm);
    let volume = file.transport.volume.unwrap_or(fb.volume);
    let sample_rate = file.audio.sample_rate.unwrap_or(fb.sample_rate);

    if lookahead_ms == 0 {
        return Err(ConfigError::Invalid("scheduler.lookahead_ms must be positive".into()));
    }
    if !(schedule_ahead.is_finite() && schedule_ahead > 0.0) {
        return Err(ConfigError::Invalid(format!("scheduler.schedule_ahead {} must be positive", schedule_ahead)));
    }
    if total_beats == 0 || total_beats > MAX_TOTAL_BEATS {
        return Err(ConfigError::Invalid(format!(
            "scheduler.total_beats {} must be within 1..={}",
            total_beats, MAX_TOTAL_BEATS
        )));
    }
    if !(note_duration.is_finite() && note_duration > 0.0) {
        return Err(ConfigError::Invalid(format!("scheduler.note_duration {} must be positive", note_duration)));
    }
    if !TransportState::is_valid_bpm(bpm) {
        return Err(ConfigError::Invalid(format!("transport.bpm {} must be within (0, {}]", bpm, MAX_BPM)));
    }
    if !TransportState::is_valid_volume(volume) {
        return Err(ConfigError::Invalid(format!("transport.volume {} must be within 0..={}", volume, MAX_VOLUME)));
    }
    if sample_rate == 0 {
        return Err(ConfigError::Invalid("audio.sample_rate must be positive".into()));
    }

    let pitches = match file.pitches {
        Some(entries) => {
            PitchTable::from_entries(entries.iter().map(|p| (p.name.as_str(), p.frequency)))?
        }
        None => PitchTable::standard(),
    };

    Ok(Settings {
        lookahead: Duration::from_millis(lookahead_ms),
        schedule_ahead,
        total_beats,
        note_duration,
        bpm,
        volume,
        sample_rate,
        pitches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_matches_built_in_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.sequencer_config(), SequencerConfig::default());
        assert_eq!(settings.sample_rate, DEFAULT_SAMPLE_RATE);
        assert_eq!(settings.pitch_table().len(), 73);
    }

    #[test]
    fn user_fields_override_defaults() {
        let settings = Settings::from_toml("[transport]\nbpm = 90.0\n").unwrap();
        assert_eq!(settings.bpm, 90.0);
        assert_eq!(settings.volume, 0.1);
        assert_eq!(settings.lookahead, Duration::from_millis(25));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = Settings::from_toml("[transport]\nvolume = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = Settings::from_toml("[scheduler]\ntotal_beats = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = Settings::from_toml("[transport]\nbpm = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = Settings::from_toml("[transport]\nbpm = 1e20\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = Settings::from_toml("[scheduler]\ntotal_beats = 100000000000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Settings::from_toml("[transport\nbpm = 90").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn custom_pitch_table_replaces_standard() {
        let src = r#"
[[pitches]]
name = "Lo"
frequency = 100.0

[[pitches]]
name = "Hi"
frequency = 200.0
"#;
        let settings = Settings::from_toml(src).unwrap();
        let table = settings.pitch_table();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("Hi").map(|n| table.frequency(n)), Some(200.0));
    }

    #[test]
    fn descending_pitch_table_is_rejected() {
        let src = "[[pitches]]\nname = \"A\"\nfrequency = 200.0\n\n[[pitches]]\nname = \"B\"\nfrequency = 100.0\n";
        assert!(matches!(Settings::from_toml(src), Err(ConfigError::Pitches(_))));
    }

    #[test]
    fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[audio]\nsample_rate = 22050\n").unwrap();
        assert_eq!(Settings::from_path(&path).unwrap().sample_rate, 22050);

        let missing = dir.path().join("nope.toml");
        assert!(matches!(Settings::from_path(&missing), Err(ConfigError::Io(..))));
    }
}
