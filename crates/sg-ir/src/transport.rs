//! Tempo and volume parameters and the actions that change them.

/// Initial tempo in BPM.
pub const DEFAULT_BPM: f64 = 120.0;

/// Highest accepted tempo in BPM.
pub const MAX_BPM: f64 = 1000.0;

/// Initial master gain.
pub const DEFAULT_VOLUME: f32 = 0.1;

/// Highest accepted master gain.
pub const MAX_VOLUME: f32 = 1.0;

/// Playback parameters. Always mutated through an [`Action`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransportState {
    /// Quarter notes per minute, in `(0.0, MAX_BPM]`
    pub bpm: f64,
    /// Master gain in `0.0..=MAX_VOLUME`
    pub volume: f32,
}

impl TransportState {
    pub fn is_valid_bpm(bpm: f64) -> bool {
        bpm > 0.0 && bpm <= MAX_BPM
    }

    pub fn is_valid_volume(volume: f32) -> bool {
        (0.0..=MAX_VOLUME).contains(&volume)
    }
}

impl Default for TransportState {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            volume: DEFAULT_VOLUME,
        }
    }
}

/// Named transport mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Write the initial volume, then the initial tempo
    Init,
    SetBpm(f64),
    SetVolume(f32),
}

impl Action {
    /// Build an action from its string name and optional numeric payload.
    ///
    /// Returns `None` for an unknown name or a missing payload.
    pub fn from_name(name: &str, payload: Option<f64>) -> Option<Self> {
        match (name, payload) {
            ("init", _) => Some(Action::Init),
            ("setBpm", Some(bpm)) => Some(Action::SetBpm(bpm)),
            ("setVolume", Some(volume)) => Some(Action::SetVolume(volume as f32)),
            _ => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Action::Init => "init",
            Action::SetBpm(_) => "setBpm",
            Action::SetVolume(_) => "setVolume",
        }
    }
}
