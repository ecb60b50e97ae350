//! Transport action dispatch.

use sg_ir::{Action, Event, TransportState, MAX_BPM, MAX_VOLUME};

use crate::bus::EventBus;

/// Owns the [`TransportState`] and applies [`Action`]s to it.
///
/// Every field write publishes `<field>Changed` before `dispatch` returns.
/// Unknown or malformed actions log a warning and change nothing.
#[derive(Debug)]
pub struct Transport {
    state: TransportState,
    defaults: TransportState,
    bus: EventBus,
}

impl Transport {
    /// `defaults` are the values written by [`Action::Init`].
    pub fn new(defaults: TransportState, bus: EventBus) -> Self {
        Self {
            state: defaults,
            defaults,
            bus,
        }
    }

    pub fn state(&self) -> &TransportState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Init => {
                self.write_volume(self.defaults.volume);
                self.write_bpm(self.defaults.bpm);
            }
            Action::SetBpm(bpm) => {
                if TransportState::is_valid_bpm(bpm) {
                    self.write_bpm(bpm);
                } else {
                    log::warn!(target: "transport", "ignoring {} with tempo {} outside (0, {}]", action.name(), bpm, MAX_BPM);
                }
            }
            Action::SetVolume(volume) => {
                if TransportState::is_valid_volume(volume) {
                    self.write_volume(volume);
                } else {
                    log::warn!(target: "transport", "ignoring {} with gain {} outside 0..={}", action.name(), volume, MAX_VOLUME);
                }
            }
        }
    }

    /// Dispatch by action name, as input widgets do.
    pub fn dispatch_named(&mut self, name: &str, payload: Option<f64>) {
        match Action::from_name(name, payload) {
            Some(action) => self.dispatch(action),
            None if matches!(name, "setBpm" | "setVolume") => {
                log::warn!(target: "transport", "action {} needs a value", name);
            }
            None => log::warn!(target: "transport", "action {} doesn't exist", name),
        }
    }

    fn write_bpm(&mut self, bpm: f64) {
        self.state.bpm = bpm;
        self.bus.publish(&Event::BpmChanged(bpm));
    }

    fn write_volume(&mut self, volume: f32) {
        self.state.volume = volume;
        self.bus.publish(&Event::VolumeChanged(volume));
    }
}
