//! Events announced on the bus.

use crate::pitch::NoteId;

/// A single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NoteCell {
    pub beat: usize,
    pub note: NoteId,
}

/// A state change announced to subscribers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// Tempo written (BPM)
    BpmChanged(f64),
    /// Master gain written
    VolumeChanged(f32),
    NoteAdded(NoteCell),
    NoteRemoved(NoteCell),
}

/// Subscription key for an [`Event`] variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    BpmChanged,
    VolumeChanged,
    NoteAdded,
    NoteRemoved,
}

impl Event {
    pub const fn kind(&self) -> EventKind {
        match self {
            Event::BpmChanged(_) => EventKind::BpmChanged,
            Event::VolumeChanged(_) => EventKind::VolumeChanged,
            Event::NoteAdded(_) => EventKind::NoteAdded,
            Event::NoteRemoved(_) => EventKind::NoteRemoved,
        }
    }
}

impl EventKind {
    /// Wire name, as used in log lines.
    pub const fn name(self) -> &'static str {
        match self {
            EventKind::BpmChanged => "bpmChanged",
            EventKind::VolumeChanged => "volumeChanged",
            EventKind::NoteAdded => "noteAdded",
            EventKind::NoteRemoved => "noteRemoved",
        }
    }
}
