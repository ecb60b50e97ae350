//! Core data types for the stepgrid sequencer.
//!
//! This crate holds the plain data shared by every other stepgrid crate:
//! the pitch table, the beat × pitch grid, the events announced on the
//! bus, transport parameters and the timing records the scheduler
//! produces. Nothing here schedules or renders anything.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod event;
mod pattern;
mod pitch;
mod timing;
mod transport;

pub use event::{Event, EventKind, NoteCell};
pub use pattern::{Pattern, MAX_TOTAL_BEATS, TOTAL_BEATS};
pub use pitch::{NoteId, Pitch, PitchTable, PitchTableError, MAX_NAME_LEN};
pub use timing::{step_interval, PlaybackCursor, ScheduledBeat, Tone, NOTE_DURATION, STEPS_PER_BEAT};
pub use transport::{Action, TransportState, DEFAULT_BPM, DEFAULT_VOLUME, MAX_BPM, MAX_VOLUME};
