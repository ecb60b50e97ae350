//! Playback engine for the stepgrid sequencer.
//!
//! Event bus, pattern store, transport, the look-ahead beat scheduler and
//! the tone synth that renders what it schedules.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bus;
mod draw_queue;
mod frame;
mod pattern_store;
pub mod scheduler;
mod sequencer;
mod sinks;
mod synth;
mod transport;

#[cfg(test)]
mod testing;

pub use bus::{EventBus, SubscriptionId};
pub use draw_queue::DrawQueue;
pub use frame::Frame;
pub use pattern_store::PatternStore;
pub use scheduler::{BeatScheduler, PlayState, SchedulerConfig, TempoHandle};
pub use sequencer::{Sequencer, SequencerConfig};
pub use sinks::{AudioSink, AudioState, DisplaySink, LoopHost, NullDisplay};
pub use synth::{ToneSynth, VoiceKey, VOICE_CAPACITY};
pub use transport::Transport;
