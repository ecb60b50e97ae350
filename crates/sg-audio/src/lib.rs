//! Audio sinks for the stepgrid sequencer.
//!
//! [`CpalSink`] plays through the default output device; [`OfflineSink`]
//! renders into memory on demand. Both are driven by the same
//! [`sg_engine::ToneSynth`].

mod cpal_backend;
mod error;
mod offline;

pub use cpal_backend::{CpalSink, TONE_QUEUE_CAPACITY};
pub use error::AudioError;
pub use offline::OfflineSink;
