//! The beat × pitch grid.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::pitch::NoteId;

/// Default pattern length in beats (two bars of sixteenths).
pub const TOTAL_BEATS: usize = 32;

/// Longest pattern accepted from files and settings.
pub const MAX_TOTAL_BEATS: usize = 256;

/// A fixed-length sequence of beats, each holding a set of active notes.
///
/// Beat indices must be in `0..total_beats()`; anything else is a caller
/// bug and panics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    beats: Vec<BTreeSet<NoteId>>,
}

impl Pattern {
    /// Create an empty pattern with `total_beats` beats.
    pub fn new(total_beats: usize) -> Self {
        Self {
            beats: (0..total_beats).map(|_| BTreeSet::new()).collect(),
        }
    }

    pub fn total_beats(&self) -> usize {
        self.beats.len()
    }

    pub fn is_active(&self, beat: usize, note: NoteId) -> bool {
        debug_assert!(beat < self.beats.len());
        self.beats[beat].contains(&note)
    }

    /// Add `note` to `beat`. Returns false if it was already there.
    pub fn insert(&mut self, beat: usize, note: NoteId) -> bool {
        debug_assert!(beat < self.beats.len());
        self.beats[beat].insert(note)
    }

    /// Remove `note` from `beat`. Returns false if it was not there.
    pub fn remove(&mut self, beat: usize, note: NoteId) -> bool {
        debug_assert!(beat < self.beats.len());
        self.beats[beat].remove(&note)
    }

    /// Active notes of `beat`, lowest pitch first.
    pub fn notes(&self, beat: usize) -> impl Iterator<Item = NoteId> + '_ {
        debug_assert!(beat < self.beats.len());
        self.beats[beat].iter().copied()
    }

    /// Every active `(beat, note)` cell, beat-major.
    pub fn active_cells(&self) -> impl Iterator<Item = (usize, NoteId)> + '_ {
        self.beats
            .iter()
            .enumerate()
            .flat_map(|(beat, notes)| notes.iter().map(move |&n| (beat, n)))
    }

    pub fn is_empty(&self) -> bool {
        self.beats.iter().all(|b| b.is_empty())
    }

    pub fn clear(&mut self) {
        for beat in &mut self.beats {
            beat.clear();
        }
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new(TOTAL_BEATS)
    }
}
