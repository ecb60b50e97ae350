//! FIFO of scheduled beats awaiting display.

use alloc::collections::VecDeque;
use sg_ir::ScheduledBeat;

/// Beats handed to the audio sink, oldest first.
///
/// The beat loop only appends; the draw loop only removes from the front.
/// Times are increasing, so the due prefix is always at the front.
#[derive(Clone, Debug, Default)]
pub struct DrawQueue {
    entries: VecDeque<ScheduledBeat>,
}

impl DrawQueue {
    pub fn new() -> Self {
        Self { entries: VecDeque::new() }
    }

    pub fn push(&mut self, entry: ScheduledBeat) {
        self.entries.push_back(entry);
    }

    /// Remove every front entry with `time < now` and return the beat of
    /// the last one removed.
    pub fn drain_due(&mut self, now: f64) -> Option<usize> {
        let mut last = None;
        while let Some(entry) = self.entries.front() {
            if entry.time >= now {
                break;
            }
            last = Some(entry.beat);
            self.entries.pop_front();
        }
        last
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledBeat> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
