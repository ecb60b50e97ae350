//! Pattern ownership and change announcements.

use alloc::vec::Vec;
use sg_ir::{Event, NoteCell, NoteId, Pattern};

use crate::bus::EventBus;

/// Owns the pattern grid and publishes `NoteAdded`/`NoteRemoved` for every
/// membership change.
///
/// Beat indices are not validated beyond the grid's own debug assertions;
/// callers keep them in range.
#[derive(Debug)]
pub struct PatternStore {
    pattern: Pattern,
    bus: EventBus,
}

impl PatternStore {
    pub fn new(total_beats: usize, bus: EventBus) -> Self {
        Self {
            pattern: Pattern::new(total_beats),
            bus,
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn total_beats(&self) -> usize {
        self.pattern.total_beats()
    }

    pub fn is_active(&self, beat: usize, note: NoteId) -> bool {
        self.pattern.is_active(beat, note)
    }

    /// Flip `note` at `beat`. Returns whether it is now active.
    pub fn toggle(&mut self, beat: usize, note: NoteId) -> bool {
        if self.is_active(beat, note) {
            self.remove(beat, note);
            false
        } else {
            self.add(beat, note);
            true
        }
    }

    /// Remove every note, announcing each removal.
    pub fn clear(&mut self) {
        let cells: Vec<_> = self.pattern.active_cells().collect();
        for (beat, note) in cells {
            self.remove(beat, note);
        }
    }

    /// Swap in a whole pattern. Old cells are announced as removed, then
    /// the new cells as added, so listeners end up in sync.
    pub fn replace(&mut self, pattern: Pattern) {
        self.clear();
        self.pattern = Pattern::new(pattern.total_beats());
        for (beat, note) in pattern.active_cells() {
            self.add(beat, note);
        }
    }

    fn add(&mut self, beat: usize, note: NoteId) {
        self.pattern.insert(beat, note);
        self.bus.publish(&Event::NoteAdded(NoteCell { beat, note }));
    }

    fn remove(&mut self, beat: usize, note: NoteId) {
        self.pattern.remove(beat, note);
        self.bus.publish(&Event::NoteRemoved(NoteCell { beat, note }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use sg_ir::{EventKind, PitchTable};

    fn store() -> (PatternStore, EventBus) {
        let bus = EventBus::new();
        (PatternStore::new(32, bus.clone()), bus)
    }

    #[test]
    fn toggle_a4_at_beat_two() {
        let (mut store, bus) = store();
        let log = bus.record(&[EventKind::NoteAdded, EventKind::NoteRemoved]);
        let a4 = PitchTable::standard().lookup("A4").unwrap();

        assert!(store.toggle(2, a4));
        assert!(store.is_active(2, a4));
        assert!(!store.toggle(2, a4));
        assert!(!store.is_active(2, a4));

        let cell = NoteCell { beat: 2, note: a4 };
        assert_eq!(*log.borrow(), vec![Event::NoteAdded(cell), Event::NoteRemoved(cell)]);
    }

    #[test]
    fn double_toggle_restores_grid() {
        let (mut store, _bus) = store();
        store.toggle(5, NoteId(10));
        let before = store.pattern().clone();
        store.toggle(7, NoteId(3));
        store.toggle(7, NoteId(3));
        assert_eq!(*store.pattern(), before);
    }

    #[test]
    fn clear_announces_each_removal() {
        let (mut store, bus) = store();
        store.toggle(0, NoteId(1));
        store.toggle(3, NoteId(2));
        let log = bus.record(&[EventKind::NoteRemoved]);
        store.clear();
        assert!(store.pattern().is_empty());
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn replace_removes_then_adds() {
        let (mut store, bus) = store();
        store.toggle(0, NoteId(1));
        let log = bus.record(&[EventKind::NoteAdded, EventKind::NoteRemoved]);

        let mut next = Pattern::new(16);
        next.insert(4, NoteId(9));
        store.replace(next.clone());

        assert_eq!(*store.pattern(), next);
        assert_eq!(store.total_beats(), 16);
        assert_eq!(
            *log.borrow(),
            vec![
                Event::NoteRemoved(NoteCell { beat: 0, note: NoteId(1) }),
                Event::NoteAdded(NoteCell { beat: 4, note: NoteId(9) }),
            ]
        );
    }
}
