//! Display state of the note grid, kept in sync through the bus.

use std::collections::BTreeSet;

use sg_master::{DisplaySink, NoteCell, NoteId};

/// What the grid shows: drawn cells and the highlighted beat column.
#[derive(Debug, Default)]
pub struct GridView {
    highlighted: Option<usize>,
    cells: BTreeSet<(usize, NoteId)>,
}

impl GridView {
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn is_drawn(&self, beat: usize, note: NoteId) -> bool {
        self.cells.contains(&(beat, note))
    }

    pub fn drawn_count(&self) -> usize {
        self.cells.len()
    }
}

impl DisplaySink for GridView {
    fn highlight_beat(&mut self, beat: usize) {
        let previous = self.highlighted.replace(beat);
        log::trace!(target: "grid", "highlight {:?} -> {}", previous, beat);
    }

    fn draw_note_cell(&mut self, cell: NoteCell) {
        self.cells.insert((cell.beat, cell.note));
    }

    fn clear_note_cell(&mut self, cell: NoteCell) {
        self.cells.remove(&(cell.beat, cell.note));
    }
}

/// Bar boundaries: every fourth column.
pub fn is_shaded_column(beat: usize) -> bool {
    beat % 4 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(beat: usize, note: u8) -> NoteCell {
        NoteCell { beat, note: NoteId(note) }
    }

    #[test]
    fn highlight_moves_between_columns() {
        let mut view = GridView::default();
        assert_eq!(view.highlighted(), None);
        view.highlight_beat(3);
        view.highlight_beat(4);
        assert_eq!(view.highlighted(), Some(4));
    }

    #[test]
    fn tracks_drawn_cells() {
        let mut view = GridView::default();
        view.draw_note_cell(cell(0, 45));
        view.draw_note_cell(cell(7, 12));
        view.clear_note_cell(cell(0, 45));
        assert!(!view.is_drawn(0, NoteId(45)));
        assert!(view.is_drawn(7, NoteId(12)));
        assert_eq!(view.drawn_count(), 1);
    }

    #[test]
    fn every_fourth_column_is_shaded() {
        let shaded: Vec<usize> = (0..16).filter(|&b| is_shaded_column(b)).collect();
        assert_eq!(shaded, vec![0, 4, 8, 12]);
    }
}
