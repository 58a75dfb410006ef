//! Cursor preservation across content commits.
//!
//! # Responsibility
//! - Capture the live selection before a commit.
//! - Rebuild it afterwards, or park the caret at the end of content when the
//!   captured nodes are gone.
//!
//! # Invariants
//! - Restore failures are swallowed; the caller only learns the outcome.
//! - No selection means nothing is captured and nothing is restored.

use crate::surface::{Boundary, NodeId, SelectionRange, Surface};
use log::warn;

/// Raw container/offset pairs of a selection at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub start_container: NodeId,
    pub start_offset: usize,
    pub end_container: NodeId,
    pub end_offset: usize,
}

impl SelectionSnapshot {
    pub fn to_range(self) -> SelectionRange {
        SelectionRange::new(
            Boundary::new(self.start_container, self.start_offset),
            Boundary::new(self.end_container, self.end_offset),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
    /// Captured nodes no longer resolve; caret collapsed to end of content.
    MovedToEnd,
}

/// Captures the live selection, if any.
pub fn capture(surface: &Surface) -> Option<SelectionSnapshot> {
    surface.selection().map(|range| SelectionSnapshot {
        start_container: range.start.container,
        start_offset: range.start.offset,
        end_container: range.end.container,
        end_offset: range.end.offset,
    })
}

/// Re-applies `snapshot`, falling back to a caret at end of content.
pub fn restore(surface: &mut Surface, snapshot: &SelectionSnapshot) -> RestoreOutcome {
    match surface.set_selection(snapshot.to_range()) {
        Ok(()) => RestoreOutcome::Restored,
        Err(err) => {
            warn!("event=cursor_restore module=editor status=fallback reason={err}");
            surface.collapse_to_end();
            RestoreOutcome::MovedToEnd
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{capture, restore, RestoreOutcome};
    use crate::surface::{Boundary, SelectionRange, Surface};

    #[test]
    fn restore_reapplies_captured_offsets() {
        let mut surface = Surface::with_content("<p>hello world</p>");
        let at = surface.find_text("hello").unwrap();
        let caret = Boundary::new(at.container, 5);
        surface.set_selection(SelectionRange::caret(caret)).unwrap();

        let snapshot = capture(&surface).unwrap();
        surface.clear_selection();
        assert_eq!(restore(&mut surface, &snapshot), RestoreOutcome::Restored);
        assert_eq!(surface.selection().unwrap().start, caret);
    }

    #[test]
    fn restore_after_replace_moves_caret_to_end() {
        let mut surface = Surface::with_content("<p>a</p><p>b</p>");
        let at = surface.find_text("a").unwrap();
        surface.set_selection(SelectionRange::caret(at)).unwrap();
        let snapshot = capture(&surface).unwrap();

        surface.replace_content("<p>a</p><p>b</p>");
        assert_eq!(restore(&mut surface, &snapshot), RestoreOutcome::MovedToEnd);
        let end = Boundary::new(surface.root(), 2);
        assert_eq!(surface.selection(), Some(SelectionRange::caret(end)));
    }

    #[test]
    fn nothing_is_captured_without_a_selection() {
        let surface = Surface::with_content("<p>a</p>");
        assert!(capture(&surface).is_none());
    }
}
