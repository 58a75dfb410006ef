//! Selection ranges over the surface tree.

use crate::surface::tree::NodeId;

/// One end of a selection: a container node and an offset inside it.
///
/// For text containers the offset counts characters; for elements it counts
/// children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub container: NodeId,
    pub offset: usize,
}

impl Boundary {
    pub fn new(container: NodeId, offset: usize) -> Self {
        Self { container, offset }
    }
}

/// Live selection range; valid only until the surface is restructured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub start: Boundary,
    pub end: Boundary,
}

impl SelectionRange {
    pub fn new(start: Boundary, end: Boundary) -> Self {
        Self { start, end }
    }

    /// Caret: a range whose start and end coincide.
    pub fn caret(at: Boundary) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}
