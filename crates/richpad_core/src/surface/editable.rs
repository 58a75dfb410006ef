//! Live editable region and its host editing primitives.

use crate::surface::markup::{parse_fragment, serialize_children};
use crate::surface::selection::{Boundary, SelectionRange};
use crate::surface::tree::{char_to_byte, Element, MarkupTree, NodeId, NodeKind, TreeQuery};
use crate::surface::{SurfaceError, SurfaceResult};

const HISTORY_LIMIT: usize = 100;

/// Inline formats toggled by the bold/italic/underline commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineFormat {
    Bold,
    Italic,
    Underline,
}

impl InlineFormat {
    /// Tag written when applying the format.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Bold => "b",
            Self::Italic => "i",
            Self::Underline => "u",
        }
    }

    /// Whether an existing element already carries this format.
    pub fn matches(self, tag: &str) -> bool {
        match self {
            Self::Bold => matches!(tag, "b" | "strong"),
            Self::Italic => matches!(tag, "i" | "em"),
            Self::Underline => tag == "u",
        }
    }
}

#[derive(Debug, Clone, Default)]
struct EditHistory {
    undo: Vec<String>,
    redo: Vec<String>,
}

/// The content-editable region.
#[derive(Debug, Clone)]
pub struct Surface {
    tree: MarkupTree,
    root: NodeId,
    selection: Option<SelectionRange>,
    focused: bool,
    history: EditHistory,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    pub fn new() -> Self {
        let mut tree = MarkupTree::new();
        let root = tree.create_element(Element::new("div").with_attr("contenteditable", "true"));
        Self {
            tree,
            root,
            selection: None,
            focused: false,
            history: EditHistory::default(),
        }
    }

    pub fn with_content(markup: &str) -> Self {
        let mut surface = Self::new();
        surface.replace_content(markup);
        surface
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn tree(&self) -> &MarkupTree {
        &self.tree
    }

    /// Direct structural access, used by the table editor.
    pub fn tree_mut(&mut self) -> &mut MarkupTree {
        &mut self.tree
    }

    /// Serialized inner markup of the region.
    pub fn raw_content(&self) -> String {
        serialize_children(&self.tree, self.root)
    }

    pub fn text_content(&self) -> String {
        self.tree.text_content(self.root)
    }

    /// Bulk-replaces the region's content.
    ///
    /// Every previous node is freed, so selections captured before this call
    /// can no longer be restored. Undo history is left alone.
    pub fn replace_content(&mut self, markup: &str) {
        self.tree.clear_children(self.root);
        for node in parse_fragment(&mut self.tree, markup) {
            // Fresh parse output under the live root cannot fail to attach.
            let _ = self.tree.append_child(self.root, node);
        }
        self.selection = None;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Gives the region input focus.
    ///
    /// The last selection is kept; without one the caret goes to the end.
    pub fn focus(&mut self) {
        self.focused = true;
        if self.selection().is_none() {
            self.collapse_to_end();
        }
    }

    /// Drops focus but remembers the selection for the next `focus`.
    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Current selection, if it still addresses attached nodes.
    pub fn selection(&self) -> Option<SelectionRange> {
        let range = self.selection?;
        let valid = self.check_boundary(range.start).is_ok() && self.check_boundary(range.end).is_ok();
        valid.then_some(range)
    }

    /// Reconstructs a selection from raw boundaries.
    ///
    /// # Errors
    /// - `DetachedNode` when a container is dead or outside the region.
    /// - `OffsetOutOfBounds` when an offset exceeds its container.
    pub fn set_selection(&mut self, range: SelectionRange) -> SurfaceResult<()> {
        self.check_boundary(range.start)?;
        self.check_boundary(range.end)?;
        self.selection = Some(range);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Collapses the caret after the last child of the region.
    pub fn collapse_to_end(&mut self) {
        let end = Boundary::new(self.root, self.tree.children_of(self.root).len());
        self.selection = Some(SelectionRange::caret(end));
    }

    /// Validates that `boundary` addresses an attached position.
    pub fn check_boundary(&self, boundary: Boundary) -> SurfaceResult<()> {
        if !self.tree.is_live(boundary.container) || !self.tree.is_within(boundary.container, self.root)
        {
            return Err(SurfaceError::DetachedNode(boundary.container));
        }
        let max = self
            .tree
            .max_offset(boundary.container)
            .ok_or(SurfaceError::DetachedNode(boundary.container))?;
        if boundary.offset > max {
            return Err(SurfaceError::OffsetOutOfBounds {
                node: boundary.container,
                offset: boundary.offset,
                max,
            });
        }
        Ok(())
    }

    /// Character position of `boundary` within the region's text content.
    pub fn text_position(&self, boundary: Boundary) -> Option<usize> {
        self.check_boundary(boundary).ok()?;
        let before = self.text_before(boundary.container);
        match self.tree.kind(boundary.container)? {
            NodeKind::Text(_) => Some(before + boundary.offset),
            NodeKind::Element(_) => {
                let inner: usize = self.tree.children_of(boundary.container)[..boundary.offset]
                    .iter()
                    .map(|child| self.tree.text_content(*child).chars().count())
                    .sum();
                Some(before + inner)
            }
        }
    }

    /// Boundary at the first occurrence of `needle` in a single text node.
    pub fn find_text(&self, needle: &str) -> Option<Boundary> {
        self.tree.text_nodes(self.root).into_iter().find_map(|node| {
            let text = self.tree.text(node)?;
            let byte_idx = text.find(needle)?;
            Some(Boundary::new(node, text[..byte_idx].chars().count()))
        })
    }

    /// Types `text` at the caret, replacing any selected text.
    pub fn type_text(&mut self, text: &str) -> SurfaceResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.checkpoint();
        self.focus();
        self.delete_selected_text();
        let caret = self.caret();
        let typed = text.chars().count();

        let next = match self.tree.kind(caret.container) {
            Some(NodeKind::Text(_)) => {
                let content = self
                    .tree
                    .text_mut(caret.container)
                    .ok_or(SurfaceError::NotAText(caret.container))?;
                let byte_idx = char_to_byte(content, caret.offset);
                content.insert_str(byte_idx, text);
                Boundary::new(caret.container, caret.offset + typed)
            }
            Some(NodeKind::Element(_)) => {
                let previous = caret
                    .offset
                    .checked_sub(1)
                    .and_then(|idx| self.tree.children_of(caret.container).get(idx).copied())
                    .filter(|node| self.tree.text(*node).is_some());
                match previous {
                    Some(node) => {
                        let content = self.tree.text_mut(node).ok_or(SurfaceError::NotAText(node))?;
                        content.push_str(text);
                        Boundary::new(node, content.chars().count())
                    }
                    None => {
                        let node = self.tree.create_text(text);
                        self.tree.insert_child(caret.container, caret.offset, node)?;
                        Boundary::new(node, typed)
                    }
                }
            }
            None => return Err(SurfaceError::DetachedNode(caret.container)),
        };
        self.selection = Some(SelectionRange::caret(next));
        Ok(())
    }

    /// Inserts parsed markup at the caret, replacing any selected text.
    ///
    /// The caret ends up right after the inserted nodes.
    pub fn insert_markup(&mut self, markup: &str) -> SurfaceResult<()> {
        self.checkpoint();
        self.focus();
        self.delete_selected_text();
        let caret = self.caret();
        let nodes = parse_fragment(&mut self.tree, markup);
        if nodes.is_empty() {
            return Ok(());
        }

        let (parent, index) = match self.tree.kind(caret.container) {
            Some(NodeKind::Text(_)) => {
                let parent = self
                    .tree
                    .parent_of(caret.container)
                    .ok_or(SurfaceError::DetachedNode(caret.container))?;
                let index = self.tree.index_in_parent(caret.container).unwrap_or(0);
                let len = self.tree.max_offset(caret.container).unwrap_or(0);
                if caret.offset == 0 {
                    (parent, index)
                } else {
                    if caret.offset < len {
                        self.tree.split_text(caret.container, caret.offset)?;
                    }
                    (parent, index + 1)
                }
            }
            Some(NodeKind::Element(_)) => (caret.container, caret.offset),
            None => return Err(SurfaceError::DetachedNode(caret.container)),
        };

        for (offset, node) in nodes.iter().enumerate() {
            self.tree.insert_child(parent, index + offset, *node)?;
        }
        self.selection = Some(SelectionRange::caret(Boundary::new(parent, index + nodes.len())));
        Ok(())
    }

    /// Toggles an inline format over the selected text.
    ///
    /// Returns `false` when nothing was selected. When every selected run
    /// already carries the format, the formatting elements are removed;
    /// otherwise each unformatted run is wrapped.
    pub fn toggle_inline(&mut self, format: InlineFormat) -> SurfaceResult<bool> {
        let Some(range) = self.selection() else {
            return Ok(false);
        };
        if range.is_collapsed() {
            return Ok(false);
        }
        let (Some(a), Some(b)) = (self.text_position(range.start), self.text_position(range.end))
        else {
            return Ok(false);
        };
        let segments = self.text_segments(a.min(b), a.max(b));
        if segments.is_empty() {
            return Ok(false);
        }

        let root = self.root;
        let formatted: Vec<Option<NodeId>> = segments
            .iter()
            .map(|(node, _, _)| self.tree.closest_ancestor(*node, root, |tag| format.matches(tag)))
            .collect();
        self.checkpoint();

        if formatted.iter().all(Option::is_some) {
            let mut selected: Vec<NodeId> = Vec::with_capacity(segments.len());
            for (node, start, end) in segments {
                selected.push(self.isolate_run(node, start, end)?);
            }
            let mut unwrapped: Vec<NodeId> = Vec::new();
            for element in formatted.into_iter().flatten() {
                if unwrapped.contains(&element) {
                    continue;
                }
                let Some(shell) = self.tree.element(element).cloned() else {
                    continue;
                };
                let outside: Vec<NodeId> = self
                    .tree
                    .text_nodes(element)
                    .into_iter()
                    .filter(|node| !selected.contains(node))
                    .collect();
                self.tree.unwrap(element)?;
                for node in outside {
                    self.tree.wrap(node, shell.clone())?;
                }
                unwrapped.push(element);
            }
            if let (Some(first), Some(last)) = (selected.first(), selected.last()) {
                let end = self.tree.max_offset(*last).unwrap_or(0);
                self.selection = Some(SelectionRange::new(
                    Boundary::new(*first, 0),
                    Boundary::new(*last, end),
                ));
            }
            return Ok(true);
        }

        let mut covered: Vec<(NodeId, usize)> = Vec::with_capacity(segments.len());
        for ((node, start, end), existing) in segments.into_iter().zip(formatted) {
            if existing.is_some() {
                covered.push((node, start));
                covered.push((node, end));
                continue;
            }
            let middle = self.isolate_run(node, start, end)?;
            self.tree.wrap(middle, Element::new(format.tag()))?;
            let middle_len = self.tree.max_offset(middle).unwrap_or(0);
            covered.push((middle, 0));
            covered.push((middle, middle_len));
        }
        if let (Some((first, start)), Some((last, end))) = (covered.first(), covered.last()) {
            self.selection = Some(SelectionRange::new(
                Boundary::new(*first, *start),
                Boundary::new(*last, *end),
            ));
        }
        Ok(true)
    }

    /// Records the current markup as an undo step and clears redo.
    pub fn checkpoint(&mut self) {
        let current = self.raw_content();
        if self.history.undo.last() != Some(&current) {
            self.history.undo.push(current);
            if self.history.undo.len() > HISTORY_LIMIT {
                self.history.undo.remove(0);
            }
        }
        self.history.redo.clear();
    }

    /// Restores the previous checkpoint. The caret moves to the end.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo.pop() else {
            return false;
        };
        let current = self.raw_content();
        self.history.redo.push(current);
        self.replace_content(&previous);
        self.collapse_to_end();
        true
    }

    /// Re-applies the last undone step. The caret moves to the end.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo.pop() else {
            return false;
        };
        let current = self.raw_content();
        self.history.undo.push(current);
        self.replace_content(&next);
        self.collapse_to_end();
        true
    }

    pub fn clear_history(&mut self) {
        self.history = EditHistory::default();
    }

    fn caret(&self) -> Boundary {
        self.selection()
            .map(|range| range.start)
            .unwrap_or_else(|| Boundary::new(self.root, self.tree.children_of(self.root).len()))
    }

    /// Splits a text node so `[start, end)` becomes a node of its own.
    fn isolate_run(&mut self, node: NodeId, start: usize, end: usize) -> SurfaceResult<NodeId> {
        let len = self.tree.max_offset(node).unwrap_or(0);
        if end < len {
            self.tree.split_text(node, end)?;
        }
        if start > 0 {
            self.tree.split_text(node, start)
        } else {
            Ok(node)
        }
    }

    /// Characters of text preceding `node` in document order.
    fn text_before(&self, node: NodeId) -> usize {
        if node == self.root {
            return 0;
        }
        let mut total = 0;
        for current in self.tree.descendants(self.root) {
            if current == node {
                break;
            }
            if let Some(text) = self.tree.text(current) {
                total += text.chars().count();
            }
        }
        total
    }

    /// Text runs overlapping `[from, to)` as `(node, local_start, local_end)`.
    fn text_segments(&self, from: usize, to: usize) -> Vec<(NodeId, usize, usize)> {
        let mut segments = Vec::new();
        let mut global = 0;
        for node in self.tree.text_nodes(self.root) {
            let len = self.tree.max_offset(node).unwrap_or(0);
            let start = from.max(global);
            let end = to.min(global + len);
            if start < end {
                segments.push((node, start - global, end - global));
            }
            global += len;
        }
        segments
    }

    /// Removes selected text and collapses the caret to the range start.
    fn delete_selected_text(&mut self) {
        let Some(range) = self.selection() else {
            return;
        };
        if range.is_collapsed() {
            return;
        }
        let (Some(a), Some(b)) = (self.text_position(range.start), self.text_position(range.end))
        else {
            return;
        };
        let (from, to) = (a.min(b), a.max(b));

        let mut caret = None;
        let mut global = 0;
        for node in self.tree.text_nodes(self.root) {
            let len = self.tree.max_offset(node).unwrap_or(0);
            let start = from.max(global);
            let end = to.min(global + len);
            if start < end {
                if let Some(content) = self.tree.text_mut(node) {
                    let lo = char_to_byte(content, start - global);
                    let hi = char_to_byte(content, end - global);
                    content.replace_range(lo..hi, "");
                }
            }
            if caret.is_none() && global <= from && from <= global + len {
                caret = Some(Boundary::new(node, from - global));
            }
            global += len;
        }
        let caret = caret.unwrap_or(range.start);
        self.selection = Some(SelectionRange::caret(caret));
    }
}
