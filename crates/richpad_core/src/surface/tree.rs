//! Arena-backed markup tree.
//!
//! # Responsibility
//! - Store element/text nodes with parent and child links.
//! - Provide the structural queries used by selection restore and the table
//!   editor (`TreeQuery`).
//!
//! # Invariants
//! - A freed node's id stays dead forever: its slot may be recycled, but
//!   under a new generation, so a stale id never aliases a new node.
//! - A node has at most one parent and appears once in that parent's children.

use crate::surface::{SurfaceError, SurfaceResult};

/// Handle to one node in a `MarkupTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

/// Element tag plus ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeSlot {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Read-only structural queries over a markup tree.
///
/// Table lookups and selection checks only need these, so they can run
/// against any tree representation that implements them.
pub trait TreeQuery {
    fn parent_of(&self, node: NodeId) -> Option<NodeId>;
    fn children_of(&self, node: NodeId) -> &[NodeId];
    /// Lowercase tag for elements, `None` for text or dead nodes.
    fn tag_of(&self, node: NodeId) -> Option<&str>;

    /// Walks from `from` (inclusive) towards the root and returns the first
    /// element whose tag satisfies `matches`. Stops before `boundary`.
    fn closest_ancestor(
        &self,
        from: NodeId,
        boundary: NodeId,
        matches: impl Fn(&str) -> bool,
    ) -> Option<NodeId>
    where
        Self: Sized,
    {
        let mut current = Some(from);
        while let Some(node) = current {
            if node == boundary {
                return None;
            }
            if self.tag_of(node).is_some_and(&matches) {
                return Some(node);
            }
            current = self.parent_of(node);
        }
        None
    }

    /// Index of `node` among its parent's children that satisfy `matches`.
    fn index_among_siblings(&self, node: NodeId, matches: impl Fn(&str) -> bool) -> Option<usize>
    where
        Self: Sized,
    {
        let parent = self.parent_of(node)?;
        self.children_of(parent)
            .iter()
            .filter(|child| self.tag_of(**child).is_some_and(&matches))
            .position(|child| *child == node)
    }

    /// Whether `node` reaches `root` through parent links.
    fn is_within(&self, node: NodeId, root: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == root {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    node: Option<NodeSlot>,
}

#[derive(Debug, Clone, Default)]
pub struct MarkupTree {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl MarkupTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached element node.
    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.alloc(NodeKind::Element(element))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    pub fn is_live(&self, node: NodeId) -> bool {
        self.slot(node).is_some()
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.slot(node).map(|slot| &slot.kind)
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match self.kind(node)? {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match self.kind(node)? {
            NodeKind::Text(text) => Some(text.as_str()),
            NodeKind::Element(_) => None,
        }
    }

    pub fn text_mut(&mut self, node: NodeId) -> Option<&mut String> {
        match &mut self.slot_mut(node)?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element(_) => None,
        }
    }

    /// Character length of a text node, child count of an element.
    pub fn max_offset(&self, node: NodeId) -> Option<usize> {
        let slot = self.slot(node)?;
        Some(match &slot.kind {
            NodeKind::Text(text) => text.chars().count(),
            NodeKind::Element(_) => slot.children.len(),
        })
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> SurfaceResult<()> {
        let len = self.children_of(parent).len();
        self.insert_child(parent, len, child)
    }

    /// Inserts a detached node at `index` (clamped) under `parent`.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> SurfaceResult<()> {
        if self.element(parent).is_none() {
            return Err(SurfaceError::NotAnElement(parent));
        }
        if !self.is_live(child) {
            return Err(SurfaceError::DetachedNode(child));
        }
        if parent == child || self.is_within(parent, child) {
            return Err(SurfaceError::CyclicInsert(child));
        }
        self.detach(child);
        let slot = self.slot_mut(parent).ok_or(SurfaceError::DetachedNode(parent))?;
        let index = index.min(slot.children.len());
        slot.children.insert(index, child);
        if let Some(child_slot) = self.slot_mut(child) {
            child_slot.parent = Some(parent);
        }
        Ok(())
    }

    /// Unlinks `node` from its parent without freeing it.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent_of(node) else {
            return;
        };
        if let Some(parent_slot) = self.slot_mut(parent) {
            parent_slot.children.retain(|child| *child != node);
        }
        if let Some(slot) = self.slot_mut(node) {
            slot.parent = None;
        }
    }

    /// Unlinks and frees `node` and all of its descendants.
    pub fn remove(&mut self, node: NodeId) {
        self.detach(node);
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            if let Some(slot) = self.release(id) {
                pending.extend(slot.children);
            }
        }
    }

    /// Frees every child of `parent`.
    pub fn clear_children(&mut self, parent: NodeId) {
        let children = self.children_of(parent).to_vec();
        for child in children {
            self.remove(child);
        }
    }

    /// Position of `node` in its parent's child list.
    pub fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent_of(node)?;
        self.children_of(parent).iter().position(|child| *child == node)
    }

    /// Preorder walk of the subtree below `root`, excluding `root`.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children_of(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children_of(node).iter().rev().copied());
        }
        out
    }

    /// Text nodes below `root` in document order.
    pub fn text_nodes(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|node| self.text(*node).is_some())
            .collect()
    }

    /// Concatenated text of every text node below `root`.
    pub fn text_content(&self, root: NodeId) -> String {
        if let Some(text) = self.text(root) {
            return text.to_string();
        }
        self.text_nodes(root)
            .into_iter()
            .filter_map(|node| self.text(node))
            .collect()
    }

    /// Splits a text node at a character offset.
    ///
    /// The original node keeps `..offset`; the returned new sibling holds
    /// `offset..`.
    pub fn split_text(&mut self, node: NodeId, offset: usize) -> SurfaceResult<NodeId> {
        let len = self.max_offset(node).ok_or(SurfaceError::DetachedNode(node))?;
        if offset > len {
            return Err(SurfaceError::OffsetOutOfBounds { node, offset, max: len });
        }
        let text = self.text_mut(node).ok_or(SurfaceError::NotAText(node))?;
        let byte_idx = char_to_byte(text, offset);
        let tail = text.split_off(byte_idx);
        let tail_node = self.create_text(tail);
        if let Some(parent) = self.parent_of(node) {
            let index = self.index_in_parent(node).unwrap_or(0);
            self.insert_child(parent, index + 1, tail_node)?;
        }
        Ok(tail_node)
    }

    /// Puts `node` inside a new element that takes its place.
    pub fn wrap(&mut self, node: NodeId, element: Element) -> SurfaceResult<NodeId> {
        let parent = self.parent_of(node).ok_or(SurfaceError::DetachedNode(node))?;
        let index = self.index_in_parent(node).unwrap_or(0);
        let wrapper = self.create_element(element);
        self.insert_child(parent, index, wrapper)?;
        self.insert_child(wrapper, 0, node)?;
        Ok(wrapper)
    }

    /// Replaces an element by its children, then frees it.
    pub fn unwrap(&mut self, node: NodeId) -> SurfaceResult<()> {
        let parent = self.parent_of(node).ok_or(SurfaceError::DetachedNode(node))?;
        let index = self.index_in_parent(node).unwrap_or(0);
        let children = self.children_of(node).to_vec();
        for (offset, child) in children.into_iter().enumerate() {
            self.insert_child(parent, index + offset, child)?;
        }
        self.remove(node);
        Ok(())
    }

    /// Number of slots backing the arena, live or free.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let node = Some(NodeSlot {
            kind,
            parent: None,
            children: Vec::new(),
        });
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = node;
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node,
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    /// Frees the node's slot and retires its generation.
    fn release(&mut self, node: NodeId) -> Option<NodeSlot> {
        let slot = self
            .slots
            .get_mut(node.index)
            .filter(|slot| slot.generation == node.generation)?;
        let freed = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(node.index);
        Some(freed)
    }

    fn slot(&self, node: NodeId) -> Option<&NodeSlot> {
        self.slots
            .get(node.index)
            .filter(|slot| slot.generation == node.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn slot_mut(&mut self, node: NodeId) -> Option<&mut NodeSlot> {
        self.slots
            .get_mut(node.index)
            .filter(|slot| slot.generation == node.generation)
            .and_then(|slot| slot.node.as_mut())
    }
}

impl TreeQuery for MarkupTree {
    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node)?.parent
    }

    fn children_of(&self, node: NodeId) -> &[NodeId] {
        self.slot(node).map_or(&[], |slot| slot.children.as_slice())
    }

    fn tag_of(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|element| element.tag.as_str())
    }
}

pub(crate) fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map_or(text.len(), |(idx, _)| idx)
}
