//! Editable surface: the live, mutable markup region the user types into.
//!
//! # Responsibility
//! - Hold the editable markup tree, the live selection and focus state.
//! - Provide host editing primitives (typing, markup insertion, inline
//!   formatting, undo/redo checkpoints).
//! - Convert between the tree and serialized markup.
//!
//! # Invariants
//! - Node ids captured before a content replace never resolve afterwards.
//! - The surface never writes to the document collection.

pub mod editable;
pub mod markup;
pub mod selection;
pub mod tree;

pub use editable::{InlineFormat, Surface};
pub use selection::{Boundary, SelectionRange};
pub use tree::{Element, MarkupTree, NodeId, NodeKind, TreeQuery};

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Structural failure while addressing or mutating the surface tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// Node was freed or is not attached under the surface root.
    DetachedNode(NodeId),
    OffsetOutOfBounds {
        node: NodeId,
        offset: usize,
        max: usize,
    },
    NotAnElement(NodeId),
    NotAText(NodeId),
    /// Inserting a node beneath itself.
    CyclicInsert(NodeId),
}

impl Display for SurfaceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DetachedNode(node) => write!(f, "node {node:?} is not attached to the surface"),
            Self::OffsetOutOfBounds { node, offset, max } => {
                write!(f, "offset {offset} out of bounds for node {node:?} (max {max})")
            }
            Self::NotAnElement(node) => write!(f, "node {node:?} is not an element"),
            Self::NotAText(node) => write!(f, "node {node:?} is not a text node"),
            Self::CyclicInsert(node) => write!(f, "cannot insert node {node:?} beneath itself"),
        }
    }
}

impl Error for SurfaceError {}
