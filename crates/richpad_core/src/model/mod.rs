//! Document domain model.
//!
//! # Responsibility
//! - Define the canonical document record shared by store, surface and
//!   transfer layers.
//!
//! # Invariants
//! - Every document is identified by a stable, unique `DocumentId`.
//! - `content` is serialized surface markup, never a parsed tree.

pub mod document;
