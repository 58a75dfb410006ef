//! Cooperative scheduling for the single-threaded editor loop.
//!
//! # Responsibility
//! - Queue deferred work as plain data with a virtual due time.
//! - Provide trailing-edge debouncing by superseding earlier timers.
//!
//! # Invariants
//! - Tasks run in `(due, scheduling order)` order; a zero-delay task runs
//!   after every task already due at the same instant.
//! - There is no cancellation: a superseded timer still fires but its
//!   ticket is stale and the handler ignores it.

pub mod debounce;
pub mod scheduler;

pub use debounce::{DebounceTicket, Debouncer};
pub use scheduler::Scheduler;
