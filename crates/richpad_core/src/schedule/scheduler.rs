//! Virtual-time task queue.

use std::time::Duration;

#[derive(Debug, Clone)]
struct Scheduled<T> {
    due: Duration,
    seq: u64,
    task: T,
}

/// Deferred task queue driven by explicit time advancement.
///
/// Nothing runs on its own: the owner pops due tasks while advancing time,
/// which keeps timer ordering deterministic and testable.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    queue: Vec<Scheduled<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: Vec::new(),
        }
    }

    /// Current virtual time since the scheduler was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Queues `task` to run `delay` after the current instant.
    pub fn schedule(&mut self, delay: Duration, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled {
            due: self.now + delay,
            seq,
            task,
        });
    }

    /// Queues `task` for the next scheduling tick.
    pub fn next_tick(&mut self, task: T) {
        self.schedule(Duration::ZERO, task);
    }

    /// Removes the earliest task due at or before `until` and moves the
    /// clock to its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        let idx = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= until)
            .min_by_key(|(_, entry)| (entry.due, entry.seq))
            .map(|(idx, _)| idx)?;
        let entry = self.queue.remove(idx);
        self.now = self.now.max(entry.due);
        Some(entry.task)
    }

    /// Moves the clock forward without running anything.
    pub fn advance_clock_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.queue.iter().map(|entry| entry.due).min()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }
}
