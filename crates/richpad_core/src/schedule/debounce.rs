//! Trailing-edge debouncing by timer supersession.

use std::time::Duration;

/// Identifies one arming of a `Debouncer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket(u64);

/// Tracks which scheduled timer is the current one.
///
/// Every `arm` supersedes the previous ticket, so only the timer scheduled
/// by the latest trigger is honored when it fires.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: u64,
    armed: bool,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            armed: false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Starts a new debounce window, invalidating earlier tickets.
    pub fn arm(&mut self) -> DebounceTicket {
        self.generation += 1;
        self.armed = true;
        DebounceTicket(self.generation)
    }

    /// Consumes `ticket` if it is still the current one.
    pub fn fire(&mut self, ticket: DebounceTicket) -> bool {
        if self.armed && ticket.0 == self.generation {
            self.armed = false;
            true
        } else {
            false
        }
    }

    /// Supersedes the outstanding timer without starting a new window.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

#[cfg(test)]
mod tests {
    use super::Debouncer;
    use std::time::Duration;

    #[test]
    fn only_latest_ticket_fires_once() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        let first = debouncer.arm();
        let second = debouncer.arm();

        assert!(!debouncer.fire(first));
        assert!(debouncer.fire(second));
        assert!(!debouncer.fire(second));
    }

    #[test]
    fn disarm_makes_pending_ticket_stale() {
        let mut debouncer = Debouncer::new(Duration::from_secs(1));
        let ticket = debouncer.arm();
        debouncer.disarm();
        assert!(!debouncer.is_armed());
        assert!(!debouncer.fire(ticket));
    }
}
