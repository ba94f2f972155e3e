//! Generation tags for asynchronous start-ups.
//!
//! A camera start can take seconds. Each toggle takes a fresh ticket, and a
//! start-up only takes effect if its ticket is still the latest one.

use std::cell::Cell;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StartTicket(u64);

#[derive(Debug, Default)]
pub struct StartGate {
    generation: Cell<u64>,
}

impl StartGate {
    /// Issue a new ticket, invalidating every earlier one.
    pub fn begin(&self) -> StartTicket {
        let next = self.generation.get().wrapping_add(1);
        self.generation.set(next);
        StartTicket(next)
    }

    pub fn is_current(&self, ticket: StartTicket) -> bool {
        self.generation.get() == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_ticket_wins() {
        let gate = StartGate::default();
        let first = gate.begin();
        assert!(gate.is_current(first));
        let second = gate.begin();
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
    }

    #[test]
    fn on_off_on_leaves_only_the_last_start_live() {
        let gate = StartGate::default();
        let on = gate.begin();
        let _off = gate.begin();
        let on_again = gate.begin();
        // the first start-up failing late must not touch the live one
        assert!(!gate.is_current(on));
        assert!(gate.is_current(on_again));
    }
}
