//! Ordering guard for overlapping cart mutations.
//!
//! Each request takes a [`Ticket`] before it is dispatched. A response is only applied when its
//! ticket is newer than the last applied one, so a slow response can never overwrite the state
//! from a request issued after it.

/// Position of a request in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Latest value of a remote resource, guarded by request order.
#[derive(Debug, Clone)]
pub struct Sequenced<T> {
    issued: u64,
    applied: u64,
    value: Option<T>,
}

impl<T> Default for Sequenced<T> {
    fn default() -> Self {
        Self {
            issued: 0,
            applied: 0,
            value: None,
        }
    }
}

impl<T> Sequenced<T> {
    /// Nothing issued, nothing applied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a ticket for a request about to be sent.
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;

        Ticket(self.issued)
    }

    /// Apply a response. Returns `false` and drops `value` when a newer response already landed.
    pub fn apply(&mut self, ticket: Ticket, value: T) -> bool {
        if ticket.0 <= self.applied {
            return false;
        }

        self.applied = ticket.0;
        self.value = Some(value);

        true
    }

    /// Latest applied value.
    pub fn current(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Forget the value, e.g. when the identity changes.
    pub fn reset(&mut self) {
        self.applied = self.issued;
        self.value = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responses_in_order_are_applied() {
        let mut state = Sequenced::new();

        let first = state.issue();
        assert!(state.apply(first, 1));

        let second = state.issue();
        assert!(state.apply(second, 2));

        assert_eq!(state.current(), Some(&2));
    }

    #[test]
    fn stale_response_is_dropped() {
        let mut state = Sequenced::new();

        let first = state.issue();
        let second = state.issue();

        assert!(state.apply(second, "newer"));
        assert!(!state.apply(first, "older"));
        assert_eq!(state.current(), Some(&"newer"));
    }

    #[test]
    fn older_response_lands_while_newer_is_in_flight() {
        let mut state = Sequenced::new();

        let first = state.issue();
        let second = state.issue();

        assert!(state.apply(first, 1));
        assert_eq!(state.current(), Some(&1));
        assert!(state.apply(second, 2));
        assert_eq!(state.current(), Some(&2));
    }

    #[test]
    fn reset_discards_in_flight_responses() {
        let mut state = Sequenced::new();

        let ticket = state.issue();
        state.reset();

        assert!(!state.apply(ticket, 1));
        assert!(state.current().is_none());
    }
}
