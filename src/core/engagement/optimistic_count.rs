// Optimistic counter for instant UI feedback.
//
// The server value stays authoritative. Pending deltas are shown on top of it
// until the next fetch confirms them.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimisticCount {
    confirmed: u64,
    pending: i64,
}

impl OptimisticCount {
    pub fn new(confirmed: u64) -> Self {
        Self {
            confirmed,
            pending: 0,
        }
    }

    /// Record a change the server hasn't confirmed yet.
    pub fn apply(&mut self, delta: i64) {
        self.pending += delta;
    }

    /// Value to show. Never negative.
    pub fn display(&self) -> u64 {
        if self.pending >= 0 {
            self.confirmed.saturating_add(self.pending as u64)
        } else {
            self.confirmed.saturating_sub(self.pending.unsigned_abs())
        }
    }

    /// Replace with a fresh server value and drop pending deltas.
    pub fn reconcile(&mut self, server_value: u64) {
        self.confirmed = server_value;
        self.pending = 0;
    }

    pub fn confirmed(&self) -> u64 {
        self.confirmed
    }

    pub fn has_pending(&self) -> bool {
        self.pending != 0
    }
}
