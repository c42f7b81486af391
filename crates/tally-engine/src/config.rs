#[derive(Debug, Clone)]
pub struct GuardConfig {
    single_flight: bool,
    verify_after_commit: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            single_flight: true,
            verify_after_commit: false,
        }
    }
}

impl GuardConfig {
    /// Reject a toggle while another toggle touching the same keys is
    /// still being persisted.
    pub fn single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }

    /// Reconcile the local total against the entry sum after every
    /// successful commit and log any drift.
    pub fn verify_after_commit(mut self, enabled: bool) -> Self {
        self.verify_after_commit = enabled;
        self
    }

    pub fn is_single_flight(&self) -> bool {
        self.single_flight
    }

    pub fn verifies_after_commit(&self) -> bool {
        self.verify_after_commit
    }
}
