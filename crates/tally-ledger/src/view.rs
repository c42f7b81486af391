use serde::{Deserialize, Serialize};
use tally_types::{EntryId, LedgerEntry, Points, ToggleResult};

use crate::error::{LedgerError, LedgerViolation};
use crate::store::LedgerStore;

/// A student's ledger together with the running point total.
///
/// The total is maintained by applying deltas, never recomputed. It must
/// still reconcile with [`LedgerStore::sum_points`] at every step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerView {
    pub store: LedgerStore,
    pub total: Points,
}

/// Undo record for one applied [`ToggleResult`].
///
/// Holds the prior value of every key the result touched, in application
/// order, plus the delta that was added to the total. Reverting restores
/// only those keys, so a rollback leaves toggles on other keys intact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedToggle {
    previous: Vec<(EntryId, Option<LedgerEntry>)>,
    point_delta: Points,
}

impl AppliedToggle {
    pub fn point_delta(&self) -> Points {
        self.point_delta
    }
}

impl LedgerView {
    pub fn new(store: LedgerStore, total: Points) -> Self {
        Self { store, total }
    }

    /// Apply upserts, then deletes, then the delta.
    pub fn apply(&mut self, result: &ToggleResult) -> AppliedToggle {
        let mut previous =
            Vec::with_capacity(result.entries_to_upsert.len() + result.entries_to_delete.len());

        for entry in &result.entries_to_upsert {
            let prior = self.store.put(entry.clone());
            previous.push((entry.id.clone(), prior));
        }
        for id in &result.entries_to_delete {
            let prior = self.store.delete(id);
            previous.push((id.clone(), prior));
        }
        self.total += result.point_delta;

        AppliedToggle {
            previous,
            point_delta: result.point_delta,
        }
    }

    /// Undo an [`AppliedToggle`], newest write first.
    pub fn revert(&mut self, applied: AppliedToggle) {
        for (id, prior) in applied.previous.into_iter().rev() {
            match prior {
                Some(entry) => {
                    self.store.put(entry);
                }
                None => {
                    self.store.delete(&id);
                }
            }
        }
        self.total -= applied.point_delta;
    }

    /// Check the recorded total against the entry sum.
    pub fn reconcile(&self) -> Result<(), LedgerError> {
        let summed = self.store.sum_points();
        if summed != self.total {
            return Err(LedgerError::InvariantViolation(
                LedgerViolation::TotalMismatch {
                    recorded: self.total,
                    summed,
                },
            ));
        }
        Ok(())
    }
}
