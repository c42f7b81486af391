//! Ledger invariant checking.
//!
//! [`validate_ledger`] is a batch scan that collects every violation rather
//! than stopping at the first. It is used for diagnostics after hydration or
//! after a commit; the toggle planner never needs it to stay correct.
//!
//! Per-entry checks are grouped into three sub-modules:
//! - [`keys`]: an entry's fields agree with its key.
//! - [`points`]: streak day markers are worth nothing.
//! - [`streak`]: bonus entries belong to streak tasks that still meet their threshold.
//!
//! Each sub-module exposes a single `check(&AuditContext, &LedgerEntry) -> Result<(), LedgerViolation>`
//! function. The total-vs-sum reconciliation runs once after the entry scan.

mod keys;
mod points;
mod streak;

use std::collections::HashMap;

use tally_types::{LedgerEntry, Points, Task, TaskId};

use crate::error::LedgerViolation;
use crate::store::LedgerStore;

/// Read-only context shared by the per-entry checks.
///
/// `tasks` is whatever roster the caller knows about. Entries whose task is
/// missing from it are orphans and skip the task-dependent checks.
pub(crate) struct AuditContext<'a> {
    pub(crate) store: &'a LedgerStore,
    pub(crate) tasks: HashMap<&'a TaskId, &'a Task>,
}

impl<'a> AuditContext<'a> {
    fn new(store: &'a LedgerStore, tasks: &'a [Task]) -> Self {
        Self {
            store,
            tasks: tasks.iter().map(|task| (&task.id, task)).collect(),
        }
    }

    pub(crate) fn task(&self, task_id: &TaskId) -> Option<&'a Task> {
        self.tasks.get(task_id).copied()
    }

    /// Run every group against one entry, collecting up to one violation per group.
    fn collect_entry_violations(&self, entry: &LedgerEntry, violations: &mut Vec<LedgerViolation>) {
        if let Err(v) = keys::check(self, entry) {
            violations.push(v);
        }
        if let Err(v) = points::check(self, entry) {
            violations.push(v);
        }
        if let Err(v) = streak::check(self, entry) {
            violations.push(v);
        }
    }
}

/// Batch-validate a ledger and its recorded total, returning all detected violations.
pub fn validate_ledger(store: &LedgerStore, total: Points, tasks: &[Task]) -> Vec<LedgerViolation> {
    let ctx = AuditContext::new(store, tasks);
    let mut violations = Vec::new();

    for entry in store.iter() {
        ctx.collect_entry_violations(entry, &mut violations);
    }

    let summed = store.sum_points();
    if summed != total {
        violations.push(LedgerViolation::TotalMismatch {
            recorded: total,
            summed,
        });
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{at, daily, day, streak};
    use crate::toggle::plan_toggle;
    use crate::view::LedgerView;
    use tally_types::{EntryId, RecurrenceKind};

    #[test]
    fn ledger_built_by_toggles_is_clean() {
        let tasks = vec![daily("read", 10), streak("run", 20, 2)];
        let mut view = LedgerView::default();
        for (task, d) in [(&tasks[0], 1), (&tasks[1], 1), (&tasks[1], 2), (&tasks[0], 3)] {
            let result = plan_toggle(&view.store, task, day(d), day(20), at());
            view.apply(&result);
        }

        assert!(validate_ledger(&view.store, view.total, &tasks).is_empty());
    }

    #[test]
    fn collects_violations_across_groups() {
        let tasks = vec![daily("read", 10), streak("run", 20, 3)];
        let store = LedgerStore::from_entries([
            LedgerEntry {
                id: EntryId::day(day(1), "run"),
                task_id: "run".into(),
                task_name: "Run".into(),
                recurrence: RecurrenceKind::Streak,
                day_recorded: day(1),
                points_earned: 4,
                recorded_at: at(),
            },
            LedgerEntry {
                id: EntryId::streak_bonus("run"),
                task_id: "run".into(),
                task_name: "Run".into(),
                recurrence: RecurrenceKind::Streak,
                day_recorded: day(1),
                points_earned: 20,
                recorded_at: at(),
            },
            LedgerEntry {
                id: EntryId::streak_bonus("read"),
                task_id: "read".into(),
                task_name: "Read".into(),
                recurrence: RecurrenceKind::Streak,
                day_recorded: day(1),
                points_earned: 10,
                recorded_at: at(),
            },
        ]);

        let violations = validate_ledger(&store, 0, &tasks);

        similar_asserts::assert_eq!(
            violations,
            vec![
                LedgerViolation::StreakMarkerCarriesPoints {
                    id: EntryId::day(day(1), "run"),
                    points: 4,
                },
                LedgerViolation::BonusForNonStreakTask {
                    id: EntryId::streak_bonus("read"),
                },
                LedgerViolation::BonusBelowThreshold {
                    task_id: "run".into(),
                    completed: 1,
                    required: 3,
                },
                LedgerViolation::TotalMismatch {
                    recorded: 0,
                    summed: 34,
                },
            ]
        );
    }

    #[test]
    fn orphaned_entries_are_tolerated() {
        let store = LedgerStore::from_entries([LedgerEntry {
            id: EntryId::streak_bonus("retired"),
            task_id: "retired".into(),
            task_name: "Retired".into(),
            recurrence: RecurrenceKind::Streak,
            day_recorded: day(1),
            points_earned: 20,
            recorded_at: at(),
        }]);

        assert!(validate_ledger(&store, 20, &[]).is_empty());
    }
}
