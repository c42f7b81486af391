//! Bonus-entry consistency.
//!
//! A bonus only makes sense for a streak task, and only while the task's
//! in-window marker count still meets its requirement. Unchecking a marker
//! revokes the bonus, so a bonus below threshold means the ledger drifted
//! (for example the task's window or requirement was edited afterwards).
//! Orphaned bonuses, whose task is no longer known, are not judged.

use tally_types::LedgerEntry;

use crate::error::LedgerViolation;
use crate::progress::streak_progress;

use super::AuditContext;

pub(crate) fn check(ctx: &AuditContext<'_>, entry: &LedgerEntry) -> Result<(), LedgerViolation> {
    if !entry.id.is_streak_bonus() {
        return Ok(());
    }
    let Some(task) = ctx.task(entry.id.task_id()) else {
        return Ok(());
    };

    if !task.is_streak() {
        return Err(LedgerViolation::BonusForNonStreakTask {
            id: entry.id.clone(),
        });
    }

    let progress = streak_progress(ctx.store, task);
    if !progress.is_complete() {
        return Err(LedgerViolation::BonusBelowThreshold {
            task_id: task.id.clone(),
            completed: progress.completed_days,
            required: progress.required,
        });
    }
    Ok(())
}
