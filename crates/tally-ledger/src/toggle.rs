//! Toggle planning.
//!
//! [`plan_toggle`] is a pure function from `(ledger, task, day)` to the full
//! set of mutations a checkbox click implies. It never touches the store;
//! applying the result is the caller's job (see [`crate::view::LedgerView`]).
//!
//! The completion key flips between two states only: absent → present
//! ("turn on") and present → absent ("turn off"). Streak tasks cascade:
//!
//! - Turning on the marker whose in-window count first equals the required
//!   days also writes the `STREAK_BONUS_` entry and emits a notification.
//!   The check is exact equality, so later markers never re-award.
//! - Turning off any marker while the bonus exists removes the bonus too,
//!   without re-counting the markers that remain.

use chrono::{DateTime, NaiveDate, Utc};
use tally_types::{
    CompletionState, EntryId, LedgerEntry, Notification, RecurrenceKind, Task, ToggleResult,
};

use crate::progress::streak_progress;
use crate::store::LedgerStore;

/// Plan the mutations for toggling `task` on `day`.
///
/// `today` is the credited day for one-time tasks, which are recorded on the
/// day they are checked rather than on the clicked cell. `recorded_at` stamps
/// every upserted entry.
pub fn plan_toggle(
    store: &LedgerStore,
    task: &Task,
    day: NaiveDate,
    today: NaiveDate,
    recorded_at: DateTime<Utc>,
) -> ToggleResult {
    let completion = EntryId::completion_for(task, day);
    match store.get(&completion) {
        Some(existing) => turn_off(store, task, existing),
        None => turn_on(store, task, completion, day, today, recorded_at),
    }
}

fn turn_on(
    store: &LedgerStore,
    task: &Task,
    completion: EntryId,
    day: NaiveDate,
    today: NaiveDate,
    recorded_at: DateTime<Utc>,
) -> ToggleResult {
    let credited_day = match task.recurrence {
        RecurrenceKind::Once => today,
        RecurrenceKind::Daily | RecurrenceKind::Weekly | RecurrenceKind::Streak => day,
    };
    let daily_points = task.daily_points();

    let mut entries_to_upsert = vec![LedgerEntry {
        id: completion.clone(),
        task_id: task.id.clone(),
        task_name: task.name.clone(),
        recurrence: task.recurrence,
        day_recorded: credited_day,
        points_earned: daily_points,
        recorded_at,
    }];
    let mut point_delta = daily_points;
    let mut notification = None;

    if task.is_streak() {
        // The new marker is not in the store yet; count it by hand.
        let progress = streak_progress(store, task);
        let completed_days = progress.completed_days + u32::from(task.is_active_on(day));

        if completed_days == progress.required && !progress.bonus_awarded {
            entries_to_upsert.push(LedgerEntry {
                id: EntryId::streak_bonus(task.id.clone()),
                task_id: task.id.clone(),
                task_name: task.name.clone(),
                recurrence: RecurrenceKind::Streak,
                day_recorded: credited_day,
                points_earned: task.point_value,
                recorded_at,
            });
            point_delta += task.point_value;
            notification = Some(Notification::StreakBonusAwarded {
                task_name: task.name.clone(),
                bonus_points: task.point_value,
            });
        }
    }

    ToggleResult {
        completion,
        state: CompletionState::Present,
        entries_to_upsert,
        entries_to_delete: Vec::new(),
        point_delta,
        notification,
    }
}

/// Removal subtracts the points stored on each entry, so the running total
/// stays equal to the entry sum even if the task's value was edited after
/// the entry was written.
fn turn_off(store: &LedgerStore, task: &Task, existing: &LedgerEntry) -> ToggleResult {
    let mut entries_to_delete = vec![existing.id.clone()];
    let mut point_delta = -existing.points_earned;

    if task.is_streak() {
        if let Some(bonus) = store.get(&EntryId::streak_bonus(task.id.clone())) {
            entries_to_delete.push(bonus.id.clone());
            point_delta -= bonus.points_earned;
        }
    }

    ToggleResult {
        completion: existing.id.clone(),
        state: CompletionState::Absent,
        entries_to_upsert: Vec::new(),
        entries_to_delete,
        point_delta,
        notification: None,
    }
}
