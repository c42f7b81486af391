use serde::{Deserialize, Serialize};
use tally_types::{EntryId, Task};

use crate::store::LedgerStore;

/// Derived progress of a streak task. Never stored: recomputed from the
/// ledger snapshot whenever it is needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakProgress {
    /// Day markers for the task whose credited day is inside its window.
    pub completed_days: u32,
    pub required: u32,
    pub bonus_awarded: bool,
}

impl StreakProgress {
    pub fn is_complete(&self) -> bool {
        self.completed_days >= self.required
    }
}

/// Count the qualifying days recorded for `task`.
///
/// Only `Day` keys count; the bonus key and any `Once` key are ignored, as
/// are day markers outside `[active_from, active_until]` even if an entry
/// exists for them. Absent data yields zero progress.
///
/// Scan complexity: O(n) over the store.
pub fn streak_progress(store: &LedgerStore, task: &Task) -> StreakProgress {
    let completed_days = store
        .all_for_task(&task.id)
        .filter_map(|entry| entry.id.credited_day())
        .filter(|day| task.is_active_on(*day))
        .count();

    StreakProgress {
        completed_days: u32::try_from(completed_days).unwrap_or(u32::MAX),
        required: task.required_days(),
        bonus_awarded: store.has(&EntryId::streak_bonus(task.id.clone())),
    }
}
