use crate::entry_id::{EntryId, TaskId};
use crate::notification::Notification;
use crate::task::{Points, RecurrenceKind};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single completion record in a student's ledger.
///
/// Existence is the only signal of "completed". `task_name` and `recurrence`
/// are denormalized at write time and never refreshed.
/// `recorded_at` is wall-clock for display only; no ledger math reads it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub task_id: TaskId,
    pub task_name: String,
    pub recurrence: RecurrenceKind,
    pub day_recorded: NaiveDate,
    pub points_earned: Points,
    pub recorded_at: DateTime<Utc>,
}

/// Whether a completion key currently has an entry.
///
/// There is no pending state: a toggle flips the key immediately and either
/// keeps the new state or rolls back to the old one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionState {
    Absent,
    Present,
}

impl CompletionState {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }
}

impl std::fmt::Display for CompletionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => write!(f, "Absent"),
            Self::Present => write!(f, "Present"),
        }
    }
}

/// Full set of mutations produced by one toggle.
///
/// Upserts and deletes touch disjoint keys. `point_delta` always equals the
/// points of the upserted entries minus the points of the deleted ones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleResult {
    /// The key the user toggled.
    pub completion: EntryId,
    /// State of `completion` once the result is applied.
    pub state: CompletionState,
    pub entries_to_upsert: Vec<LedgerEntry>,
    pub entries_to_delete: Vec<EntryId>,
    pub point_delta: Points,
    pub notification: Option<Notification>,
}

impl ToggleResult {
    /// Every key this result writes or removes.
    pub fn touched_ids(&self) -> impl Iterator<Item = &EntryId> {
        self.entries_to_upsert
            .iter()
            .map(|entry| &entry.id)
            .chain(self.entries_to_delete.iter())
    }
}
