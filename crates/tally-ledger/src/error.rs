use tally_types::{EntryId, Points, TaskId};

/// Describes a specific ledger invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerViolation {
    /// The running total differs from the sum of `points_earned`.
    TotalMismatch { recorded: Points, summed: Points },
    /// An entry's own `task_id` disagrees with the task encoded in its key.
    EntryKeyMismatch { id: EntryId, task_id: TaskId },
    /// A streak day marker carries points; only the bonus entry may.
    StreakMarkerCarriesPoints { id: EntryId, points: Points },
    /// A bonus entry exists for a task that is not a streak task.
    BonusForNonStreakTask { id: EntryId },
    /// A bonus entry exists but the in-window marker count is below the requirement.
    BonusBelowThreshold {
        task_id: TaskId,
        completed: u32,
        required: u32,
    },
}

/// Errors produced by ledger checks.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger invariant violation: {0}")]
    InvariantViolation(LedgerViolation),
}

impl std::fmt::Display for LedgerViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TotalMismatch { recorded, summed } => write!(
                f,
                "recorded total {recorded} does not match entry sum {summed}"
            ),
            Self::EntryKeyMismatch { id, task_id } => {
                write!(f, "entry {id} is recorded against task {task_id}")
            }
            Self::StreakMarkerCarriesPoints { id, points } => {
                write!(f, "streak marker {id} carries {points} points, expected 0")
            }
            Self::BonusForNonStreakTask { id } => {
                write!(f, "bonus entry {id} belongs to a non-streak task")
            }
            Self::BonusBelowThreshold {
                task_id,
                completed,
                required,
            } => write!(
                f,
                "bonus for {task_id} present with {completed} of {required} required days"
            ),
        }
    }
}
