use crate::error::DomainError;
use crate::task::{RecurrenceKind, Task};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ONCE_PREFIX: &str = "ONCE_";
const STREAK_BONUS_PREFIX: &str = "STREAK_BONUS_";
const DAY_FORMAT: &str = "%Y-%m-%d";

/// Stable task identifier assigned by the task provider.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Owner of a ledger and its point total.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StudentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deterministic key of a ledger entry.
///
/// At most one entry exists per key, so writing the same key twice is an
/// upsert rather than a duplicate completion. The key is kept as a typed
/// composite and only flattened to a string at the storage boundary:
///
/// - `Day`: `"2025-03-04_{task}"`, one per credited day (daily, weekly, streak markers)
/// - `Once`: `"ONCE_{task}"`
/// - `StreakBonus`: `"STREAK_BONUS_{task}"`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntryId {
    Day { day: NaiveDate, task_id: TaskId },
    Once { task_id: TaskId },
    StreakBonus { task_id: TaskId },
}

impl EntryId {
    pub fn day(day: NaiveDate, task_id: impl Into<TaskId>) -> Self {
        Self::Day {
            day,
            task_id: task_id.into(),
        }
    }

    pub fn once(task_id: impl Into<TaskId>) -> Self {
        Self::Once {
            task_id: task_id.into(),
        }
    }

    pub fn streak_bonus(task_id: impl Into<TaskId>) -> Self {
        Self::StreakBonus {
            task_id: task_id.into(),
        }
    }

    /// The completion key a toggle of `task` on `day` targets.
    ///
    /// One-time tasks ignore `day`: they have a single key no matter which
    /// calendar cell was clicked.
    pub fn completion_for(task: &Task, day: NaiveDate) -> Self {
        match task.recurrence {
            RecurrenceKind::Once => Self::once(task.id.clone()),
            RecurrenceKind::Daily | RecurrenceKind::Weekly | RecurrenceKind::Streak => {
                Self::day(day, task.id.clone())
            }
        }
    }

    pub fn task_id(&self) -> &TaskId {
        match self {
            Self::Day { task_id, .. } | Self::Once { task_id } | Self::StreakBonus { task_id } => {
                task_id
            }
        }
    }

    /// The credited day encoded in the key, if any.
    pub fn credited_day(&self) -> Option<NaiveDate> {
        match self {
            Self::Day { day, .. } => Some(*day),
            Self::Once { .. } | Self::StreakBonus { .. } => None,
        }
    }

    pub fn is_streak_bonus(&self) -> bool {
        matches!(self, Self::StreakBonus { .. })
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day { day, task_id } => write!(f, "{}_{}", day.format(DAY_FORMAT), task_id),
            Self::Once { task_id } => write!(f, "{ONCE_PREFIX}{task_id}"),
            Self::StreakBonus { task_id } => write!(f, "{STREAK_BONUS_PREFIX}{task_id}"),
        }
    }
}

/// Parses the storage form of a key.
///
/// Prefixed keys are matched first. A day key is split at its first `_`:
/// the date token never contains one, so task ids may.
impl FromStr for EntryId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| DomainError::InvalidEntryId {
            id: s.to_string(),
            reason,
        };

        let task_id = |task: &str| {
            if task.is_empty() {
                Err(invalid("empty task id"))
            } else {
                Ok(TaskId::from(task))
            }
        };

        if let Some(task) = s.strip_prefix(STREAK_BONUS_PREFIX) {
            return task_id(task).map(Self::streak_bonus);
        }
        if let Some(task) = s.strip_prefix(ONCE_PREFIX) {
            return task_id(task).map(Self::once);
        }

        let (token, task) = s
            .split_once('_')
            .ok_or_else(|| invalid("missing '_' separator"))?;
        let day = NaiveDate::parse_from_str(token, DAY_FORMAT)
            .map_err(|_| invalid("day token is not an ISO date"))?;
        Ok(Self::day(day, task_id(task)?))
    }
}

impl TryFrom<String> for EntryId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntryId> for String {
    fn from(id: EntryId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn renders_storage_form() {
        insta::assert_snapshot!(EntryId::day(day(4), "reading").to_string(), @"2025-03-04_reading");
        insta::assert_snapshot!(EntryId::once("essay").to_string(), @"ONCE_essay");
        insta::assert_snapshot!(EntryId::streak_bonus("run").to_string(), @"STREAK_BONUS_run");
    }

    #[test]
    fn parses_task_ids_containing_underscores() {
        let id: EntryId = "2025-03-04_math_homework_2".parse().unwrap();
        assert_eq!(id, EntryId::day(day(4), "math_homework_2"));

        let bonus: EntryId = "STREAK_BONUS_run_club".parse().unwrap();
        assert_eq!(bonus, EntryId::streak_bonus("run_club"));

        let once: EntryId = "ONCE_field_trip".parse().unwrap();
        assert_eq!(once, EntryId::once("field_trip"));
    }

    #[test]
    fn rejects_malformed_ids() {
        for raw in ["", "reading", "yesterday_reading", "2025-03-04_", "ONCE_", "STREAK_BONUS_"] {
            let err = raw.parse::<EntryId>().unwrap_err();
            assert!(matches!(err, DomainError::InvalidEntryId { .. }), "{raw}");
        }
    }

    #[test]
    fn invalid_id_error_message() {
        let err = "nope".parse::<EntryId>().unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"invalid ledger entry id 'nope': missing '_' separator");
    }

    #[test]
    fn completion_key_follows_recurrence() {
        let daily = Task::new("d", "Read", 10, RecurrenceKind::Daily, day(1), day(9));
        let weekly = Task::new("w", "Tidy", 10, RecurrenceKind::Weekly, day(1), day(9));
        let once = Task::new("o", "Essay", 50, RecurrenceKind::Once, day(1), day(9));
        let streak = Task::new("s", "Run", 20, RecurrenceKind::Streak, day(1), day(9));

        assert_eq!(EntryId::completion_for(&daily, day(2)), EntryId::day(day(2), "d"));
        assert_eq!(EntryId::completion_for(&weekly, day(2)), EntryId::day(day(2), "w"));
        assert_eq!(EntryId::completion_for(&streak, day(2)), EntryId::day(day(2), "s"));
        assert_eq!(EntryId::completion_for(&once, day(2)), EntryId::once("o"));
        assert_eq!(
            EntryId::completion_for(&once, day(2)),
            EntryId::completion_for(&once, day(8))
        );
    }

    #[test]
    fn serializes_as_string() {
        let id = EntryId::day(day(4), "reading");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"2025-03-04_reading\"");

        let back: EntryId = serde_json::from_str(&json).unwrap();
        similar_asserts::assert_eq!(back, id);

        assert!(serde_json::from_str::<EntryId>("\"garbage\"").is_err());
    }
}
