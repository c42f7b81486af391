use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entry_id::TaskId;

/// Signed point amount. Penalty tasks carry negative values.
pub type Points = i64;

/// How often a task may be completed.
///
/// `Weekly` has no reset window of its own: it is credited per calendar day
/// exactly like `Daily`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    /// Completed at most once; credited on the day it is checked.
    Once,
    /// N qualifying days inside the active window earn a lump bonus.
    Streak,
}

impl RecurrenceKind {
    /// Returns the variant name as a static string for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Once => "once",
            Self::Streak => "streak",
        }
    }
}

/// A teacher-defined obligation, read-only from the student's side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub point_value: Points,
    pub recurrence: RecurrenceKind,
    /// Only meaningful for `Streak`. Unset means 1.
    pub required_days: Option<u32>,
    /// First day completions are accepted (inclusive).
    pub active_from: NaiveDate,
    /// Last day completions are accepted (inclusive).
    pub active_until: NaiveDate,
    pub is_active: bool,
}

impl Task {
    /// Active task with no streak requirement.
    pub fn new(
        id: impl Into<TaskId>,
        name: impl Into<String>,
        point_value: Points,
        recurrence: RecurrenceKind,
        active_from: NaiveDate,
        active_until: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            point_value,
            recurrence,
            required_days: None,
            active_from,
            active_until,
            is_active: true,
        }
    }

    pub fn with_required_days(mut self, days: u32) -> Self {
        self.required_days = Some(days);
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Inclusive window membership at calendar-day granularity.
    ///
    /// An inverted window (`active_until < active_from`) contains no days.
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        self.active_from <= day && day <= self.active_until
    }

    /// Streak threshold, treating unset or zero as 1.
    pub fn required_days(&self) -> u32 {
        self.required_days.unwrap_or(1).max(1)
    }

    pub fn is_streak(&self) -> bool {
        self.recurrence == RecurrenceKind::Streak
    }

    /// Points credited by a single completion entry. Streak day markers are
    /// worth nothing; the value is paid out through the bonus entry instead.
    pub fn daily_points(&self) -> Points {
        if self.is_streak() { 0 } else { self.point_value }
    }
}
