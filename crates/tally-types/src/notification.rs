use serde::{Deserialize, Serialize};

use crate::task::Points;

/// Events the UI surfaces proactively. Every other toggle outcome is
/// visible only through ledger state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// A streak task reached its required day count for the first time.
    StreakBonusAwarded { task_name: String, bonus_points: Points },
}
