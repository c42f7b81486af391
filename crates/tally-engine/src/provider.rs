use async_trait::async_trait;
use tally_types::{StudentId, Task};

use crate::backend::BackendError;
use crate::error::SyncError;

/// Supplies the tasks of a student's cohort. Read-only to the ledger.
#[async_trait]
pub trait TaskProvider: Send + Sync {
    async fn tasks_for(&self, student: &StudentId) -> Result<Vec<Task>, BackendError>;
}

/// Fetch a student's roster, keeping only tasks marked active.
pub async fn load_roster(
    provider: &dyn TaskProvider,
    student: &StudentId,
) -> Result<Vec<Task>, SyncError> {
    let tasks = provider
        .tasks_for(student)
        .await
        .map_err(|source| SyncError::Roster {
            student: student.clone(),
            source,
        })?;
    Ok(tasks.into_iter().filter(|task| task.is_active).collect())
}

/// Same task list for every student.
#[derive(Clone, Debug, Default)]
pub struct StaticTaskProvider {
    tasks: Vec<Task>,
}

impl StaticTaskProvider {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

#[async_trait]
impl TaskProvider for StaticTaskProvider {
    async fn tasks_for(&self, _student: &StudentId) -> Result<Vec<Task>, BackendError> {
        Ok(self.tasks.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_types::RecurrenceKind;

    struct Offline;

    #[async_trait]
    impl TaskProvider for Offline {
        async fn tasks_for(&self, _student: &StudentId) -> Result<Vec<Task>, BackendError> {
            Err(BackendError::Unavailable("offline".into()))
        }
    }

    fn task(id: &str, active: bool) -> Task {
        let d = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        Task::new(id, id, 10, RecurrenceKind::Daily, d, d).with_active(active)
    }

    #[tokio::test]
    async fn roster_drops_inactive_tasks() {
        let provider = StaticTaskProvider::new(vec![task("a", true), task("b", false), task("c", true)]);

        let roster = load_roster(&provider, &"ana".into()).await.unwrap();
        let ids: Vec<&str> = roster.iter().map(|t| t.id.as_str()).collect();

        similar_asserts::assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn provider_failure_names_the_student() {
        let err = load_roster(&Offline, &"ana".into()).await.unwrap_err();

        insta::assert_snapshot!(err.to_string(), @"failed to load tasks for student ana");
        assert!(matches!(
            err,
            SyncError::Roster { source: BackendError::Unavailable(_), .. }
        ));
    }
}
