use std::collections::{BTreeMap, HashMap, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tally_types::{EntryId, LedgerEntry, Points, StudentId, ToggleResult};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("backend did not answer within {after_ms}ms")]
    Timeout { after_ms: u64 },
}

/// One atomic write: entry upserts and deletes plus a signed increment on
/// the student's point total and a last-activity stamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerBatch {
    pub batch_id: Uuid,
    pub upserts: Vec<LedgerEntry>,
    pub deletes: Vec<EntryId>,
    /// Applied as an increment, never as an absolute value, so batches
    /// committed close together cannot lose each other's updates.
    pub point_increment: Points,
    pub last_activity: DateTime<Utc>,
}

impl LedgerBatch {
    pub fn from_result(result: &ToggleResult, last_activity: DateTime<Utc>) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            upserts: result.entries_to_upsert.clone(),
            deletes: result.entries_to_delete.clone(),
            point_increment: result.point_delta,
            last_activity,
        }
    }
}

/// Persisted state of a student, as read back at session start.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredLedger {
    pub entries: Vec<LedgerEntry>,
    pub total: Points,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Storage the guard persists into.
///
/// `commit` must be all-or-nothing: on `Err`, none of the batch may be
/// visible to a later `load`.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    async fn load(&self, student: &StudentId) -> Result<StoredLedger, BackendError>;
    async fn commit(&self, student: &StudentId, batch: &LedgerBatch) -> Result<(), BackendError>;
}

#[derive(Debug, Default)]
struct StudentRecord {
    entries: BTreeMap<EntryId, LedgerEntry>,
    total: Points,
    last_activity: Option<DateTime<Utc>>,
}

/// Process-local backend. Unknown students load as an empty ledger.
///
/// Failures can be injected with [`InMemoryBackend::fail_next_commits`];
/// a failed commit writes nothing.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    students: Mutex<HashMap<StudentId, StudentRecord>>,
    injected_failures: std::sync::Mutex<VecDeque<BackendError>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a student's persisted state.
    pub fn with_ledger(mut self, student: StudentId, stored: StoredLedger) -> Self {
        let record = StudentRecord {
            entries: stored
                .entries
                .into_iter()
                .map(|entry| (entry.id.clone(), entry))
                .collect(),
            total: stored.total,
            last_activity: stored.last_activity,
        };
        self.students.get_mut().insert(student, record);
        self
    }

    /// Make the next `times` commits fail with `error`.
    pub fn fail_next_commits(&self, times: u32, error: BackendError) {
        let mut failures = self
            .injected_failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        failures.extend(std::iter::repeat_n(error, times as usize));
    }

    fn take_injected_failure(&self) -> Option<BackendError> {
        self.injected_failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
    }
}

#[async_trait]
impl PersistenceBackend for InMemoryBackend {
    async fn load(&self, student: &StudentId) -> Result<StoredLedger, BackendError> {
        let students = self.students.lock().await;
        Ok(students
            .get(student)
            .map(|record| StoredLedger {
                entries: record.entries.values().cloned().collect(),
                total: record.total,
                last_activity: record.last_activity,
            })
            .unwrap_or_default())
    }

    async fn commit(&self, student: &StudentId, batch: &LedgerBatch) -> Result<(), BackendError> {
        if let Some(err) = self.take_injected_failure() {
            return Err(err);
        }

        let mut students = self.students.lock().await;
        let record = students.entry(student.clone()).or_default();
        for entry in &batch.upserts {
            record.entries.insert(entry.id.clone(), entry.clone());
        }
        for id in &batch.deletes {
            record.entries.remove(id);
        }
        record.total += batch.point_increment;
        record.last_activity = Some(batch.last_activity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use tally_types::RecurrenceKind;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap()
    }

    fn entry(id: EntryId, points: Points) -> LedgerEntry {
        LedgerEntry {
            task_id: id.task_id().clone(),
            task_name: "Read".into(),
            recurrence: RecurrenceKind::Daily,
            day_recorded: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            points_earned: points,
            recorded_at: at(),
            id,
        }
    }

    fn batch(upserts: Vec<LedgerEntry>, deletes: Vec<EntryId>, point_increment: Points) -> LedgerBatch {
        LedgerBatch {
            batch_id: Uuid::new_v4(),
            upserts,
            deletes,
            point_increment,
            last_activity: at(),
        }
    }

    #[tokio::test]
    async fn unknown_student_loads_empty() {
        let backend = InMemoryBackend::new();
        let stored = backend.load(&"nobody".into()).await.unwrap();
        similar_asserts::assert_eq!(stored, StoredLedger::default());
    }

    #[tokio::test]
    async fn commit_increments_total() {
        let student = StudentId::from("ana");
        let backend = InMemoryBackend::new().with_ledger(
            student.clone(),
            StoredLedger {
                entries: vec![entry(EntryId::once("essay"), 50)],
                total: 50,
                last_activity: None,
            },
        );

        let id = EntryId::once("quiz");
        backend
            .commit(&student, &batch(vec![entry(id.clone(), 10)], vec![], 10))
            .await
            .unwrap();
        backend
            .commit(&student, &batch(vec![], vec![EntryId::once("essay")], -50))
            .await
            .unwrap();

        let stored = backend.load(&student).await.unwrap();
        assert_eq!(stored.total, 10);
        assert_eq!(stored.entries.len(), 1);
        assert_eq!(stored.entries[0].id, id);
        assert_eq!(stored.last_activity, Some(at()));
    }

    #[tokio::test]
    async fn injected_failure_writes_nothing() {
        let student = StudentId::from("ana");
        let backend = InMemoryBackend::new();
        backend.fail_next_commits(1, BackendError::Timeout { after_ms: 500 });

        let err = backend
            .commit(&student, &batch(vec![entry(EntryId::once("quiz"), 10)], vec![], 10))
            .await
            .unwrap_err();
        assert_eq!(err, BackendError::Timeout { after_ms: 500 });
        similar_asserts::assert_eq!(backend.load(&student).await.unwrap(), StoredLedger::default());

        // Only one failure was requested.
        backend
            .commit(&student, &batch(vec![entry(EntryId::once("quiz"), 10)], vec![], 10))
            .await
            .unwrap();
        assert_eq!(backend.load(&student).await.unwrap().total, 10);
    }
}
