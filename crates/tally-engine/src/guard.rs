//! Optimistic toggle application with rollback.
//!
//! A toggle is planned against the local view, applied to it immediately,
//! then persisted as one atomic batch. If the batch fails, the applied
//! changes are reverted and the caller gets [`SyncError::Persistence`].
//! There is no automatic retry and no pending state visible to readers:
//! they see the optimistic state until it is either confirmed or undone.
//!
//! Only the keys a toggle touched are reverted, so a failed toggle does not
//! undo a concurrent toggle on other keys. Toggles that would touch a key
//! already being saved are refused while single-flight is enabled. For
//! streak tasks the bonus key is always reserved, which serializes toggles
//! within one streak task.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tally_ledger::{
    LedgerStore, LedgerView, LedgerViolation, StreakProgress, plan_toggle, streak_progress,
    validate_ledger,
};
use tally_types::{
    CompletionState, EntryId, LedgerEntry, Notification, Points, StudentId, Task, ToggleResult,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::backend::{LedgerBatch, PersistenceBackend};
use crate::clock::Clock;
use crate::config::GuardConfig;
use crate::error::SyncError;

/// What a confirmed toggle did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub completion: EntryId,
    pub state: CompletionState,
    pub point_delta: Points,
    pub notification: Option<Notification>,
}

#[derive(Debug, Default)]
struct GuardState {
    view: LedgerView,
    in_flight: HashSet<EntryId>,
}

/// Owns one student's local ledger view and keeps it consistent with the
/// persistence backend.
pub struct ConsistencyGuard {
    student: StudentId,
    backend: Arc<dyn PersistenceBackend>,
    clock: Arc<dyn Clock>,
    config: GuardConfig,
    state: Mutex<GuardState>,
}

impl ConsistencyGuard {
    /// Start a session from the student's persisted ledger.
    ///
    /// A stored total that does not reconcile with its entries is logged and
    /// kept as is; the next full reload is the only remedy.
    pub async fn hydrate(
        student: StudentId,
        backend: Arc<dyn PersistenceBackend>,
        clock: Arc<dyn Clock>,
        config: GuardConfig,
    ) -> Result<Self, SyncError> {
        let stored = backend
            .load(&student)
            .await
            .map_err(|source| SyncError::Hydration {
                student: student.clone(),
                source,
            })?;

        let view = LedgerView::new(LedgerStore::from_entries(stored.entries), stored.total);
        if let Err(err) = view.reconcile() {
            warn!(student = %student, error = %err, "hydrated ledger does not reconcile");
        }
        debug!(
            student = %student,
            entries = view.store.len(),
            total = view.total,
            "ledger hydrated"
        );

        Ok(Self {
            student,
            backend,
            clock,
            config,
            state: Mutex::new(GuardState {
                view,
                in_flight: HashSet::new(),
            }),
        })
    }

    pub fn student(&self) -> &StudentId {
        &self.student
    }

    /// Toggle `task` on `day` and persist the result.
    ///
    /// The local view reflects the toggle as soon as this call starts
    /// waiting on the backend. On `Err(SyncError::Persistence)` it has
    /// already been restored to its pre-toggle contents.
    pub async fn toggle_completion(
        &self,
        day: NaiveDate,
        task: &Task,
    ) -> Result<ToggleOutcome, SyncError> {
        let today = self.clock.today();
        let now = self.clock.now();

        let (result, reserved, applied) = {
            let mut state = self.state.lock().await;
            let result = plan_toggle(&state.view.store, task, day, today, now);
            let reserved = reserved_keys(&result, task);

            if self.config.is_single_flight() {
                if let Some(id) = reserved.iter().find(|id| state.in_flight.contains(*id)) {
                    debug!(student = %self.student, id = %id, "toggle refused, key in flight");
                    return Err(SyncError::ToggleInFlight { id: id.clone() });
                }
            }

            let applied = state.view.apply(&result);
            state.in_flight.extend(reserved.iter().cloned());
            (result, reserved, applied)
        };

        let batch = LedgerBatch::from_result(&result, now);
        debug!(
            student = %self.student,
            batch = %batch.batch_id,
            completion = %result.completion,
            state = %result.state,
            recurrence = task.recurrence.name(),
            upserts = batch.upserts.len(),
            deletes = batch.deletes.len(),
            delta = result.point_delta,
            "toggle applied locally"
        );

        let committed = self.backend.commit(&self.student, &batch).await;

        let mut state = self.state.lock().await;
        for id in &reserved {
            state.in_flight.remove(id);
        }

        match committed {
            Ok(()) => {
                info!(
                    student = %self.student,
                    batch = %batch.batch_id,
                    completion = %result.completion,
                    delta = result.point_delta,
                    "toggle committed"
                );
                if let Some(Notification::StreakBonusAwarded { bonus_points, .. }) =
                    &result.notification
                {
                    info!(
                        student = %self.student,
                        task = %task.id,
                        bonus_points,
                        "streak bonus awarded"
                    );
                }
                if self.config.verifies_after_commit() {
                    if let Err(err) = state.view.reconcile() {
                        warn!(student = %self.student, error = %err, "ledger drift after commit");
                    }
                }
                Ok(ToggleOutcome {
                    completion: result.completion,
                    state: result.state,
                    point_delta: result.point_delta,
                    notification: result.notification,
                })
            }
            Err(source) => {
                state.view.revert(applied);
                warn!(
                    student = %self.student,
                    batch = %batch.batch_id,
                    completion = %result.completion,
                    error = %source,
                    "commit failed, toggle rolled back"
                );
                Err(SyncError::Persistence { source })
            }
        }
    }

    pub async fn total(&self) -> Points {
        self.state.lock().await.view.total
    }

    pub async fn is_complete(&self, id: &EntryId) -> bool {
        self.state.lock().await.view.store.has(id)
    }

    pub async fn entries(&self) -> Vec<LedgerEntry> {
        self.state.lock().await.view.store.iter().cloned().collect()
    }

    pub async fn streak_progress(&self, task: &Task) -> StreakProgress {
        streak_progress(&self.state.lock().await.view.store, task)
    }

    /// Clone of the current local view.
    pub async fn view(&self) -> LedgerView {
        self.state.lock().await.view.clone()
    }

    /// Run the full invariant check against a roster.
    pub async fn audit(&self, tasks: &[Task]) -> Vec<LedgerViolation> {
        let state = self.state.lock().await;
        validate_ledger(&state.view.store, state.view.total, tasks)
    }
}

/// Keys held while a toggle is being saved.
fn reserved_keys(result: &ToggleResult, task: &Task) -> HashSet<EntryId> {
    let mut keys: HashSet<EntryId> = result.touched_ids().cloned().collect();
    if task.is_streak() {
        keys.insert(EntryId::streak_bonus(task.id.clone()));
    }
    keys
}
