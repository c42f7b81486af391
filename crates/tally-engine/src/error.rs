use tally_types::{EntryId, StudentId};
use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The batch did not commit. Local state has already been rolled back;
    /// the user may retry by toggling again.
    #[error("failed to save progress, check connection")]
    Persistence {
        #[source]
        source: BackendError,
    },
    #[error("a toggle touching {id} is still being saved")]
    ToggleInFlight { id: EntryId },
    #[error("failed to load ledger for student {student}")]
    Hydration {
        student: StudentId,
        #[source]
        source: BackendError,
    },
    #[error("failed to load tasks for student {student}")]
    Roster {
        student: StudentId,
        #[source]
        source: BackendError,
    },
}
