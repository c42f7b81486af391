mod backend;
mod clock;
mod config;
mod error;
mod guard;
mod provider;

pub use backend::{BackendError, InMemoryBackend, LedgerBatch, PersistenceBackend, StoredLedger};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::GuardConfig;
pub use error::SyncError;
pub use guard::{ConsistencyGuard, ToggleOutcome};
pub use provider::{StaticTaskProvider, TaskProvider, load_roster};
