pub mod entry;
pub mod entry_id;
pub mod error;
pub mod notification;
pub mod task;

pub use entry::{CompletionState, LedgerEntry, ToggleResult};
pub use entry_id::{EntryId, StudentId, TaskId};
pub use error::DomainError;
pub use notification::Notification;
pub use task::{Points, RecurrenceKind, Task};
