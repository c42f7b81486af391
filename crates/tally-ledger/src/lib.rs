//! Pure ledger core: the entry store, streak progress, the toggle planner and
//! the invariant checker. Nothing in this crate performs I/O or can fail at
//! runtime; persistence and rollback live in `tally-engine`.

pub mod error;
pub mod invariants;
pub mod progress;
pub mod store;
pub mod toggle;
pub mod view;

pub use error::{LedgerError, LedgerViolation};
pub use invariants::validate_ledger;
pub use progress::{StreakProgress, streak_progress};
pub use store::LedgerStore;
pub use toggle::plan_toggle;
pub use view::{AppliedToggle, LedgerView};
