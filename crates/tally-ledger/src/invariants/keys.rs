use tally_types::LedgerEntry;

use crate::error::LedgerViolation;

use super::AuditContext;

pub(crate) fn check(_ctx: &AuditContext<'_>, entry: &LedgerEntry) -> Result<(), LedgerViolation> {
    if entry.id.task_id() != &entry.task_id {
        return Err(LedgerViolation::EntryKeyMismatch {
            id: entry.id.clone(),
            task_id: entry.task_id.clone(),
        });
    }
    Ok(())
}
