use tally_types::{EntryId, LedgerEntry, RecurrenceKind};

use crate::error::LedgerViolation;

use super::AuditContext;

/// Streak day markers must be worth zero. Uses the recurrence recorded on
/// the entry, so it holds for orphaned entries too.
pub(crate) fn check(_ctx: &AuditContext<'_>, entry: &LedgerEntry) -> Result<(), LedgerViolation> {
    let is_marker = matches!(entry.id, EntryId::Day { .. });
    if is_marker && entry.recurrence == RecurrenceKind::Streak && entry.points_earned != 0 {
        return Err(LedgerViolation::StreakMarkerCarriesPoints {
            id: entry.id.clone(),
            points: entry.points_earned,
        });
    }
    Ok(())
}
