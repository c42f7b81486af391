use thiserror;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("invalid ledger entry id '{id}': {reason}")]
    InvalidEntryId { id: String, reason: &'static str },
}
