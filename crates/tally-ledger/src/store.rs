use std::collections::BTreeMap;

use tally_types::{EntryId, LedgerEntry, Points, TaskId};

/// In-memory snapshot of one student's ledger, keyed by [`EntryId`].
///
/// Keys are unique, so `put` is an upsert. No concurrency control lives
/// here; the owner of the store serializes access.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerStore {
    entries: BTreeMap<EntryId, LedgerEntry>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted entries. A later duplicate key replaces
    /// an earlier one.
    pub fn from_entries(entries: impl IntoIterator<Item = LedgerEntry>) -> Self {
        let mut store = Self::new();
        for entry in entries {
            store.put(entry);
        }
        store
    }

    pub fn has(&self, id: &EntryId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &EntryId) -> Option<&LedgerEntry> {
        self.entries.get(id)
    }

    /// Insert or replace, returning the replaced entry.
    pub fn put(&mut self, entry: LedgerEntry) -> Option<LedgerEntry> {
        self.entries.insert(entry.id.clone(), entry)
    }

    pub fn delete(&mut self, id: &EntryId) -> Option<LedgerEntry> {
        self.entries.remove(id)
    }

    /// Entries whose key belongs to `task_id`, including its bonus entry.
    ///
    /// Scan complexity: O(n).
    pub fn all_for_task<'a>(&'a self, task_id: &'a TaskId) -> impl Iterator<Item = &'a LedgerEntry> {
        self.entries
            .values()
            .filter(move |entry| entry.id.task_id() == task_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.values()
    }

    /// Sum of `points_earned` over every entry. The recorded total must
    /// always equal this.
    pub fn sum_points(&self) -> Points {
        self.entries.values().map(|entry| entry.points_earned).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
