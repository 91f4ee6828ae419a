use std::collections::HashMap;

use crate::types::{NotesPage, NotesQuery};

/// Fetched note pages keyed by the query that produced them.
///
/// Every `invalidate` starts a new epoch. A fetch records the epoch it began
/// in, and its result is only stored if no invalidation happened meanwhile,
/// so a page fetched before a note was created never repopulates the cache.
#[derive(Debug, Default)]
pub struct NotesCache {
    entries: HashMap<NotesQuery, NotesPage>,
    epoch: u64,
}

impl NotesCache {
    pub fn get(&self, query: &NotesQuery) -> Option<&NotesPage> {
        self.entries.get(query)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Store a page fetched during `epoch`. Returns false if it is stale.
    pub fn insert(&mut self, epoch: u64, query: NotesQuery, page: NotesPage) -> bool {
        if epoch != self.epoch {
            return false;
        }
        self.entries.insert(query, page);
        true
    }

    /// Drop every cached page of the notes collection.
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.epoch += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
