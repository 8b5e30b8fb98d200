//! In-memory bookmark list for one open view.
//!
//! Three sources feed the list: the snapshot loaded when the view opens,
//! results of the view's own writes, and change events from the feed. They
//! race, and the same record can arrive through more than one of them, so
//! every merge is keyed by id and idempotent. Whichever path delivers an
//! insert first wins; the other becomes a no-op.
//!
//! Order is newest-first only as loaded. Inserts are prepended, updates keep
//! their position, and nothing is ever re-sorted.

use std::collections::HashSet;

use crate::types::bookmark::Bookmark;
use crate::types::feed::ChangeEvent;

/// Ordered bookmark sequence keyed by id.
#[derive(Debug, Default, Clone)]
pub struct ListReconciler {
    sequence: Vec<Bookmark>,
}

impl ListReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the sequence with a server snapshot (expected newest-first).
    ///
    /// The snapshot is taken as given; duplicates in it are hidden by
    /// [`ListReconciler::items`] rather than rejected here.
    pub fn seed(&mut self, initial: Vec<Bookmark>) {
        self.sequence = initial;
    }

    /// Merges the record returned by a successful local create.
    pub fn apply_local_insert(&mut self, record: Bookmark) -> bool {
        self.prepend_if_absent(record)
    }

    /// Merges an insert delivered by the change feed.
    pub fn apply_remote_insert(&mut self, record: Bookmark) -> bool {
        self.prepend_if_absent(record)
    }

    /// Merges the record returned by a successful local edit.
    pub fn apply_local_update(&mut self, record: Bookmark) -> bool {
        self.replace_in_place(record)
    }

    /// Merges an update delivered by the change feed. An update for an id we
    /// do not hold (deleted here first, or insert not seen yet) is ignored.
    pub fn apply_remote_update(&mut self, record: Bookmark) -> bool {
        self.replace_in_place(record)
    }

    /// Removes every entry with `id`. Local delete confirmations and remote
    /// delete events both land here.
    pub fn remove_by_id(&mut self, id: &str) -> bool {
        let before = self.sequence.len();
        self.sequence.retain(|b| b.id != id);
        self.sequence.len() != before
    }

    /// Routes a change feed event to the matching merge.
    pub fn apply(&mut self, event: ChangeEvent) -> bool {
        match event {
            ChangeEvent::Insert(record) => self.apply_remote_insert(record),
            ChangeEvent::Update(record) => self.apply_remote_update(record),
            ChangeEvent::Delete { id, .. } => self.remove_by_id(&id),
        }
    }

    /// Render-ready view of the sequence, first occurrence per id only.
    pub fn items(&self) -> Vec<Bookmark> {
        dedupe(&self.sequence)
    }

    /// Number of distinct ids, i.e. `items().len()`.
    pub fn len(&self) -> usize {
        self.sequence.iter().map(|b| b.id.as_str()).collect::<HashSet<_>>().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sequence.iter().any(|b| b.id == id)
    }

    /// Raw sequence, duplicates included.
    pub fn raw(&self) -> &[Bookmark] {
        &self.sequence
    }

    fn prepend_if_absent(&mut self, record: Bookmark) -> bool {
        if self.contains(&record.id) {
            return false;
        }
        self.sequence.insert(0, record);
        true
    }

    fn replace_in_place(&mut self, record: Bookmark) -> bool {
        let mut changed = false;
        for entry in self.sequence.iter_mut().filter(|b| b.id == record.id) {
            if *entry != record {
                *entry = record.clone();
                changed = true;
            }
        }
        changed
    }
}

/// Keeps the first occurrence of each id, preserving order.
pub fn dedupe(sequence: &[Bookmark]) -> Vec<Bookmark> {
    let mut seen = HashSet::with_capacity(sequence.len());
    let mut out = Vec::with_capacity(sequence.len());
    for bookmark in sequence {
        if seen.insert(bookmark.id.as_str()) {
            out.push(bookmark.clone());
        }
    }
    out
}
