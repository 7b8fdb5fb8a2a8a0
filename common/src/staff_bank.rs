use serde::{Deserialize, Serialize};

use crate::schedule::{AssignmentId, IdMinter, StaffAssignment};

/// Default number of templates kept in the bank.
pub const BANK_CAPACITY: usize = 30;

/// Reusable staff templates, most recent first.
///
/// At most one entry per avatar image; remembering an avatar that is already
/// present replaces the old entry and moves it to the front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffBank {
    entries: Vec<StaffAssignment>,
    #[serde(skip, default = "default_capacity")]
    capacity: usize,
}

fn default_capacity() -> usize {
    BANK_CAPACITY
}

impl StaffBank {
    pub fn new() -> Self {
        Self::with_capacity(BANK_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Rebuild a bank from stored entries, enforcing capacity and dedup.
    pub fn from_entries(entries: Vec<StaffAssignment>, capacity: usize) -> Self {
        let mut bank = Self::with_capacity(capacity);
        for entry in entries.into_iter().rev() {
            bank.remember(entry);
        }
        bank
    }

    pub fn entries(&self) -> &[StaffAssignment] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &AssignmentId) -> Option<&StaffAssignment> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// Put `entry` at the front, dropping any entry with the same avatar and
    /// whatever falls off the end.
    pub fn remember(&mut self, entry: StaffAssignment) {
        self.entries.retain(|e| e.avatar != entry.avatar);
        self.entries.insert(0, entry);
        self.entries.truncate(self.capacity);
    }

    pub fn remove(&mut self, id: &AssignmentId) -> Option<StaffAssignment> {
        let pos = self.entries.iter().position(|e| &e.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// Clone a template for placement under a fresh id.
    pub fn instantiate(&self, id: &AssignmentId, ids: &mut IdMinter) -> Option<StaffAssignment> {
        self.get(id).map(|template| template.reissue(ids))
    }
}

impl Default for StaffBank {
    fn default() -> Self {
        Self::new()
    }
}
