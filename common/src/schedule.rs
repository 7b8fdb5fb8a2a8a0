use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::avatar::{AvatarEdit, AvatarImage, AvatarOffset};
use crate::date_range::format_iso;
use crate::shift::ShiftSlot;

/// Name given to staff created from the avatar editor.
pub const DEFAULT_STAFF_NAME: &str = "Сотрудник";

/// Identifier of one assignment record (not of a person).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssignmentId(pub String);

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mints assignment ids that never repeat within a session.
///
/// Ids are `<prefix>-<counter>`; the random prefix keeps ids minted in
/// different sessions (and stored in the staff bank) apart.
#[derive(Debug, Clone)]
pub struct IdMinter {
    prefix: String,
    next: u64,
}

impl IdMinter {
    pub fn new() -> Self {
        const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let mut rng = rand::thread_rng();
        let prefix: String = (0..6)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        Self::with_prefix(prefix)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }

    pub fn mint(&mut self) -> AssignmentId {
        let id = AssignmentId(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

impl Default for IdMinter {
    fn default() -> Self {
        Self::new()
    }
}

fn default_scale() -> f64 {
    1.0
}

/// A staff member placed in a cell.
///
/// Field names on the wire match what earlier builds stored in the browser,
/// so existing staff banks keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffAssignment {
    pub id: AssignmentId,
    pub name: String,
    #[serde(rename = "avatarUrl")]
    pub avatar: AvatarImage,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(rename = "position", default)]
    pub offset: AvatarOffset,
}

impl StaffAssignment {
    pub fn new(id: AssignmentId, name: impl Into<String>, edit: AvatarEdit) -> Self {
        Self {
            id,
            name: name.into(),
            avatar: edit.image,
            scale: edit.scale,
            offset: edit.offset,
        }
    }

    /// Copy of this record under a fresh id.
    pub fn reissue(&self, ids: &mut IdMinter) -> Self {
        Self {
            id: ids.mint(),
            ..self.clone()
        }
    }
}

/// One cell of the roster: a calendar day and a shift row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScheduleKey {
    pub date: NaiveDate,
    pub slot: ShiftSlot,
}

impl ScheduleKey {
    pub fn new(date: NaiveDate, slot: ShiftSlot) -> Self {
        Self { date, slot }
    }
}

impl fmt::Display for ScheduleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", format_iso(self.date), self.slot.code())
    }
}

/// In-memory roster. A key with no entry has no assignments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleStore {
    cells: BTreeMap<ScheduleKey, Vec<StaffAssignment>>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assignments of a cell in display order.
    pub fn assignments(&self, key: &ScheduleKey) -> &[StaffAssignment] {
        self.cells.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace a cell's list. An empty list clears the cell.
    pub fn set_assignments(&mut self, key: ScheduleKey, assignments: Vec<StaffAssignment>) {
        if assignments.is_empty() {
            self.cells.remove(&key);
        } else {
            self.cells.insert(key, assignments);
        }
    }

    pub fn append(&mut self, key: ScheduleKey, assignment: StaffAssignment) {
        self.cells.entry(key).or_default().push(assignment);
    }

    /// Remove the assignment at `index`. A stale index leaves the cell
    /// untouched and returns `None`.
    pub fn remove_at(&mut self, key: &ScheduleKey, index: usize) -> Option<StaffAssignment> {
        let list = self.cells.get_mut(key)?;
        if index >= list.len() {
            tracing::debug!("remove_at({key}, {index}) out of bounds (len {})", list.len());
            return None;
        }
        let removed = list.remove(index);
        if list.is_empty() {
            self.cells.remove(key);
        }
        Some(removed)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn staff(ids: &mut IdMinter, avatar: &str) -> StaffAssignment {
        StaffAssignment::new(
            ids.mint(),
            DEFAULT_STAFF_NAME,
            AvatarEdit {
                image: AvatarImage(avatar.into()),
                scale: 1.0,
                offset: AvatarOffset::default(),
            },
        )
    }

    fn key(day: u32, slot: ShiftSlot) -> ScheduleKey {
        ScheduleKey::new(NaiveDate::from_ymd_opt(2025, 1, day).unwrap(), slot)
    }

    #[test]
    fn absent_key_is_empty() {
        let store = ScheduleStore::new();
        assert!(store.assignments(&key(1, ShiftSlot::Shift1)).is_empty());
    }

    #[test]
    fn append_then_remove_at_zero_leaves_empty() {
        let mut ids = IdMinter::with_prefix("t");
        let mut store = ScheduleStore::new();
        let k = key(3, ShiftSlot::Shift2);
        store.append(k, staff(&mut ids, "a"));
        let removed = store.remove_at(&k, 0).unwrap();
        assert_eq!(removed.avatar.as_str(), "a");
        assert!(store.assignments(&k).is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn append_preserves_insertion_order() {
        let mut ids = IdMinter::with_prefix("t");
        let mut store = ScheduleStore::new();
        let k = key(3, ShiftSlot::Shift1);
        for avatar in ["a", "b", "c"] {
            store.append(k, staff(&mut ids, avatar));
        }
        let avatars: Vec<_> = store.assignments(&k).iter().map(|s| s.avatar.as_str()).collect();
        assert_eq!(avatars, ["a", "b", "c"]);

        store.remove_at(&k, 1);
        let avatars: Vec<_> = store.assignments(&k).iter().map(|s| s.avatar.as_str()).collect();
        assert_eq!(avatars, ["a", "c"]);
    }

    #[test]
    fn stale_index_is_a_no_op() {
        let mut ids = IdMinter::with_prefix("t");
        let mut store = ScheduleStore::new();
        let k = key(3, ShiftSlot::Shift3);
        store.append(k, staff(&mut ids, "a"));

        assert!(store.remove_at(&k, 1).is_none());
        assert!(store.remove_at(&key(4, ShiftSlot::Shift3), 0).is_none());
        assert_eq!(store.assignments(&k).len(), 1);
    }

    #[test]
    fn set_assignments_replaces_and_clears() {
        let mut ids = IdMinter::with_prefix("t");
        let mut store = ScheduleStore::new();
        let k = key(5, ShiftSlot::Extra);
        store.append(k, staff(&mut ids, "a"));
        store.set_assignments(k, vec![staff(&mut ids, "b"), staff(&mut ids, "c")]);
        assert_eq!(store.assignments(&k).len(), 2);
        store.set_assignments(k, Vec::new());
        assert!(store.is_empty());
    }

    #[test]
    fn minted_ids_are_unique_and_reissue_changes_id() {
        let mut ids = IdMinter::with_prefix("s");
        let a = staff(&mut ids, "a");
        let b = a.reissue(&mut ids);
        assert_ne!(a.id, b.id);
        assert_eq!(a.avatar, b.avatar);
        assert_eq!(a.id.0, "s-1");
        assert_eq!(b.id.0, "s-2");
    }

    #[test]
    fn random_prefix_is_six_base36_chars() {
        let mut ids = IdMinter::new();
        let first = ids.mint().0;
        let (prefix, counter) = first.split_once('-').unwrap();
        assert_eq!(prefix.len(), 6);
        assert!(prefix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_eq!(counter, "1");
        assert_eq!(ids.mint().0, format!("{prefix}-2"));
    }

    #[test]
    fn schedule_key_text_form() {
        assert_eq!(key(9, ShiftSlot::Holiday).to_string(), "2025-01-09_OFF");
    }

    #[test]
    fn legacy_bank_entry_without_transform_loads_with_defaults() {
        let json = r#"{"id":"abc123xyz","name":"Сотрудник","avatarUrl":"data:image/jpeg;base64,AAA"}"#;
        let entry: StaffAssignment = serde_json::from_str(json).unwrap();
        assert_eq!(entry.scale, 1.0);
        assert_eq!(entry.offset, AvatarOffset::default());
    }
}
