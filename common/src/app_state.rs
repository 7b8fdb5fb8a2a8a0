use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::avatar::AvatarEdit;
use crate::config::DesignerConfig;
use crate::date_range::DateRange;
use crate::error::{ExportError, StorageError};
use crate::export::{ExportJob, ExportStatus, ExportSummary};
use crate::pagination::Pager;
use crate::schedule::{
    AssignmentId, IdMinter, ScheduleKey, ScheduleStore, StaffAssignment, DEFAULT_STAFF_NAME,
};
use crate::sheet::{build_sheet, SheetGeometry};
use crate::staff_bank::StaffBank;

pub const KEY_START_DATE: &str = "shift_designer_start_date";
pub const KEY_END_DATE: &str = "shift_designer_end_date";
pub const KEY_EMPLOYEE_BANK: &str = "shift_designer_employee_bank";

/// Best-effort string storage that survives reloads (localStorage in the
/// browser).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store for native builds and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
    /// Make every write fail, to exercise the degraded path.
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::QuotaExceeded);
        }
        self.values.insert(key.into(), value.into());
        Ok(())
    }
}

/// Everything the designer knows during a session.
///
/// Date fields and the staff bank are read from the store at load and
/// written back whenever they change. The schedule itself is never stored.
pub struct AppState {
    start_text: String,
    end_text: String,
    range: DateRange,
    pager: Pager,
    schedule: ScheduleStore,
    bank: StaffBank,
    export: ExportStatus,
    editing: Option<ScheduleKey>,
    last_error: Option<String>,
    ids: IdMinter,
    config: DesignerConfig,
    store: Box<dyn KeyValueStore>,
}

impl AppState {
    pub fn load(store: Box<dyn KeyValueStore>, today: NaiveDate, config: DesignerConfig) -> Self {
        let (default_start, default_end) = DateRange::default_texts(today);
        let start_text = read_or_warn(store.as_ref(), KEY_START_DATE).unwrap_or(default_start);
        let end_text = read_or_warn(store.as_ref(), KEY_END_DATE).unwrap_or(default_end);

        let bank = match read_or_warn(store.as_ref(), KEY_EMPLOYEE_BANK) {
            Some(json) => match serde_json::from_str::<Vec<StaffAssignment>>(&json) {
                Ok(entries) => StaffBank::from_entries(entries, config.bank_capacity),
                Err(e) => {
                    tracing::warn!("discarding unreadable staff bank: {e}");
                    StaffBank::with_capacity(config.bank_capacity)
                }
            },
            None => StaffBank::with_capacity(config.bank_capacity),
        };

        let range = DateRange::resolve(&start_text, &end_text, today);
        let pager = Pager::new(range.total_sheets(), config.pager.clone());

        Self {
            start_text,
            end_text,
            range,
            pager,
            schedule: ScheduleStore::new(),
            bank,
            export: ExportStatus::Idle,
            editing: None,
            last_error: None,
            ids: IdMinter::new(),
            config,
            store,
        }
    }

    pub fn start_text(&self) -> &str {
        &self.start_text
    }

    pub fn end_text(&self) -> &str {
        &self.end_text
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn schedule(&self) -> &ScheduleStore {
        &self.schedule
    }

    pub fn bank(&self) -> &StaffBank {
        &self.bank
    }

    pub fn export_status(&self) -> &ExportStatus {
        &self.export
    }

    pub fn is_exporting(&self) -> bool {
        self.export.is_exporting()
    }

    pub fn editing(&self) -> Option<ScheduleKey> {
        self.editing
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The sheet currently on screen (and on the capture surface).
    pub fn current_sheet(&self) -> SheetGeometry {
        build_sheet(&self.range, self.pager.current(), &self.schedule)
    }

    // ── Date range (locked while exporting) ─────────────────────────────

    pub fn set_start_text(&mut self, text: impl Into<String>, today: NaiveDate) {
        if self.is_exporting() {
            tracing::debug!("start date edit ignored during export");
            return;
        }
        self.start_text = text.into();
        self.date_fields_changed(today);
    }

    pub fn set_end_text(&mut self, text: impl Into<String>, today: NaiveDate) {
        if self.is_exporting() {
            tracing::debug!("end date edit ignored during export");
            return;
        }
        self.end_text = text.into();
        self.date_fields_changed(today);
    }

    fn date_fields_changed(&mut self, today: NaiveDate) {
        self.range = DateRange::resolve(&self.start_text, &self.end_text, today);
        self.pager.set_total(self.range.total_sheets());
        write(self.store.as_mut(), KEY_START_DATE, &self.start_text);
        write(self.store.as_mut(), KEY_END_DATE, &self.end_text);
    }

    // ── Navigation (locked while exporting) ─────────────────────────────

    pub fn next_sheet(&mut self) -> bool {
        !self.is_exporting() && self.pager.next()
    }

    pub fn prev_sheet(&mut self) -> bool {
        !self.is_exporting() && self.pager.prev()
    }

    pub fn wheel(&mut self, delta_y: f64, now_ms: u64) -> bool {
        !self.is_exporting() && self.pager.on_wheel(delta_y, now_ms)
    }

    // ── Cell editing ────────────────────────────────────────────────────

    pub fn open_cell(&mut self, key: ScheduleKey) {
        if self.is_exporting() {
            return;
        }
        self.editing = Some(key);
    }

    pub fn close_cell(&mut self) {
        self.editing = None;
    }

    /// Assignments of the cell being edited.
    pub fn editing_assignments(&self) -> &[StaffAssignment] {
        match &self.editing {
            Some(key) => self.schedule.assignments(key),
            None => &[],
        }
    }

    /// Put a freshly edited avatar into the open cell and remember it in the
    /// staff bank.
    pub fn add_new_staff(&mut self, edit: AvatarEdit) -> Option<AssignmentId> {
        let key = self.editing?;
        let assignment = StaffAssignment::new(self.ids.mint(), DEFAULT_STAFF_NAME, edit);
        let id = assignment.id.clone();
        self.schedule.append(key, assignment.clone());
        self.bank.remember(assignment);
        self.persist_bank();
        Some(id)
    }

    /// Place a copy of a bank entry in the open cell.
    pub fn place_from_bank(&mut self, template: &AssignmentId) -> Option<AssignmentId> {
        let key = self.editing?;
        let placed = self.bank.instantiate(template, &mut self.ids)?;
        let id = placed.id.clone();
        self.schedule.append(key, placed);
        Some(id)
    }

    pub fn remove_from_cell(&mut self, index: usize) -> Option<StaffAssignment> {
        let key = self.editing?;
        self.schedule.remove_at(&key, index)
    }

    pub fn remove_from_bank(&mut self, id: &AssignmentId) -> Option<StaffAssignment> {
        let removed = self.bank.remove(id)?;
        self.persist_bank();
        Some(removed)
    }

    // ── Export bookkeeping ──────────────────────────────────────────────

    /// Enter the exporting state, or refuse if a run is in flight.
    pub fn begin_export(&mut self, today: NaiveDate) -> Result<ExportJob, ExportError> {
        if self.is_exporting() {
            return Err(ExportError::AlreadyRunning);
        }
        let job = ExportJob {
            total_sheets: self.range.total_sheets(),
            original_sheet: self.pager.current(),
            today,
            config: self.config.export.clone(),
        };
        self.editing = None;
        self.last_error = None;
        self.export = ExportStatus::Exporting {
            sheet: job.original_sheet,
            progress: 0,
            text: String::new(),
        };
        Ok(job)
    }

    /// Move the capture surface. Only the export pipeline calls this, which
    /// is why it bypasses the navigation lock.
    pub fn show_sheet_for_export(&mut self, sheet: usize) {
        self.pager.go_to(sheet);
    }

    pub fn apply_export_status(&mut self, status: ExportStatus) {
        self.export = status;
    }

    pub fn finish_export(&mut self, result: &Result<ExportSummary, ExportError>) {
        self.export = ExportStatus::Idle;
        if let Err(e) = result {
            self.last_error = Some(e.to_string());
        }
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    // ── Persistence ─────────────────────────────────────────────────────

    fn persist_bank(&mut self) {
        match serde_json::to_string(&self.bank) {
            Ok(json) => write(self.store.as_mut(), KEY_EMPLOYEE_BANK, &json),
            Err(e) => {
                let err = StorageError::Encode {
                    key: KEY_EMPLOYEE_BANK.into(),
                    reason: e.to_string(),
                };
                tracing::warn!("{err}");
            }
        }
    }
}

fn write(store: &mut dyn KeyValueStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        tracing::warn!("LocalStorage quota exceeded or unavailable: {e}");
    }
}

fn read_or_warn(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("could not read {key}: {e}");
            None
        }
    }
}
