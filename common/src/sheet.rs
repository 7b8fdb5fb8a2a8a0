//! Projection of the roster onto printable two-week sheets.
//!
//! Everything here is a pure function of the date range, the sheet index and
//! the schedule store. The on-screen sheet and the off-screen capture target
//! are rendered from the same [`SheetGeometry`], which is what keeps the
//! exported pages identical to what the user sees.

use chrono::NaiveDate;

use crate::date_range::{add_days_saturating, format_day_month, DateRange};
use crate::schedule::{ScheduleKey, ScheduleStore, StaffAssignment};
use crate::shift::{
    ShiftSlot, HEADER_OUT_OF_RANGE, HEADER_WEEKDAY, HEADER_WEEKEND, MASKED_CELL_BG, OFF_LABEL,
    WEEKEND_CELL_BG, WEEKEND_CELL_OVERLAY, WEEK_DAYS,
};

pub const WEEKS_PER_SHEET: usize = 2;
pub const DAYS_PER_WEEK: usize = 7;

/// A3 landscape at 96 dpi.
pub const SHEET_WIDTH_PX: f64 = 1587.0;
pub const SHEET_HEIGHT_PX: f64 = 1123.0;
pub const SHEET_PADDING_PX: f64 = 40.0;
pub const ROW_HEADER_WIDTH_PX: f64 = 112.0;
pub const DAY_HEADER_HEIGHT_PX: f64 = 80.0;
pub const WEEK_GAP_PX: f64 = 16.0;

/// Flex weight of a Saturday/Sunday column relative to a weekday column.
pub const WEEKEND_WIDTH_RATIO: f64 = 0.45;

/// Column header of one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayColumn {
    pub date: NaiveDate,
    /// 0 = Monday.
    pub column: usize,
    pub weekend: bool,
    pub in_range: bool,
}

impl DayColumn {
    pub fn weekday_name(&self) -> &'static str {
        WEEK_DAYS[self.column]
    }

    /// `dd.mm`, or nothing for days outside the range.
    pub fn date_label(&self) -> Option<String> {
        self.in_range.then(|| format_day_month(self.date))
    }

    pub fn header_color(&self) -> &'static str {
        if !self.in_range {
            HEADER_OUT_OF_RANGE
        } else if self.weekend {
            HEADER_WEEKEND
        } else {
            HEADER_WEEKDAY
        }
    }
}

/// What a cell shows.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// Outside the date range: blank, never shows assignments.
    Masked,
    Staffed(Vec<StaffAssignment>),
    /// Empty holiday-row or weekend cell, shows the day-off placeholder.
    Off,
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetCell {
    pub key: ScheduleKey,
    pub column: usize,
    pub weekend: bool,
    pub content: CellContent,
}

impl SheetCell {
    pub fn is_masked(&self) -> bool {
        matches!(self.content, CellContent::Masked)
    }

    pub fn assignments(&self) -> &[StaffAssignment] {
        match &self.content {
            CellContent::Staffed(list) => list,
            _ => &[],
        }
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        matches!(self.content, CellContent::Off).then_some(OFF_LABEL)
    }

    pub fn background(&self) -> &'static str {
        if self.is_masked() {
            MASKED_CELL_BG
        } else if self.weekend {
            WEEKEND_CELL_BG
        } else {
            self.key.slot.color()
        }
    }

    /// Tint laid over in-range weekend cells, above the background and
    /// below the avatars.
    pub fn overlay(&self) -> Option<&'static str> {
        (self.weekend && !self.is_masked()).then_some(WEEKEND_CELL_OVERLAY)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShiftRow {
    pub slot: ShiftSlot,
    pub cells: Vec<SheetCell>,
}

/// One calendar week: seven headers and five shift rows.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekBlock {
    pub monday: NaiveDate,
    pub days: Vec<DayColumn>,
    pub rows: Vec<ShiftRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetGeometry {
    /// 0-based.
    pub index: usize,
    pub total: usize,
    pub range: DateRange,
    pub weeks: Vec<WeekBlock>,
}

impl SheetGeometry {
    pub fn footer(&self) -> String {
        format!(
            "{} / Лист {} из {}",
            self.range.footer_text(),
            self.index + 1,
            self.total
        )
    }

    /// All day headers of the sheet, first week first.
    pub fn days(&self) -> impl Iterator<Item = &DayColumn> {
        self.weeks.iter().flat_map(|w| w.days.iter())
    }

    pub fn cells(&self) -> impl Iterator<Item = &SheetCell> {
        self.weeks
            .iter()
            .flat_map(|w| w.rows.iter())
            .flat_map(|r| r.cells.iter())
    }
}

/// Build the sheet at `sheet_index` for `range`.
///
/// Indices past the last sheet are not rejected; they simply produce a sheet
/// whose cells are all masked.
pub fn build_sheet(range: &DateRange, sheet_index: usize, store: &ScheduleStore) -> SheetGeometry {
    let sheet_monday = range.sheet_monday(sheet_index);
    let weeks = (0..WEEKS_PER_SHEET)
        .map(|w| {
            let monday = add_days_saturating(sheet_monday, (w * DAYS_PER_WEEK) as u64);
            build_week(range, monday, store)
        })
        .collect();

    SheetGeometry {
        index: sheet_index,
        total: range.total_sheets(),
        range: *range,
        weeks,
    }
}

fn build_week(range: &DateRange, monday: NaiveDate, store: &ScheduleStore) -> WeekBlock {
    let days: Vec<DayColumn> = (0..DAYS_PER_WEEK)
        .map(|column| {
            let date = add_days_saturating(monday, column as u64);
            DayColumn {
                date,
                column,
                weekend: is_weekend_column(column),
                in_range: range.contains(date),
            }
        })
        .collect();

    let rows = ShiftSlot::ALL
        .into_iter()
        .map(|slot| ShiftRow {
            slot,
            cells: days.iter().map(|day| build_cell(day, slot, store)).collect(),
        })
        .collect();

    WeekBlock { monday, days, rows }
}

fn build_cell(day: &DayColumn, slot: ShiftSlot, store: &ScheduleStore) -> SheetCell {
    let key = ScheduleKey::new(day.date, slot);
    let content = if !day.in_range {
        CellContent::Masked
    } else {
        let assigned = store.assignments(&key);
        if !assigned.is_empty() {
            CellContent::Staffed(assigned.to_vec())
        } else if slot.is_day_off() || day.weekend {
            CellContent::Off
        } else {
            CellContent::Empty
        }
    };
    SheetCell {
        key,
        column: day.column,
        weekend: day.weekend,
        content,
    }
}

/// Saturday and Sunday, counting from Monday = 0.
fn is_weekend_column(column: usize) -> bool {
    column >= 5
}

fn column_ratio(column: usize) -> f64 {
    if is_weekend_column(column) {
        WEEKEND_WIDTH_RATIO
    } else {
        1.0
    }
}

/// Horizontal extent of a day column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpan {
    pub x: f64,
    pub width: f64,
}

/// Pixel geometry of the fixed-size sheet, resolved from the flex weights.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub columns: [ColumnSpan; DAYS_PER_WEEK],
    pub week_height: f64,
    pub row_height: f64,
}

impl SheetLayout {
    pub fn standard() -> Self {
        let grid_left = SHEET_PADDING_PX + ROW_HEADER_WIDTH_PX;
        let grid_width = SHEET_WIDTH_PX - 2.0 * SHEET_PADDING_PX - ROW_HEADER_WIDTH_PX;
        let weights: f64 = (0..DAYS_PER_WEEK).map(column_ratio).sum();
        let unit = grid_width / weights;

        let mut columns = [ColumnSpan { x: 0.0, width: 0.0 }; DAYS_PER_WEEK];
        let mut x = grid_left;
        for (column, span) in columns.iter_mut().enumerate() {
            let width = unit * column_ratio(column);
            *span = ColumnSpan { x, width };
            x += width;
        }

        let inner_height = SHEET_HEIGHT_PX - 2.0 * SHEET_PADDING_PX;
        let week_height =
            (inner_height - WEEK_GAP_PX * (WEEKS_PER_SHEET - 1) as f64) / WEEKS_PER_SHEET as f64;
        let row_height = (week_height - DAY_HEADER_HEIGHT_PX) / ShiftSlot::ALL.len() as f64;

        Self {
            columns,
            week_height,
            row_height,
        }
    }

    /// Top edge of a week block.
    pub fn week_top(&self, week: usize) -> f64 {
        SHEET_PADDING_PX + week as f64 * (self.week_height + WEEK_GAP_PX)
    }

    /// Row header plus the seven day columns.
    pub fn week_width(&self) -> f64 {
        SHEET_WIDTH_PX - 2.0 * SHEET_PADDING_PX
    }
}

/// Zoom that fits the sheet into a `viewport_width`×`viewport_height`
/// window, leaving room for the toolbar and margins.
pub fn workspace_scale(viewport_width: f64, viewport_height: f64) -> f64 {
    let horizontal = (viewport_width - 100.0) / SHEET_WIDTH_PX;
    let vertical = (viewport_height - 180.0) / SHEET_HEIGHT_PX;
    horizontal.min(vertical).max(0.1)
}
