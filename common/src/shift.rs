use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown in empty holiday and weekend cells.
pub const OFF_LABEL: &str = "выходной";

/// Header background for Monday–Friday columns.
pub const HEADER_WEEKDAY: &str = "#4c6467";
/// Header background for Saturday/Sunday columns.
pub const HEADER_WEEKEND: &str = "#dc2626";
/// Header background for days outside the resolved range.
pub const HEADER_OUT_OF_RANGE: &str = "#f1f5f9";
/// Cell background for weekend columns, regardless of slot.
pub const WEEKEND_CELL_BG: &str = "#fee2e2";
/// Translucent overlay drawn on top of weekend cells.
pub const WEEKEND_CELL_OVERLAY: &str = "rgba(220, 38, 38, 0.05)";
/// Fill for masked (out-of-range) cells.
pub const MASKED_CELL_BG: &str = "#f1f5f9";

/// Weekday names, Monday first.
pub const WEEK_DAYS: [&str; 7] = [
    "понедельник",
    "вторник",
    "среда",
    "четверг",
    "пятница",
    "суббота",
    "воскресенье",
];

/// One of the fixed roster rows of a week block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShiftSlot {
    /// Day shift, 09:00–18:00.
    Shift1,
    /// Afternoon shift, 14:00–22:00.
    Shift2,
    /// Night shift, 18:00–02:00.
    Shift3,
    /// Day off.
    Holiday,
    /// Free-form row with an icon instead of a label.
    Extra,
}

impl ShiftSlot {
    /// All slots in display order.
    pub const ALL: [ShiftSlot; 5] = [
        ShiftSlot::Shift1,
        ShiftSlot::Shift2,
        ShiftSlot::Shift3,
        ShiftSlot::Holiday,
        ShiftSlot::Extra,
    ];

    /// Stable code used in schedule keys.
    pub fn code(self) -> &'static str {
        match self {
            ShiftSlot::Shift1 => "I",
            ShiftSlot::Shift2 => "II",
            ShiftSlot::Shift3 => "III",
            ShiftSlot::Holiday => "OFF",
            ShiftSlot::Extra => "EXTRA",
        }
    }

    /// Row header label.
    pub fn label(self) -> &'static str {
        match self {
            ShiftSlot::Shift1 => "I",
            ShiftSlot::Shift2 => "II",
            ShiftSlot::Shift3 => "III",
            ShiftSlot::Holiday => OFF_LABEL,
            ShiftSlot::Extra => "",
        }
    }

    /// Working hours as printed under the label, one time per line.
    pub fn time_range(self) -> Option<(&'static str, &'static str)> {
        match self {
            ShiftSlot::Shift1 => Some(("09:00", "18:00")),
            ShiftSlot::Shift2 => Some(("14:00", "22:00")),
            ShiftSlot::Shift3 => Some(("18:00", "02:00")),
            ShiftSlot::Holiday | ShiftSlot::Extra => None,
        }
    }

    /// Weekday cell background.
    pub fn color(self) -> &'static str {
        match self {
            ShiftSlot::Shift1 => "#e6ccb9",
            ShiftSlot::Shift2 => "#b7d8d4",
            ShiftSlot::Shift3 => "#7e9f9c",
            ShiftSlot::Holiday => "#fca5a5",
            ShiftSlot::Extra => "#cbd5e1",
        }
    }

    /// Icon replacing the label in the row header.
    pub fn icon(self) -> Option<&'static str> {
        match self {
            ShiftSlot::Extra => Some("🌴"),
            _ => None,
        }
    }

    /// Whether an empty cell in this row reads as a day off.
    pub fn is_day_off(self) -> bool {
        matches!(self, ShiftSlot::Holiday)
    }
}

impl fmt::Display for ShiftSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
