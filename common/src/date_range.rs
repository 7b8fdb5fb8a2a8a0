use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::shift::WEEK_DAYS;

/// Calendar days covered by one sheet (two weeks).
pub const SHEET_DAYS: i64 = 14;

/// Offset of the default end date from the start date.
pub const DEFAULT_SPAN_DAYS: u64 = 13;

const ISO_FORMAT: &str = "%Y-%m-%d";

/// Month names in the genitive case, as used after a day number.
const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// The resolved, inclusive range of days the roster covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, clamping an `end` before `start` to `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if end < start {
            tracing::debug!("end date {end} precedes start {start}; clamping to a single day");
            return Self { start, end: start };
        }
        Self { start, end }
    }

    /// Resolve the two date fields as typed by the user.
    ///
    /// An unparsable start falls back to `today`; an unparsable end falls
    /// back to start + 13 days.
    pub fn resolve(start_text: &str, end_text: &str, today: NaiveDate) -> Self {
        let start = parse_iso_date(start_text).unwrap_or(today);
        let end = parse_iso_date(end_text).unwrap_or_else(|| default_end(start));
        Self::new(start, end)
    }

    /// Initial field values for a fresh session: today and today + 13.
    pub fn default_texts(today: NaiveDate) -> (String, String) {
        (format_iso(today), format_iso(default_end(today)))
    }

    /// Number of days in the range, both ends included.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Sheets needed to print the range, never less than one.
    pub fn total_sheets(&self) -> usize {
        let span = self.span_days().max(0);
        let sheets = (span + SHEET_DAYS - 1) / SHEET_DAYS;
        sheets.max(1) as usize
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    /// Monday of the ISO week containing `start`.
    pub fn first_monday(&self) -> NaiveDate {
        start_of_iso_week(self.start)
    }

    /// Monday opening the given sheet. Saturates at the end of the
    /// representable calendar.
    pub fn sheet_monday(&self, sheet_index: usize) -> NaiveDate {
        let offset = (SHEET_DAYS as u64).saturating_mul(sheet_index as u64);
        add_days_saturating(self.first_monday(), offset)
    }

    /// Footer line printed on every sheet.
    pub fn footer_text(&self) -> String {
        format!(
            "График работы с {} по {}",
            self.start.format("%d.%m.%Y"),
            self.end.format("%d.%m.%Y")
        )
    }
}

/// Parse `YYYY-MM-DD`, tolerating surrounding whitespace.
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), ISO_FORMAT).ok()
}

pub fn format_iso(day: NaiveDate) -> String {
    day.format(ISO_FORMAT).to_string()
}

/// Short `dd.mm` label used in day headers.
pub fn format_day_month(day: NaiveDate) -> String {
    day.format("%d.%m").to_string()
}

/// Long heading form, e.g. `9 января, четверг`.
pub fn format_long_day(day: NaiveDate) -> String {
    format!(
        "{} {}, {}",
        day.day(),
        MONTHS_GENITIVE[day.month0() as usize],
        WEEK_DAYS[day.weekday().num_days_from_monday() as usize]
    )
}

pub fn start_of_iso_week(day: NaiveDate) -> NaiveDate {
    let back = day.weekday().num_days_from_monday() as u64;
    day.checked_sub_days(Days::new(back)).unwrap_or(day)
}

fn default_end(start: NaiveDate) -> NaiveDate {
    start
        .checked_add_days(Days::new(DEFAULT_SPAN_DAYS))
        .unwrap_or(start)
}

/// `day + days`, or the last representable date on overflow.
pub fn add_days_saturating(day: NaiveDate, days: u64) -> NaiveDate {
    day.checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX)
}

/// Current local calendar day.
#[cfg(feature = "std")]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn sheet_count_follows_fourteen_day_blocks() {
        let start = d(2025, 1, 1);
        assert_eq!(DateRange::new(start, start).total_sheets(), 1);
        assert_eq!(DateRange::new(start, d(2025, 1, 14)).total_sheets(), 1);
        assert_eq!(DateRange::new(start, d(2025, 1, 15)).total_sheets(), 2);
        assert_eq!(DateRange::new(start, d(2025, 1, 28)).total_sheets(), 2);
        assert_eq!(DateRange::new(start, d(2025, 1, 29)).total_sheets(), 3);
    }

    #[test]
    fn invalid_start_falls_back_to_today() {
        let today = d(2025, 3, 5);
        let range = DateRange::resolve("not a date", "2025-03-20", today);
        assert_eq!(range.start, today);
        assert_eq!(range.end, d(2025, 3, 20));
    }

    #[test]
    fn invalid_end_falls_back_to_start_plus_thirteen() {
        let today = d(2025, 3, 5);
        let range = DateRange::resolve("2025-02-01", "", today);
        assert_eq!(range.start, d(2025, 2, 1));
        assert_eq!(range.end, d(2025, 2, 14));
        assert_eq!(range.total_sheets(), 1);
    }

    #[test]
    fn both_invalid_gives_default_two_weeks() {
        let today = d(2025, 3, 5);
        let range = DateRange::resolve("??", "2025-13-40", today);
        assert_eq!(range, DateRange::new(today, d(2025, 3, 18)));
    }

    #[test]
    fn end_before_start_is_clamped() {
        let range = DateRange::resolve("2025-05-10", "2025-05-01", d(2025, 1, 1));
        assert_eq!(range.start, d(2025, 5, 10));
        assert_eq!(range.end, d(2025, 5, 10));
        assert_eq!(range.total_sheets(), 1);
    }

    #[test]
    fn default_texts_span_two_weeks() {
        let (start, end) = DateRange::default_texts(d(2024, 12, 25));
        assert_eq!(start, "2024-12-25");
        assert_eq!(end, "2025-01-07");
    }

    #[test]
    fn first_monday_is_on_or_before_start() {
        // 2025-01-01 is a Wednesday.
        let range = DateRange::new(d(2025, 1, 1), d(2025, 1, 20));
        assert_eq!(range.first_monday(), d(2024, 12, 30));
        assert_eq!(range.sheet_monday(1), d(2025, 1, 13));
        assert_eq!(start_of_iso_week(d(2024, 12, 30)), d(2024, 12, 30));
        assert_eq!(start_of_iso_week(d(2025, 1, 5)), d(2024, 12, 30));
    }

    #[test]
    fn sheet_monday_saturates_at_calendar_end() {
        let last = NaiveDate::MAX;
        let start = last.checked_sub_days(Days::new(11)).unwrap();
        let range = DateRange::resolve(&format_iso(start), &format_iso(last), d(2025, 1, 1));
        assert_eq!(range.end, last);
        assert_eq!(range.total_sheets(), 1);
        assert_eq!(range.sheet_monday(0), range.first_monday());
        assert_eq!(range.sheet_monday(usize::MAX), NaiveDate::MAX);
        assert_eq!(add_days_saturating(NaiveDate::MAX, 1), NaiveDate::MAX);
    }

    #[test]
    fn footer_uses_dotted_dates() {
        let range = DateRange::new(d(2025, 1, 1), d(2025, 1, 20));
        assert_eq!(range.footer_text(), "График работы с 01.01.2025 по 20.01.2025");
        assert_eq!(format_day_month(d(2025, 1, 9)), "09.01");
    }

    #[test]
    fn long_day_uses_genitive_month_and_weekday() {
        assert_eq!(format_long_day(d(2025, 1, 9)), "9 января, четверг");
        assert_eq!(format_long_day(d(2025, 3, 1)), "1 марта, суббота");
        assert_eq!(format_long_day(d(2024, 12, 29)), "29 декабря, воскресенье");
    }
}
