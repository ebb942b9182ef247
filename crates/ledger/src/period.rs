//! Calendar window arithmetic for reports and recurring entries.
//!
//! All windows are inclusive date ranges. The month count of a window is
//! what recurring amounts get multiplied by, so an annual window weighs a
//! fixed expense twelve times and a single month weighs it once.

use chrono::{Datelike, Months, NaiveDate};

use crate::{LedgerError, ResultLedger};

/// An inclusive `[start, end]` date range spanning whole or partial months.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Number of calendar months touched by the window, counted by the
    /// `(year, month)` distance between the endpoints.
    pub months: i64,
}

impl ReportWindow {
    /// A single calendar month, first day through last day.
    pub fn month(year: i32, month: u32) -> ResultLedger<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| LedgerError::Validation(format!("invalid month: {year}-{month}")))?;
        let end = last_day_of_month(year, month)
            .ok_or_else(|| LedgerError::Validation(format!("invalid month: {year}-{month}")))?;
        Ok(Self {
            start,
            end,
            months: 1,
        })
    }

    /// A whole calendar year, January 1 through December 31.
    pub fn year(year: i32) -> ResultLedger<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| LedgerError::Validation(format!("invalid year: {year}")))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| LedgerError::Validation(format!("invalid year: {year}")))?;
        Ok(Self {
            start,
            end,
            months: 12,
        })
    }

    /// An explicit inclusive range between two dates.
    pub fn range(start: NaiveDate, end: NaiveDate) -> ResultLedger<Self> {
        if end < start {
            return Err(LedgerError::Validation(
                "invalid range: start_date must be <= end_date".to_string(),
            ));
        }
        Ok(Self {
            start,
            end,
            months: months_spanned(start, end),
        })
    }

    /// Returns `true` when `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Counts the calendar months touched by `[start, end]`.
///
/// The count only looks at `(year, month)` of the endpoints, so a range
/// from Jan 15 to Mar 10 still spans three months.
#[must_use]
pub fn months_spanned(start: NaiveDate, end: NaiveDate) -> i64 {
    let years = i64::from(end.year()) - i64::from(start.year());
    let months = i64::from(end.month()) - i64::from(start.month());
    years * 12 + months + 1
}

/// Last day of the given month, `None` for out-of-range input.
#[must_use]
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_months(Months::new(1))?.pred_opt()
}

/// `(year, month, day)` as a date, falling back to the month's last day
/// when `day` does not exist in that month (e.g. day 31 in February).
#[must_use]
pub fn clamped_ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).or_else(|| last_day_of_month(year, month))
}

/// Advances one calendar month, clamping the day to the target month's
/// length. A clamped day stays clamped on subsequent hops (Jan 31 → Feb 28
/// → Mar 28).
#[must_use]
pub fn next_month(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn month_window_covers_whole_month() {
        let window = ReportWindow::month(2025, 4).unwrap();
        assert_eq!(window.start, date(2025, 4, 1));
        assert_eq!(window.end, date(2025, 4, 30));
        assert_eq!(window.months, 1);
    }

    #[test]
    fn leap_february_ends_on_the_29th() {
        let window = ReportWindow::month(2024, 2).unwrap();
        assert_eq!(window.end, date(2024, 2, 29));
        let window = ReportWindow::month(2025, 2).unwrap();
        assert_eq!(window.end, date(2025, 2, 28));
    }

    #[test]
    fn year_window_is_twelve_months() {
        let window = ReportWindow::year(2024).unwrap();
        assert_eq!(window.start, date(2024, 1, 1));
        assert_eq!(window.end, date(2024, 12, 31));
        assert_eq!(window.months, 12);
    }

    #[test]
    fn month_window_rejects_bad_month() {
        assert!(ReportWindow::month(2025, 13).is_err());
        assert!(ReportWindow::month(2025, 0).is_err());
    }

    #[test]
    fn range_counts_touched_months() {
        let window = ReportWindow::range(date(2024, 1, 15), date(2024, 3, 10)).unwrap();
        assert_eq!(window.months, 3);
        let window = ReportWindow::range(date(2023, 11, 1), date(2024, 2, 29)).unwrap();
        assert_eq!(window.months, 4);
        let window = ReportWindow::range(date(2024, 5, 7), date(2024, 5, 7)).unwrap();
        assert_eq!(window.months, 1);
    }

    #[test]
    fn range_rejects_inverted_endpoints() {
        assert!(ReportWindow::range(date(2024, 3, 1), date(2024, 2, 1)).is_err());
    }

    #[test]
    fn clamps_day_to_month_end() {
        assert_eq!(clamped_ymd(2024, 2, 31), Some(date(2024, 2, 29)));
        assert_eq!(clamped_ymd(2025, 2, 31), Some(date(2025, 2, 28)));
        assert_eq!(clamped_ymd(2025, 4, 31), Some(date(2025, 4, 30)));
        assert_eq!(clamped_ymd(2025, 4, 15), Some(date(2025, 4, 15)));
    }

    #[test]
    fn next_month_keeps_clamped_day() {
        let jan = date(2023, 1, 31);
        let feb = next_month(jan).unwrap();
        assert_eq!(feb, date(2023, 2, 28));
        let mar = next_month(feb).unwrap();
        assert_eq!(mar, date(2023, 3, 28));
    }

    #[test]
    fn window_contains_is_inclusive() {
        let window = ReportWindow::month(2025, 6).unwrap();
        assert!(window.contains(date(2025, 6, 1)));
        assert!(window.contains(date(2025, 6, 30)));
        assert!(!window.contains(date(2025, 7, 1)));
    }
}
