//! Month grid geometry.
//!
//! # Responsibility
//! - Compute the full-week window displayed for one calendar month.
//! - Provide week/day boundary helpers shared with recurrence expansion.
//!
//! # Invariants
//! - Weeks start on Sunday (`0`) and end on Saturday (`6`).
//! - A month grid always spans 28, 35 or 42 days.

use crate::model::interval::DateInterval;
use chrono::{Datelike, Days, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};

/// Sunday on or before `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(offset))
        .unwrap_or(NaiveDate::MIN)
}

/// Saturday on or after `date`.
pub fn end_of_week(date: NaiveDate) -> NaiveDate {
    let offset = 6 - u64::from(date.weekday().num_days_from_sunday());
    date.checked_add_days(Days::new(offset))
        .unwrap_or(NaiveDate::MAX)
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    start_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Last representable instant of `date` (`23:59:59.999`).
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN - Duration::milliseconds(1))
}

/// Closed window of whole weeks covering the month of `view_date`.
///
/// Leading days come from the previous month and trailing days from the
/// next one, so the window starts on a Sunday at midnight and ends on a
/// Saturday at `23:59:59.999`.
pub fn month_grid_range(view_date: NaiveDate) -> DateInterval {
    let first = start_of_week(start_of_month(view_date));
    let last = end_of_week(end_of_month(view_date));
    DateInterval::from_days(first, last)
}

/// Moves `view_date` by `delta` months, clamping the day to the target
/// month's length.
pub fn shift_month(view_date: NaiveDate, delta: i32) -> NaiveDate {
    let months = Months::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        view_date.checked_add_months(months)
    } else {
        view_date.checked_sub_months(months)
    };
    shifted.unwrap_or(view_date)
}

#[cfg(test)]
mod tests {
    use super::{end_of_month, month_grid_range, shift_month, start_of_week};
    use chrono::{Datelike, NaiveDate, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn leap_february_grid_spans_five_weeks() {
        let range = month_grid_range(date(2024, 2, 15));
        assert_eq!(range.start.date(), date(2024, 1, 28));
        assert_eq!(range.end.date(), date(2024, 3, 2));
        assert_eq!(range.day_count(), 35);
    }

    #[test]
    fn february_starting_on_sunday_spans_four_weeks() {
        let range = month_grid_range(date(2015, 2, 10));
        assert_eq!(range.start.date(), date(2015, 2, 1));
        assert_eq!(range.end.date(), date(2015, 2, 28));
        assert_eq!(range.day_count(), 28);
    }

    #[test]
    fn long_month_starting_on_saturday_spans_six_weeks() {
        // June 2024 starts on a Saturday and has 30 days.
        let range = month_grid_range(date(2024, 6, 1));
        assert_eq!(range.day_count(), 42);
    }

    #[test]
    fn every_grid_is_whole_weeks_from_sunday_to_saturday() {
        let mut view = date(2023, 1, 1);
        for _ in 0..36 {
            let range = month_grid_range(view);
            assert_eq!(range.day_count() % 7, 0, "month {view}");
            assert_eq!(range.start.date().weekday(), Weekday::Sun);
            assert_eq!(range.end.date().weekday(), Weekday::Sat);
            assert!(range.start.date() <= view.with_day(1).unwrap());
            assert!(range.end.date() >= end_of_month(view));
            view = shift_month(view, 1);
        }
    }

    #[test]
    fn start_of_week_is_identity_on_sunday() {
        assert_eq!(start_of_week(date(2024, 3, 3)), date(2024, 3, 3));
        assert_eq!(start_of_week(date(2024, 3, 9)), date(2024, 3, 3));
    }

    #[test]
    fn shift_month_clamps_day() {
        assert_eq!(shift_month(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(shift_month(date(2024, 3, 31), -1), date(2024, 2, 29));
        assert_eq!(shift_month(date(2024, 1, 15), -13), date(2022, 12, 15));
    }
}
