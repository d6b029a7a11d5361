//! Recurrence expansion over a closed date window.
//!
//! # Responsibility
//! - Turn one task's anchor date and recurrence rule into the concrete
//!   occurrences that intersect a window.
//!
//! # Invariants
//! - Pure: same task and window always yield the same sequence.
//! - Output for one task is non-decreasing by date.
//! - Window bounds are inclusive; `start > end` yields nothing.
//! - Occurrences inherit the anchor's time-of-day.
//! - Expansion is status-agnostic; callers filter paused/completed tasks.

use crate::calendar::grid::start_of_week;
use crate::model::interval::{DateInterval, Occurrence};
use crate::model::recurrence::{Recurrence, MAX_MONTH_DAY, MIN_MONTH_DAY};
use crate::model::task::Task;
use chrono::{Datelike, Days, Duration, NaiveDate, NaiveDateTime};
use log::warn;
use std::collections::BTreeSet;

const SECONDS_PER_DAY: i64 = 86_400;

/// Expands `task` into every occurrence inside `window`.
///
/// A malformed rule is a precondition failure: debug builds panic, release
/// builds log a warning and return no occurrences.
pub fn expand_occurrences(task: &Task, window: DateInterval) -> Vec<Occurrence> {
    expand_dates(task.due_date, &task.recurrence, window)
        .into_iter()
        .map(|date| Occurrence {
            date,
            task_id: task.id,
        })
        .collect()
}

/// Expands every calendar-visible task and sorts the merged result by date.
///
/// Ties keep a stable order by task id.
pub fn expand_calendar(tasks: &[Task], window: DateInterval) -> Vec<Occurrence> {
    let mut occurrences: Vec<Occurrence> = tasks
        .iter()
        .filter(|task| task.participates_in_calendar())
        .flat_map(|task| expand_occurrences(task, window))
        .collect();
    occurrences.sort_by(|a, b| a.date.cmp(&b.date).then(a.task_id.cmp(&b.task_id)));
    occurrences
}

/// Expands a bare anchor/rule pair into occurrence instants.
pub fn expand_dates(
    anchor: NaiveDateTime,
    recurrence: &Recurrence,
    window: DateInterval,
) -> Vec<NaiveDateTime> {
    if let Err(err) = recurrence.validate() {
        if cfg!(debug_assertions) {
            panic!("malformed recurrence rule reached expansion: {err}");
        }
        warn!(
            "event=recurrence_expand module=calendar status=skipped reason=malformed_rule error={}",
            err
        );
        return Vec::new();
    }
    if window.is_empty() {
        return Vec::new();
    }

    match recurrence {
        Recurrence::None => {
            if window.contains(anchor) {
                vec![anchor]
            } else {
                Vec::new()
            }
        }
        Recurrence::Daily { interval } => expand_daily(anchor, *interval, window),
        Recurrence::Weekly { interval, weekdays } => {
            expand_weekly(anchor, *interval, weekdays, window)
        }
        Recurrence::Monthly { interval, day } => expand_monthly(anchor, *interval, *day, window),
    }
}

fn expand_daily(anchor: NaiveDateTime, interval: u32, window: DateInterval) -> Vec<NaiveDateTime> {
    let step_days = i64::from(interval);
    let step = Duration::days(step_days);
    let mut cursor = anchor;

    if cursor < window.start {
        let gap_seconds = (window.start - cursor).num_seconds();
        let skipped = gap_seconds / (step_days * SECONDS_PER_DAY);
        cursor = match cursor.checked_add_signed(Duration::days(skipped * step_days)) {
            Some(value) => value,
            None => return Vec::new(),
        };
        while cursor < window.start {
            cursor = match cursor.checked_add_signed(step) {
                Some(value) => value,
                None => return Vec::new(),
            };
        }
    }

    let mut out = Vec::new();
    while cursor <= window.end {
        out.push(cursor);
        cursor = match cursor.checked_add_signed(step) {
            Some(value) => value,
            None => break,
        };
    }
    out
}

fn expand_weekly(
    anchor: NaiveDateTime,
    interval: u32,
    weekdays: &[u8],
    window: DateInterval,
) -> Vec<NaiveDateTime> {
    let days: BTreeSet<u8> = weekdays.iter().copied().collect();
    if days.is_empty() {
        return Vec::new();
    }

    let step_weeks = i64::from(interval);
    let time = anchor.time();
    let anchor_week = start_of_week(anchor.date());
    let first_week = start_of_week(anchor.max(window.start).date());

    // Week cursors stay on the anchor's cadence: only weeks that are a
    // multiple of `interval` away from the anchor week produce occurrences.
    let weeks_between = (first_week - anchor_week).num_days() / 7;
    let skipped = ceil_div(weeks_between, step_weeks) * step_weeks;
    let mut week = match anchor_week.checked_add_signed(Duration::weeks(skipped)) {
        Some(value) => value,
        None => return Vec::new(),
    };

    let mut out = Vec::new();
    while week <= window.end.date() {
        for day in &days {
            let Some(date) = week.checked_add_days(Days::new(u64::from(*day))) else {
                continue;
            };
            let instant = date.and_time(time);
            if window.contains(instant) {
                out.push(instant);
            }
        }
        week = match week.checked_add_signed(Duration::weeks(step_weeks)) {
            Some(value) => value,
            None => break,
        };
    }
    out
}

fn expand_monthly(
    anchor: NaiveDateTime,
    interval: u32,
    day: u8,
    window: DateInterval,
) -> Vec<NaiveDateTime> {
    let step = i64::from(interval);
    let day = u32::from(day.clamp(MIN_MONTH_DAY, MAX_MONTH_DAY));
    let time = anchor.time();

    let anchor_month = month_index(anchor.date());
    let start_month = month_index(window.start.date());
    let end_month = month_index(window.end.date());

    let mut cursor = anchor_month;
    if cursor < start_month {
        cursor += ceil_div(start_month - anchor_month, step) * step;
    }

    let mut out = Vec::new();
    while cursor <= end_month {
        let Ok(year) = i32::try_from(cursor.div_euclid(12)) else {
            break;
        };
        let Ok(month) = u32::try_from(cursor.rem_euclid(12) + 1) else {
            break;
        };
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            let instant = date.and_time(time);
            if window.contains(instant) {
                out.push(instant);
            }
        }
        cursor += step;
    }
    out
}

/// Months since year 0, so month arithmetic is plain integer math.
fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Ceiling division for `value >= 0`, `divisor >= 1`. Negative values map to 0.
fn ceil_div(value: i64, divisor: i64) -> i64 {
    if value <= 0 {
        return 0;
    }
    (value + divisor - 1) / divisor
}
