//! Month calendar projection.
//!
//! # Responsibility
//! - Group expanded occurrences by calendar day for one month grid.
//! - Cap visible entries per day and report how many were hidden.
//!
//! # Invariants
//! - `days` covers the grid returned by `month_grid_range` in order.
//! - Within a day, entries are sorted by time, then priority (high first),
//!   then title.
//! - `entries.len() + overflow` equals the day's total occurrences.

use crate::calendar::expand::expand_calendar;
use crate::calendar::grid::{month_grid_range, start_of_month};
use crate::model::interval::DateInterval;
use crate::model::task::{Priority, Task, TaskId};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};

/// Default cap on entries shown inside one day cell.
pub const DEFAULT_MAX_ENTRIES_PER_DAY: usize = 3;

/// One occurrence as shown inside a day cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEntry {
    pub date: NaiveDateTime,
    pub task_id: TaskId,
    pub title: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    /// `false` for spillover days from the adjacent months.
    pub in_month: bool,
    pub is_today: bool,
    pub entries: Vec<CalendarEntry>,
    /// Number of occurrences hidden by the per-day cap.
    pub overflow: usize,
}

impl DayCell {
    pub fn total(&self) -> usize {
        self.entries.len() + self.overflow
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthView {
    /// First day of the displayed month.
    pub month: NaiveDate,
    pub range: DateInterval,
    pub days: Vec<DayCell>,
}

impl MonthView {
    /// Builds the month grid for `view_date` from a task snapshot.
    ///
    /// Only tasks with `participates_in_calendar()` are expanded.
    /// `max_entries_per_day` below 1 is treated as 1.
    pub fn build(
        tasks: &[Task],
        view_date: NaiveDate,
        today: Option<NaiveDate>,
        max_entries_per_day: usize,
    ) -> Self {
        let month = start_of_month(view_date);
        let range = month_grid_range(view_date);
        let cap = max_entries_per_day.max(1);
        let by_id: HashMap<TaskId, &Task> = tasks.iter().map(|task| (task.id, task)).collect();

        let mut grouped: BTreeMap<NaiveDate, Vec<CalendarEntry>> = BTreeMap::new();
        for occurrence in expand_calendar(tasks, range) {
            let Some(task) = by_id.get(&occurrence.task_id) else {
                continue;
            };
            grouped
                .entry(occurrence.date.date())
                .or_default()
                .push(CalendarEntry {
                    date: occurrence.date,
                    task_id: task.id,
                    title: task.title.clone(),
                    priority: task.priority,
                });
        }

        let days = range
            .days()
            .map(|date| {
                let mut entries = grouped.remove(&date).unwrap_or_default();
                entries.sort_by(|a, b| {
                    a.date
                        .cmp(&b.date)
                        .then(b.priority.cmp(&a.priority))
                        .then(a.title.cmp(&b.title))
                });
                let overflow = entries.len().saturating_sub(cap);
                entries.truncate(cap);
                DayCell {
                    date,
                    in_month: date.year() == month.year() && date.month() == month.month(),
                    is_today: today == Some(date),
                    entries,
                    overflow,
                }
            })
            .collect();

        Self { month, range, days }
    }

    /// Day cells chunked into Sunday-first weeks.
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.days.chunks(7)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayCell> {
        self.days.iter().find(|cell| cell.date == date)
    }
}
