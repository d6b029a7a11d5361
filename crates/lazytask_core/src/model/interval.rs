//! Date windows and derived occurrences.

use crate::model::task::TaskId;
use chrono::{NaiveDate, NaiveDateTime};

/// Closed `[start, end]` window of instants. Both ends are inclusive.
///
/// A window with `start > end` is valid and empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateInterval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Window covering whole calendar days `first..=last`.
    pub fn from_days(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start: first.and_time(chrono::NaiveTime::MIN),
            end: crate::calendar::grid::end_of_day(last),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Number of calendar days touched by the window; `0` when empty.
    pub fn day_count(&self) -> i64 {
        if self.is_empty() {
            return 0;
        }
        (self.end.date() - self.start.date()).num_days() + 1
    }

    /// Calendar days touched by the window, in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let first = self.start.date();
        let count = self.day_count();
        first.iter_days().take(usize::try_from(count).unwrap_or(0))
    }
}

/// One concrete instant produced by a task's recurrence rule.
///
/// Recomputed on every render; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occurrence {
    pub date: NaiveDateTime,
    pub task_id: TaskId,
}
