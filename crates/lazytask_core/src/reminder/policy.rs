//! When a task's reminder is due.
//!
//! Reminders look only at a task's literal `due_date`. A recurring task
//! therefore reminds once, on its anchor date, and never on later expanded
//! occurrences.

use crate::model::task::Task;
use crate::reminder::channel::Reminder;
use chrono::{NaiveDateTime, Timelike};

/// Truncates an instant to its minute.
pub fn minute_of(instant: NaiveDateTime) -> NaiveDateTime {
    instant
        .with_second(0)
        .and_then(|value| value.with_nanosecond(0))
        .unwrap_or(instant)
}

/// Returns whether `task` should raise a reminder at `now`.
///
/// True when the task is active, `now` falls in the due minute, and no
/// reminder was recorded for that minute yet.
pub fn should_notify(task: &Task, now: NaiveDateTime) -> bool {
    if !task.is_active() {
        return false;
    }
    let due_minute = minute_of(task.due_date);
    if minute_of(now) != due_minute {
        return false;
    }
    task.last_notified_at.map(minute_of) != Some(due_minute)
}

/// Reminders due at `now`, in snapshot order.
pub fn due_reminders(tasks: &[Task], now: NaiveDateTime) -> Vec<Reminder> {
    tasks
        .iter()
        .filter(|task| should_notify(task, now))
        .map(|task| Reminder {
            task_id: task.id,
            title: task.title.clone(),
            due_date: task.due_date,
            category: task.category.clone(),
            priority: task.priority,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{minute_of, should_notify};
    use crate::model::recurrence::Recurrence;
    use crate::model::task::Task;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn fires_anywhere_inside_the_due_minute() {
        let task = Task::new("standup", at(9, 15, 0));
        assert!(!should_notify(&task, at(9, 14, 59)));
        assert!(should_notify(&task, at(9, 15, 0)));
        assert!(should_notify(&task, at(9, 15, 45)));
        assert!(!should_notify(&task, at(9, 16, 0)));
    }

    #[test]
    fn already_notified_minute_is_skipped() {
        let mut task = Task::new("standup", at(9, 15, 0));
        task.last_notified_at = Some(at(9, 15, 12));
        assert!(!should_notify(&task, at(9, 15, 30)));

        task.last_notified_at = Some(at(9, 15, 12) - Duration::days(1));
        assert!(should_notify(&task, at(9, 15, 30)));
    }

    #[test]
    fn inactive_tasks_never_fire() {
        let mut task = Task::new("standup", at(9, 15, 0));
        task.pause();
        assert!(!should_notify(&task, at(9, 15, 0)));
        task.resume();
        task.complete();
        assert!(!should_notify(&task, at(9, 15, 0)));
    }

    #[test]
    fn recurring_task_only_reminds_on_its_anchor() {
        let mut task = Task::new("stretch", at(7, 0, 0));
        task.recurrence = Recurrence::Daily { interval: 1 };
        assert!(should_notify(&task, at(7, 0, 0)));
        assert!(!should_notify(&task, at(7, 0, 0) + Duration::days(1)));
    }

    #[test]
    fn minute_of_drops_seconds_and_fraction() {
        let precise = at(9, 15, 42) + Duration::milliseconds(250);
        assert_eq!(minute_of(precise), at(9, 15, 0));
    }
}
