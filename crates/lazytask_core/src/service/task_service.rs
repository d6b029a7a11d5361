//! Task use-case service.
//!
//! # Responsibility
//! - Provide create/edit/status/delete/list entry points for shell callers.
//! - Act as the data-origin boundary where recurrence rules are clamped.
//! - Feed immutable snapshots to the calendar projection.
//!
//! # Invariants
//! - Every write normalizes recurrence and category, then validates.
//! - Service APIs never bypass store validation/persistence contracts.
//! - The service holds no task state of its own; the store is the source of
//!   truth and every call works on a fresh snapshot.
//! - Every write is one `TaskStore::update_tasks` call, so a concurrent
//!   writer in another process is never overwritten.

use crate::calendar::month_view::MonthView;
use crate::model::recurrence::Recurrence;
use crate::model::task::{normalize_category, Priority, Task, TaskId, TaskStatus};
use crate::repo::task_store::{RepoError, RepoResult, TaskStore};
use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use std::collections::BTreeSet;

/// Request model for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub due_date: NaiveDateTime,
    pub notes: Option<String>,
    pub priority: Priority,
    pub category: Option<String>,
    pub recurrence: Recurrence,
}

impl NewTask {
    pub fn new(title: impl Into<String>, due_date: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            due_date,
            notes: None,
            priority: Priority::default(),
            category: None,
            recurrence: Recurrence::None,
        }
    }
}

/// Partial edit. `None` leaves a field unchanged; for optional fields
/// `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub notes: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub category: Option<Option<String>>,
    pub recurrence: Option<Recurrence>,
}

/// Filter options for the flat task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub limit: Option<u32>,
}

/// Task service facade over a store implementation.
pub struct TaskService<S: TaskStore> {
    store: S,
}

impl<S: TaskStore> TaskService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the current task list as an immutable snapshot.
    pub fn snapshot(&self) -> RepoResult<Vec<Task>> {
        self.store.load_tasks()
    }

    /// Creates one active task and returns it as stored.
    pub fn create_task(&self, request: NewTask) -> RepoResult<Task> {
        let mut task = Task::new(request.title, request.due_date);
        task.notes = clean_notes(request.notes);
        task.priority = request.priority;
        task.category = request.category.as_deref().and_then(normalize_category);
        task.recurrence = request.recurrence.normalized();
        task.validate()?;

        self.store.update_tasks(|tasks| {
            tasks.push(task.clone());
            Ok(())
        })?;

        info!(
            "event=task_create module=service status=ok task_id={} recurrence={}",
            task.id,
            recurrence_kind(&task.recurrence)
        );
        Ok(task)
    }

    pub fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        Ok(self.store.load_tasks()?.into_iter().find(|task| task.id == id))
    }

    /// Applies a partial edit and returns the updated task.
    pub fn update_task(&self, id: TaskId, update: TaskUpdate) -> RepoResult<Task> {
        self.mutate(id, "task_update", |task| {
            if let Some(title) = update.title {
                task.title = title.trim().to_string();
            }
            if let Some(due_date) = update.due_date {
                task.due_date = due_date;
            }
            if let Some(notes) = update.notes {
                task.notes = clean_notes(notes);
            }
            if let Some(priority) = update.priority {
                task.priority = priority;
            }
            if let Some(category) = update.category {
                task.category = category.as_deref().and_then(normalize_category);
            }
            if let Some(recurrence) = update.recurrence {
                task.recurrence = recurrence.normalized();
            }
        })
    }

    pub fn set_status(&self, id: TaskId, status: TaskStatus) -> RepoResult<Task> {
        self.mutate(id, "task_status", |task| task.status = status)
    }

    pub fn pause_task(&self, id: TaskId) -> RepoResult<Task> {
        self.mutate(id, "task_pause", Task::pause)
    }

    /// Moves a paused task back to active; other statuses are left as is.
    pub fn resume_task(&self, id: TaskId) -> RepoResult<Task> {
        self.mutate(id, "task_resume", Task::resume)
    }

    /// Completes an open task, or reopens a completed one.
    pub fn toggle_complete(&self, id: TaskId) -> RepoResult<Task> {
        self.mutate(id, "task_toggle", |task| {
            if task.status == TaskStatus::Completed {
                task.reopen();
            } else {
                task.complete();
            }
        })
    }

    pub fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        self.store.update_tasks(|tasks| {
            let before = tasks.len();
            tasks.retain(|task| task.id != id);
            if tasks.len() == before {
                return Err(RepoError::NotFound(id));
            }
            Ok(())
        })?;
        info!("event=task_delete module=service status=ok task_id={id}");
        Ok(())
    }

    /// Flat list sorted by due date, then priority (high first), then id.
    pub fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let category = query.category.as_deref().and_then(normalize_category);
        let mut tasks: Vec<Task> = self
            .store
            .load_tasks()?
            .into_iter()
            .filter(|task| query.status.map_or(true, |status| task.status == status))
            .filter(|task| query.priority.map_or(true, |priority| task.priority == priority))
            .filter(|task| category.is_none() || task.category == category)
            .collect();

        tasks.sort_by(|a, b| {
            a.due_date
                .cmp(&b.due_date)
                .then(b.priority.cmp(&a.priority))
                .then(a.id.cmp(&b.id))
        });
        if let Some(limit) = query.limit {
            tasks.truncate(limit as usize);
        }
        Ok(tasks)
    }

    /// Distinct categories in use, sorted.
    pub fn categories(&self) -> RepoResult<Vec<String>> {
        Ok(self
            .store
            .load_tasks()?
            .into_iter()
            .filter_map(|task| task.category)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect())
    }

    /// Calendar projection for the month containing `view_date`.
    pub fn month_view(
        &self,
        view_date: NaiveDate,
        today: Option<NaiveDate>,
        max_entries_per_day: usize,
    ) -> RepoResult<MonthView> {
        let tasks = self.store.load_tasks()?;
        Ok(MonthView::build(
            &tasks,
            view_date,
            today,
            max_entries_per_day,
        ))
    }

    /// Stamps `last_notified_at = at` on the given tasks in one write.
    ///
    /// Unknown ids are skipped. Returns how many tasks were stamped.
    pub fn mark_notified(&self, ids: &[TaskId], at: NaiveDateTime) -> RepoResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.store.update_tasks(|tasks| {
            let mut stamped = 0;
            for task in tasks.iter_mut().filter(|task| ids.contains(&task.id)) {
                task.last_notified_at = Some(at);
                stamped += 1;
            }
            Ok(stamped)
        })
    }

    fn mutate(
        &self,
        id: TaskId,
        event: &'static str,
        apply: impl FnOnce(&mut Task),
    ) -> RepoResult<Task> {
        let updated = self.store.update_tasks(|tasks| {
            let task = tasks
                .iter_mut()
                .find(|task| task.id == id)
                .ok_or(RepoError::NotFound(id))?;
            apply(task);
            task.validate()?;
            Ok(task.clone())
        })?;
        info!(
            "event={event} module=service status=ok task_id={id} task_status={}",
            updated.status.as_str()
        );
        Ok(updated)
    }
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn recurrence_kind(recurrence: &Recurrence) -> &'static str {
    match recurrence {
        Recurrence::None => "none",
        Recurrence::Daily { .. } => "daily",
        Recurrence::Weekly { .. } => "weekly",
        Recurrence::Monthly { .. } => "monthly",
    }
}
