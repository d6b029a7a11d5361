//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record read by list, calendar and reminder
//!   projections.
//! - Provide lifecycle helpers for `active | paused | completed`.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `title` is trimmed and never empty.
//! - `recurrence` passes `Recurrence::validate()`.
//! - Deserialization runs the same validation as construction.

use crate::model::recurrence::{Recurrence, RecurrenceError};
use chrono::{Local, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Task lifecycle state.
///
/// Only `Active` tasks are shown on the calendar and raise reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Active,
    Paused,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "paused" => Some(Self::Paused),
            "completed" | "done" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Task priority. Ordering is `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Task invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    NilId,
    EmptyTitle,
    Recurrence(RecurrenceError),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be nil"),
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::Recurrence(err) => write!(f, "invalid recurrence: {err}"),
        }
    }
}

impl Error for TaskValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Recurrence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecurrenceError> for TaskValidationError {
    fn from(value: RecurrenceError) -> Self {
        Self::Recurrence(value)
    }
}

/// Canonical task record.
///
/// `due_date` and the other timestamps are wall-clock values in the single
/// display timezone of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskWire")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub notes: Option<String>,
    /// Anchor occurrence for all recurrence math.
    pub due_date: NaiveDateTime,
    pub priority: Priority,
    pub category: Option<String>,
    pub recurrence: Recurrence,
    pub status: TaskStatus,
    /// Last instant a reminder fired for this task.
    pub last_notified_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

/// Deserialization mirror; converted through `validate()`.
#[derive(Deserialize)]
struct TaskWire {
    id: TaskId,
    title: String,
    #[serde(default)]
    notes: Option<String>,
    due_date: NaiveDateTime,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    recurrence: Recurrence,
    #[serde(default)]
    status: TaskStatus,
    #[serde(default)]
    last_notified_at: Option<NaiveDateTime>,
    created_at: Option<NaiveDateTime>,
}

impl TryFrom<TaskWire> for Task {
    type Error = TaskValidationError;

    fn try_from(value: TaskWire) -> Result<Self, Self::Error> {
        let task = Self {
            id: value.id,
            title: value.title,
            notes: value.notes,
            due_date: value.due_date,
            priority: value.priority,
            category: value.category,
            recurrence: value.recurrence,
            status: value.status,
            last_notified_at: value.last_notified_at,
            created_at: value.created_at.unwrap_or(value.due_date),
        };
        task.validate()?;
        Ok(task)
    }
}

impl Task {
    /// Creates an active, non-repeating task with a generated stable ID.
    pub fn new(title: impl Into<String>, due_date: NaiveDateTime) -> Self {
        Self::build(Uuid::new_v4(), title.into(), due_date)
    }

    /// Creates a task with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists.
    pub fn with_id(
        id: TaskId,
        title: impl Into<String>,
        due_date: NaiveDateTime,
    ) -> Result<Self, TaskValidationError> {
        let task = Self::build(id, title.into(), due_date);
        task.validate()?;
        Ok(task)
    }

    fn build(id: TaskId, title: String, due_date: NaiveDateTime) -> Self {
        Self {
            id,
            title: title.trim().to_string(),
            notes: None,
            due_date,
            priority: Priority::default(),
            category: None,
            recurrence: Recurrence::None,
            status: TaskStatus::Active,
            last_notified_at: None,
            created_at: Local::now().naive_local(),
        }
    }

    /// Validates task invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        self.recurrence.validate()?;
        Ok(())
    }

    pub fn complete(&mut self) {
        self.status = TaskStatus::Completed;
    }

    pub fn pause(&mut self) {
        self.status = TaskStatus::Paused;
    }

    /// Moves a paused task back to active. Completed tasks are unchanged.
    pub fn resume(&mut self) {
        if self.status == TaskStatus::Paused {
            self.status = TaskStatus::Active;
        }
    }

    /// Reopens a completed task.
    pub fn reopen(&mut self) {
        if self.status == TaskStatus::Completed {
            self.status = TaskStatus::Active;
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TaskStatus::Active
    }

    /// Returns whether the calendar should expand this task.
    pub fn participates_in_calendar(&self) -> bool {
        self.is_active()
    }
}

/// Normalizes a free-form category label.
///
/// Whitespace runs collapse to one space and the result is lowercased.
/// Blank input yields `None`.
pub fn normalize_category(value: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(value.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.to_lowercase())
    }
}
