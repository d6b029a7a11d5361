//! Core domain logic for LazyTask.
//! This crate is the single source of truth for task, recurrence and
//! reminder invariants.

pub mod calendar;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod reminder;
pub mod repo;
pub mod service;

pub use calendar::expand::{expand_calendar, expand_occurrences};
pub use calendar::grid::{month_grid_range, shift_month};
pub use calendar::month_view::{CalendarEntry, DayCell, MonthView};
pub use config::{AppConfig, ConfigError, EmailConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::interval::{DateInterval, Occurrence};
pub use model::recurrence::{Recurrence, RecurrenceError};
pub use model::task::{Priority, Task, TaskId, TaskStatus, TaskValidationError};
pub use reminder::channel::{
    ChannelError, EmailChannel, EmailGateway, EmailMessage, LogChannel, NotificationChannel,
    Reminder,
};
pub use reminder::scheduler::{ReminderScheduler, TickReport};
pub use repo::task_store::{RepoError, RepoResult, SqliteTaskStore, TaskStore};
pub use service::task_service::{NewTask, TaskListQuery, TaskService, TaskUpdate};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
