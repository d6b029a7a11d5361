//! Reminder polling tick and channel registry.
//!
//! # Responsibility
//! - Register delivery channels under unique ids.
//! - On each tick, check the latest task snapshot and fan reminders out to
//!   every channel.
//! - Record `last_notified_at` so a due minute fires at most once.
//!
//! # Invariants
//! - One failing channel never blocks delivery on the others.
//! - A reminder is stamped as notified once attempted, even if all
//!   channels failed; the due minute is not retried.
//! - The tick does not own the cadence; the shell calls it every
//!   `poll_interval`.

use crate::model::task::TaskId;
use crate::reminder::channel::{is_valid_channel_id, NotificationChannel, Reminder};
use crate::reminder::policy::due_reminders;
use crate::repo::task_store::{RepoResult, TaskStore};
use crate::service::task_service::TaskService;
use chrono::NaiveDateTime;
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    InvalidChannelId(String),
    DuplicateChannelId(String),
}

impl Display for SchedulerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidChannelId(value) => write!(f, "channel id is invalid: {value}"),
            Self::DuplicateChannelId(value) => {
                write!(f, "channel id already registered: {value}")
            }
        }
    }
}

impl Error for SchedulerError {}

/// One channel failure inside a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub task_id: TaskId,
    pub channel_id: String,
    pub message: String,
}

/// Outcome of one polling tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tasks inspected in the snapshot.
    pub checked: usize,
    /// Reminders that fired this tick.
    pub fired: Vec<Reminder>,
    /// Successful channel deliveries.
    pub delivered: usize,
    pub failures: Vec<DeliveryFailure>,
}

/// Fans due reminders out to registered channels.
#[derive(Default)]
pub struct ReminderScheduler {
    channels: BTreeMap<String, Box<dyn NotificationChannel>>,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one delivery channel.
    pub fn register(
        &mut self,
        channel: Box<dyn NotificationChannel>,
    ) -> Result<(), SchedulerError> {
        let channel_id = channel.channel_id().trim().to_string();
        if !is_valid_channel_id(&channel_id) {
            return Err(SchedulerError::InvalidChannelId(channel_id));
        }
        if self.channels.contains_key(&channel_id) {
            return Err(SchedulerError::DuplicateChannelId(channel_id));
        }
        self.channels.insert(channel_id, channel);
        Ok(())
    }

    /// Sorted ids of registered channels.
    pub fn channel_ids(&self) -> Vec<String> {
        self.channels.keys().cloned().collect()
    }

    /// Runs one check against the latest task snapshot.
    pub fn tick<S: TaskStore>(
        &self,
        service: &TaskService<S>,
        now: NaiveDateTime,
    ) -> RepoResult<TickReport> {
        let tasks = service.snapshot()?;
        let fired = due_reminders(&tasks, now);
        let mut report = TickReport {
            checked: tasks.len(),
            ..TickReport::default()
        };

        for reminder in &fired {
            for (channel_id, channel) in &self.channels {
                match channel.deliver(reminder) {
                    Ok(()) => report.delivered += 1,
                    Err(err) => {
                        warn!(
                            "event=reminder_deliver module=reminder status=error channel={} task_id={} error={}",
                            channel_id, reminder.task_id, err
                        );
                        report.failures.push(DeliveryFailure {
                            task_id: reminder.task_id,
                            channel_id: channel_id.clone(),
                            message: err.to_string(),
                        });
                    }
                }
            }
        }

        let ids: Vec<TaskId> = fired.iter().map(|reminder| reminder.task_id).collect();
        service.mark_notified(&ids, now)?;

        if !fired.is_empty() {
            info!(
                "event=reminder_tick module=reminder status=ok fired={} delivered={} failed={}",
                fired.len(),
                report.delivered,
                report.failures.len()
            );
        }
        report.fired = fired;
        Ok(report)
    }
}
