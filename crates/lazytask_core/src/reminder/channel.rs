//! Reminder delivery channels.
//!
//! # Responsibility
//! - Define the delivery contract for desktop notifications and email.
//! - Keep the hosted email API behind an injectable gateway.
//!
//! # Invariants
//! - Channel ids are lowercase ASCII (`a-z`, `0-9`, `_`, `-`).
//! - Channels never log task titles; only ids and metadata.

use crate::config::EmailConfig;
use crate::model::task::{Priority, TaskId};
use chrono::NaiveDateTime;
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reminder payload handed to every channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub task_id: TaskId,
    pub title: String,
    pub due_date: NaiveDateTime,
    pub category: Option<String>,
    pub priority: Priority,
}

impl Reminder {
    /// One-line body shared by channels.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} is due at {}",
            self.title,
            self.due_date.format("%Y-%m-%d %H:%M")
        );
        if let Some(category) = &self.category {
            line.push_str(&format!(" [{category}]"));
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Channel cannot deliver right now (permission denied, not configured).
    Unavailable(String),
    /// Delivery was attempted and failed.
    Delivery(String),
}

impl Display for ChannelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "channel unavailable: {message}"),
            Self::Delivery(message) => write!(f, "delivery failed: {message}"),
        }
    }
}

impl Error for ChannelError {}

/// One way of surfacing a reminder to the user.
pub trait NotificationChannel {
    fn channel_id(&self) -> &str;
    fn deliver(&self, reminder: &Reminder) -> Result<(), ChannelError>;
}

/// Desktop-notification stand-in that records reminders in the core log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogChannel;

impl NotificationChannel for LogChannel {
    fn channel_id(&self) -> &str {
        "log"
    }

    fn deliver(&self, reminder: &Reminder) -> Result<(), ChannelError> {
        info!(
            "event=reminder_fired module=reminder status=ok channel=log task_id={} due={}",
            reminder.task_id,
            reminder.due_date.format("%Y-%m-%dT%H:%M")
        );
        Ok(())
    }
}

/// Outbound message for a hosted email-sending API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub service_id: String,
    pub template_id: String,
    pub to: String,
    pub subject: String,
    /// Template parameters, keyed by template variable name.
    pub params: BTreeMap<String, String>,
}

/// Transport to a hosted email API. Implemented outside core.
pub trait EmailGateway {
    fn send(&self, message: &EmailMessage) -> Result<(), ChannelError>;
}

/// Adapts an [`EmailGateway`] to the channel contract.
pub struct EmailChannel<G: EmailGateway> {
    gateway: G,
    config: EmailConfig,
}

impl<G: EmailGateway> EmailChannel<G> {
    pub fn new(gateway: G, config: EmailConfig) -> Self {
        Self { gateway, config }
    }

    /// Builds the outbound message for one reminder.
    pub fn compose(&self, reminder: &Reminder) -> EmailMessage {
        let mut params = BTreeMap::new();
        params.insert("task_id".to_string(), reminder.task_id.to_string());
        params.insert("task_title".to_string(), reminder.title.clone());
        params.insert(
            "due_date".to_string(),
            reminder.due_date.format("%Y-%m-%d %H:%M").to_string(),
        );
        params.insert(
            "priority".to_string(),
            reminder.priority.as_str().to_string(),
        );
        if let Some(category) = &reminder.category {
            params.insert("category".to_string(), category.clone());
        }
        params.insert("message".to_string(), reminder.summary());

        EmailMessage {
            service_id: self.config.service_id.clone(),
            template_id: self.config.template_id.clone(),
            to: self.config.recipient.clone(),
            subject: format!("Reminder: {}", reminder.title),
            params,
        }
    }
}

impl<G: EmailGateway> NotificationChannel for EmailChannel<G> {
    fn channel_id(&self) -> &str {
        "email"
    }

    fn deliver(&self, reminder: &Reminder) -> Result<(), ChannelError> {
        if self.config.recipient.trim().is_empty() {
            return Err(ChannelError::Unavailable(
                "no email recipient configured".to_string(),
            ));
        }
        self.gateway.send(&self.compose(reminder))
    }
}

pub(crate) fn is_valid_channel_id(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
