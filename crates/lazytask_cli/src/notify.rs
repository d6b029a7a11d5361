//! Reminder channels available to the terminal shell.

use lazytask_core::{ChannelError, EmailGateway, EmailMessage, NotificationChannel, Reminder};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Prints reminders to stdout with a terminal bell.
#[derive(Debug, Default)]
pub struct TerminalChannel;

impl NotificationChannel for TerminalChannel {
    fn channel_id(&self) -> &str {
        "terminal"
    }

    fn deliver(&self, reminder: &Reminder) -> Result<(), ChannelError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "\x07reminder: {}", reminder.summary())
            .and_then(|()| stdout.flush())
            .map_err(|err| ChannelError::Delivery(err.to_string()))
    }
}

/// Spools outbound emails as JSON files for an external sender.
///
/// File names are `<due>-<task id>.json`, so a re-run for the same due
/// minute overwrites instead of duplicating.
#[derive(Debug, Clone)]
pub struct OutboxGateway {
    dir: PathBuf,
}

impl OutboxGateway {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl EmailGateway for OutboxGateway {
    fn send(&self, message: &EmailMessage) -> Result<(), ChannelError> {
        fs::create_dir_all(&self.dir).map_err(|err| {
            ChannelError::Unavailable(format!("outbox `{}`: {err}", self.dir.display()))
        })?;
        let due = message
            .params
            .get("due_date")
            .map(|value| value.replace([' ', ':'], ""))
            .unwrap_or_default();
        let task_id = message
            .params
            .get("task_id")
            .cloned()
            .unwrap_or_else(|| "task".to_string());
        let path = self.dir.join(format!("{due}-{task_id}.json"));
        let body = serde_json::to_vec_pretty(message)
            .map_err(|err| ChannelError::Delivery(err.to_string()))?;
        fs::write(&path, body).map_err(|err| ChannelError::Delivery(err.to_string()))
    }
}
