//! Application configuration.
//!
//! # Responsibility
//! - Load `config.yaml` and fill unset fields with platform defaults.
//! - Enforce value bounds before the shell uses them.
//!
//! # Invariants
//! - A missing config file is not an error; defaults apply.
//! - `poll_interval_secs >= 1` and `max_entries_per_day >= 1` after
//!   `validate()`.

use crate::calendar::month_view::DEFAULT_MAX_ENTRIES_PER_DAY;
use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR_NAME: &str = "lazytask";
const DEFAULT_DB_FILE: &str = "lazytask.sqlite3";
const CONFIG_FILE_NAME: &str = "config.yaml";
/// Reminder polling cadence when not configured.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_yaml::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Settings for the hosted email API used by email reminders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailConfig {
    pub recipient: String,
    pub service_id: String,
    pub template_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root directory for the database and logs.
    pub data_dir: PathBuf,
    /// Database file name, relative to `data_dir` unless absolute.
    pub db_file: PathBuf,
    pub log_level: String,
    /// Absolute log directory; defaults to `<data_dir>/logs`.
    pub log_dir: Option<PathBuf>,
    pub poll_interval_secs: u64,
    pub max_entries_per_day: usize,
    pub email: Option<EmailConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            db_file: PathBuf::from(DEFAULT_DB_FILE),
            log_level: default_log_level().to_string(),
            log_dir: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            max_entries_per_day: DEFAULT_MAX_ENTRIES_PER_DAY,
            email: None,
        }
    }
}

impl AppConfig {
    /// Loads config from `path`, or defaults when the file does not exist.
    ///
    /// # Errors
    /// - Returns `Io` when the file exists but cannot be read.
    /// - Returns `Parse` when YAML is malformed.
    /// - Returns `Invalid` when values are out of bounds.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_yaml(&content).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parses and validates YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                path: PathBuf::new(),
                source,
            })?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_secs must be >= 1".to_string(),
            ));
        }
        if self.max_entries_per_day == 0 {
            return Err(ConfigError::Invalid(
                "max_entries_per_day must be >= 1".to_string(),
            ));
        }
        if let Some(log_dir) = &self.log_dir {
            if !log_dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be absolute, got `{}`",
                    log_dir.display()
                )));
            }
        }
        if let Some(email) = &self.email {
            if email.recipient.trim().is_empty() || !email.recipient.contains('@') {
                return Err(ConfigError::Invalid(format!(
                    "email.recipient `{}` is not an address",
                    email.recipient
                )));
            }
        }
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("logs"))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Default config file location (`<config_dir>/lazytask/config.yaml`).
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
