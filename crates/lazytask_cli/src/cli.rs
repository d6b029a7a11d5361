//! Command-line surface for the `lazytask` binary.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use lazytask_core::{Priority, Recurrence, TaskStatus};
use std::path::PathBuf;

/// Due time used when `--due` carries only a date.
const DEFAULT_DUE_TIME: (u32, u32) = (9, 0);

/// Single-user task tracker with recurring tasks and a month calendar
#[derive(Parser, Debug)]
#[command(name = "lazytask", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// Log level (overrides config): trace, debug, info, warn, error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a task
    Add(AddArgs),
    /// Edit fields of an existing task
    Edit(EditArgs),
    /// List tasks, soonest first
    List(ListArgs),
    /// Toggle a task between active and completed
    Done(IdArg),
    /// Pause reminders and calendar entries for a task
    Pause(IdArg),
    /// Resume a paused task
    Resume(IdArg),
    /// Delete a task
    Rm(IdArg),
    /// Print the month grid with expanded occurrences
    Month(MonthArgs),
    /// List known categories
    Categories,
    /// Poll for due reminders until interrupted
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
pub struct IdArg {
    /// Task id or a unique prefix of it
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RepeatKind {
    None,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(value: PriorityArg) -> Self {
        match value {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Active,
    Paused,
    Completed,
}

impl From<StatusArg> for TaskStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Active => TaskStatus::Active,
            StatusArg::Paused => TaskStatus::Paused,
            StatusArg::Completed => TaskStatus::Completed,
        }
    }
}

/// Recurrence flags shared by `add` and `edit`.
#[derive(Args, Debug, Default)]
pub struct RepeatArgs {
    /// Recurrence kind
    #[arg(long, value_enum)]
    pub repeat: Option<RepeatKind>,

    /// Repeat every N days, weeks or months (default 1)
    #[arg(long, requires = "repeat")]
    pub every: Option<u32>,

    /// Weekdays for weekly tasks, e.g. `mon,wed` or `1,3` (0 = Sunday)
    #[arg(long, requires = "repeat", value_delimiter = ',', value_parser = parse_weekday)]
    pub on: Vec<u8>,

    /// Day of month for monthly tasks (1-28, defaults to the due date's day)
    #[arg(long, requires = "repeat")]
    pub day: Option<u8>,
}

impl RepeatArgs {
    /// Builds the recurrence rule, or `None` when `--repeat` was not given.
    ///
    /// `anchor` supplies the default weekday and month day.
    pub fn to_recurrence(&self, anchor: NaiveDateTime) -> Option<Recurrence> {
        let kind = self.repeat?;
        let interval = self.every.unwrap_or(1);
        let recurrence = match kind {
            RepeatKind::None => Recurrence::None,
            RepeatKind::Daily => Recurrence::Daily { interval },
            RepeatKind::Weekly => {
                let weekdays = if self.on.is_empty() {
                    vec![anchor.weekday().num_days_from_sunday() as u8]
                } else {
                    self.on.clone()
                };
                Recurrence::Weekly { interval, weekdays }
            }
            RepeatKind::Monthly => match self.day {
                Some(day) => Recurrence::Monthly { interval, day },
                None => Recurrence::monthly_from_anchor(interval, anchor),
            },
        };
        Some(recurrence)
    }
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task title
    pub title: String,

    /// Due date: `YYYY-MM-DDTHH:MM`, `YYYY-MM-DD HH:MM` or `YYYY-MM-DD`
    #[arg(long, value_parser = parse_due)]
    pub due: NaiveDateTime,

    #[arg(long, value_enum, default_value = "medium")]
    pub priority: PriorityArg,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    #[command(flatten)]
    pub repeat: RepeatArgs,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Task id or a unique prefix of it
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, value_parser = parse_due)]
    pub due: Option<NaiveDateTime>,

    #[arg(long, value_enum)]
    pub priority: Option<PriorityArg>,

    /// New category; an empty value clears it
    #[arg(long)]
    pub category: Option<String>,

    /// New notes; an empty value clears them
    #[arg(long)]
    pub notes: Option<String>,

    #[command(flatten)]
    pub repeat: RepeatArgs,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, value_enum)]
    pub priority: Option<PriorityArg>,

    /// Maximum number of tasks to print
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Args, Debug, Default)]
pub struct MonthArgs {
    /// Any date inside the month to show (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Months to move from `--date`, e.g. `-1` for the previous month
    #[arg(long, allow_hyphen_values = true, default_value_t = 0)]
    pub offset: i32,

    /// Entries shown per day before collapsing into `+N` (overrides config)
    #[arg(long)]
    pub max_per_day: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct WatchArgs {
    /// Run a single check and exit
    #[arg(long)]
    pub once: bool,
}

pub fn parse_due(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }
    let date = parse_date(value)?;
    let (hour, minute) = DEFAULT_DUE_TIME;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| "invalid default due time".to_string())?;
    Ok(date.and_time(time))
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM-DD, got `{value}`"))
}

/// Accepts `0`-`6` (Sunday first) or English day names and abbreviations.
pub fn parse_weekday(value: &str) -> Result<u8, String> {
    let value = value.trim().to_ascii_lowercase();
    if let Ok(day) = value.parse::<u8>() {
        return if day <= 6 {
            Ok(day)
        } else {
            Err(format!("weekday {day} is out of range 0..=6"))
        };
    }
    const NAMES: [&str; 7] = [
        "sunday",
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
    ];
    NAMES
        .iter()
        .position(|name| value.len() >= 3 && name.starts_with(value.as_str()))
        .map(|index| index as u8)
        .ok_or_else(|| format!("unknown weekday `{value}`"))
}

#[cfg(test)]
mod tests {
    use super::{parse_due, parse_weekday, Cli, Command, RepeatKind};
    use chrono::NaiveDate;
    use clap::error::ErrorKind;
    use clap::Parser;
    use lazytask_core::Recurrence;

    fn at(d: u32, h: u32, m: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn due_accepts_minute_and_date_only_forms() {
        assert_eq!(parse_due("2024-03-05T07:45").unwrap(), at(5, 7, 45));
        assert_eq!(parse_due("2024-03-05 07:45").unwrap(), at(5, 7, 45));
        assert_eq!(parse_due("2024-03-05").unwrap(), at(5, 9, 0));
        assert!(parse_due("05/03/2024").is_err());
    }

    #[test]
    fn weekday_accepts_numbers_and_names() {
        assert_eq!(parse_weekday("0").unwrap(), 0);
        assert_eq!(parse_weekday("Wed").unwrap(), 3);
        assert_eq!(parse_weekday("saturday").unwrap(), 6);
        assert!(parse_weekday("7").is_err());
        assert!(parse_weekday("mo").is_err());
    }

    #[test]
    fn add_parses_weekly_rule() {
        let cli = Cli::parse_from([
            "lazytask", "add", "standup", "--due", "2024-03-04T09:30", "--repeat", "weekly",
            "--every", "2", "--on", "mon,wed",
        ]);
        let Command::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.repeat.repeat, Some(RepeatKind::Weekly));
        assert_eq!(
            args.repeat.to_recurrence(args.due),
            Some(Recurrence::Weekly {
                interval: 2,
                weekdays: vec![1, 3]
            })
        );
    }

    #[test]
    fn repeat_defaults_come_from_anchor() {
        let cli = Cli::parse_from([
            "lazytask", "add", "rent", "--due", "2024-03-27", "--repeat", "monthly",
        ]);
        let Command::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(
            args.repeat.to_recurrence(args.due),
            Some(Recurrence::Monthly {
                interval: 1,
                day: 27
            })
        );

        let cli = Cli::parse_from([
            "lazytask", "add", "gym", "--due", "2024-03-07", "--repeat", "weekly",
        ]);
        let Command::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(
            args.repeat.to_recurrence(args.due),
            Some(Recurrence::Weekly {
                interval: 1,
                weekdays: vec![4]
            })
        );
    }

    #[test]
    fn no_repeat_flag_leaves_rule_unset() {
        let cli = Cli::parse_from(["lazytask", "add", "once", "--due", "2024-03-01"]);
        let Command::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.repeat.to_recurrence(args.due), None);
    }

    #[test]
    fn rule_flags_without_repeat_are_rejected() {
        for flags in [["--every", "2"], ["--on", "mon"], ["--day", "5"]] {
            let mut argv = vec!["lazytask", "edit", "abcd"];
            argv.extend(flags);
            let err = Cli::try_parse_from(argv).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument, "{flags:?}");
        }

        let cli =
            Cli::try_parse_from(["lazytask", "edit", "abcd", "--repeat", "daily", "--every", "2"])
                .unwrap();
        let Command::Edit(args) = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(args.repeat.every, Some(2));
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::parse_from(["lazytask", "list", "--database", "/tmp/x.db"]);
        assert_eq!(cli.database.unwrap().to_str(), Some("/tmp/x.db"));
    }

    #[test]
    fn month_offset_accepts_negative_values() {
        let cli = Cli::parse_from(["lazytask", "month", "--offset", "-1"]);
        let Command::Month(args) = cli.command else {
            panic!("expected month");
        };
        assert_eq!(args.offset, -1);
    }
}
