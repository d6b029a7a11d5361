//! Recurrence rule model.
//!
//! # Responsibility
//! - Define the closed set of repeat rules a task can carry.
//! - Provide boundary clamping for rules coming from task create/edit flows.
//!
//! # Invariants
//! - `interval >= 1` for every repeating variant.
//! - Weekday numbers are `0 = Sunday ..= 6 = Saturday`.
//! - Monthly `day` stays within `[1, 28]` so every month has that day.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lowest day-of-month a monthly rule may target.
pub const MIN_MONTH_DAY: u8 = 1;
/// Highest day-of-month a monthly rule may target.
pub const MAX_MONTH_DAY: u8 = 28;
/// Highest weekday number (`6 = Saturday`).
pub const MAX_WEEKDAY: u8 = 6;

/// Repeat rule attached to a task's anchor due date.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recurrence {
    /// Occurs exactly once, at the anchor.
    #[default]
    None,
    /// Every `interval` days.
    Daily { interval: u32 },
    /// Every `interval` weeks, on each listed weekday.
    Weekly { interval: u32, weekdays: Vec<u8> },
    /// Every `interval` months, on day-of-month `day`.
    Monthly { interval: u32, day: u8 },
}

/// Malformed recurrence data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    ZeroInterval,
    WeekdayOutOfRange(u8),
    MonthDayOutOfRange(u8),
}

impl Display for RecurrenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroInterval => write!(f, "recurrence interval must be >= 1"),
            Self::WeekdayOutOfRange(value) => {
                write!(f, "weekday {value} is out of range 0..={MAX_WEEKDAY}")
            }
            Self::MonthDayOutOfRange(value) => write!(
                f,
                "month day {value} is out of range {MIN_MONTH_DAY}..={MAX_MONTH_DAY}"
            ),
        }
    }
}

impl Error for RecurrenceError {}

impl Recurrence {
    /// Monthly rule that repeats on the anchor's own day-of-month.
    ///
    /// Anchors on the 29th..31st fall back to the 28th.
    pub fn monthly_from_anchor(interval: u32, anchor: NaiveDateTime) -> Self {
        Self::Monthly {
            interval: interval.max(1),
            day: clamp_month_day(anchor.day()),
        }
    }

    /// Returns whether the rule produces more than one occurrence.
    pub fn is_repeating(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Checks the rule against the model invariants.
    ///
    /// Duplicate weekdays are tolerated; they do not produce duplicate
    /// occurrences.
    pub fn validate(&self) -> Result<(), RecurrenceError> {
        match self {
            Self::None => Ok(()),
            Self::Daily { interval } => check_interval(*interval),
            Self::Weekly { interval, weekdays } => {
                check_interval(*interval)?;
                match weekdays.iter().find(|day| **day > MAX_WEEKDAY) {
                    Some(day) => Err(RecurrenceError::WeekdayOutOfRange(*day)),
                    None => Ok(()),
                }
            }
            Self::Monthly { interval, day } => {
                check_interval(*interval)?;
                if (MIN_MONTH_DAY..=MAX_MONTH_DAY).contains(day) {
                    Ok(())
                } else {
                    Err(RecurrenceError::MonthDayOutOfRange(*day))
                }
            }
        }
    }

    /// Returns a well-formed copy of this rule.
    ///
    /// Applied where rules enter the system (task create/edit), so later
    /// stages can assume `validate()` holds.
    pub fn normalized(&self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Daily { interval } => Self::Daily {
                interval: (*interval).max(1),
            },
            Self::Weekly { interval, weekdays } => Self::Weekly {
                interval: (*interval).max(1),
                weekdays: weekdays
                    .iter()
                    .copied()
                    .filter(|day| *day <= MAX_WEEKDAY)
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect(),
            },
            Self::Monthly { interval, day } => Self::Monthly {
                interval: (*interval).max(1),
                day: clamp_month_day(u32::from(*day)),
            },
        }
    }

    /// Short human label, e.g. `every 2 weeks`.
    pub fn describe(&self) -> String {
        match self {
            Self::None => "once".to_string(),
            Self::Daily { interval } => every(*interval, "day"),
            Self::Weekly { interval, weekdays } => {
                let days = weekdays
                    .iter()
                    .copied()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .map(weekday_short_name)
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{} on {days}", every(*interval, "week"))
            }
            Self::Monthly { interval, day } => {
                format!("{} on day {day}", every(*interval, "month"))
            }
        }
    }
}

/// Three-letter English weekday name for `0 = Sunday ..= 6 = Saturday`.
pub fn weekday_short_name(day: u8) -> &'static str {
    match day {
        0 => "Sun",
        1 => "Mon",
        2 => "Tue",
        3 => "Wed",
        4 => "Thu",
        5 => "Fri",
        6 => "Sat",
        _ => "?",
    }
}

fn clamp_month_day(day: u32) -> u8 {
    let clamped = day.clamp(u32::from(MIN_MONTH_DAY), u32::from(MAX_MONTH_DAY));
    u8::try_from(clamped).unwrap_or(MAX_MONTH_DAY)
}

fn check_interval(interval: u32) -> Result<(), RecurrenceError> {
    if interval == 0 {
        return Err(RecurrenceError::ZeroInterval);
    }
    Ok(())
}

fn every(interval: u32, unit: &str) -> String {
    if interval == 1 {
        format!("every {unit}")
    } else {
        format!("every {interval} {unit}s")
    }
}
