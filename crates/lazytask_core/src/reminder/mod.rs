//! Due-date reminders.
//!
//! # Responsibility
//! - Decide, per task and due minute, whether a reminder fires.
//! - Deliver reminders through desktop and email channels.
//!
//! # Invariants
//! - Minute granularity: a task fires at most once per due minute.
//! - Only `active` tasks remind.

pub mod channel;
pub mod policy;
pub mod scheduler;
