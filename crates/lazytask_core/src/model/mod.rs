//! Domain model for tasks, recurrence rules and calendar occurrences.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep one task shape for the list, calendar and reminder projections.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Recurrence is a sum type; each variant carries only its own fields.

pub mod interval;
pub mod recurrence;
pub mod task;
