//! Calendar core: recurrence expansion and month grid geometry.
//!
//! # Responsibility
//! - Compute occurrence instants for tasks inside a date window.
//! - Compute the full-week window for a displayed month.
//! - Project occurrences into per-day cells for rendering.
//!
//! # Invariants
//! - Every function here is pure and never reads the system clock.
//! - Callers pass `now`/`view_date` explicitly.

pub mod expand;
pub mod grid;
pub mod month_view;
