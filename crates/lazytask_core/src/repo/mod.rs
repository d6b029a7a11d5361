//! Persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the snapshot contract the services read and write through.
//! - Isolate SQLite and JSON encoding details from business orchestration.
//!
//! # Invariants
//! - Store writes must enforce `Task::validate()` before persistence.
//! - Store APIs return semantic errors (`NotFound`, `InvalidData`) in
//!   addition to DB transport errors.

pub mod task_store;
