//! Domain model for reminder tasks.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every task is identified by a stable numeric `TaskId`.
//! - Deletion removes the record; there are no tombstones.

pub mod task;
