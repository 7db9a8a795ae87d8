//! Reminder delay computation and deferred notification scheduling.
//!
//! # Responsibility
//! - Turn stored due strings into a delay.
//! - Schedule and cancel one notification job per task.

pub mod delay;
pub mod scheduler;
pub mod tokio_host;
