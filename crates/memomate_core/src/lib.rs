//! Core domain logic for MemoMate.
//! This crate is the single source of truth for task and reminder invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod reminder;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{parse_category, Category, Task, TaskDraft, TaskId, TaskValidationError};
pub use reminder::delay::{
    compute_delay, format_due_date, format_due_time, parse_due_date, resolve_due_instant,
};
pub use reminder::scheduler::{
    named_reminder_key, task_reminder_key, DeferredJobHost, Notification, ReminderPayload,
    ReminderScheduler, NOTIFICATION_TITLE,
};
pub use reminder::tokio_host::TokioJobHost;
pub use repo::pref_store::{
    MemoryPreferenceStore, PreferenceStore, SqlitePreferenceStore, StoreError, StoreResult,
};
pub use repo::task_store::{TaskStore, TASKS_KEY};
pub use service::task_service::{ServiceResult, TaskService, TaskServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
