//! Reminder scheduling over a deferred-job capability.
//!
//! # Responsibility
//! - Define the host capability for one-shot, uniquely keyed jobs.
//! - Map tasks to job keys and notification payloads.
//!
//! # Invariants
//! - At most one pending job exists per key; scheduling again replaces it.
//! - Task reminders are keyed by numeric task id, so tasks sharing a title
//!   never cancel each other.
//! - A fired job emits exactly one notification and is never retried.

use crate::model::task::{Task, TaskId};
use log::debug;
use std::time::Duration;

/// Fixed title of every reminder notification.
pub const NOTIFICATION_TITLE: &str = "Note Alert!";

/// Data carried by a deferred reminder job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPayload {
    /// Set for task-keyed reminders, `None` for name-keyed ones.
    pub task_id: Option<TaskId>,
    /// Text interpolated into the notification body.
    pub name: String,
}

/// The single observable effect of a fired reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub key: String,
    pub task_id: Option<TaskId>,
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn for_payload(key: &str, payload: &ReminderPayload) -> Self {
        Self {
            key: key.to_string(),
            task_id: payload.task_id,
            title: NOTIFICATION_TITLE.to_string(),
            body: format!("Time to do {}", payload.name),
        }
    }
}

/// Host facility running one-shot jobs after a minimum delay.
///
/// Jobs may fire later than requested, never earlier. Scheduling is
/// fire-and-forget: the caller keeps no handle beyond the key.
pub trait DeferredJobHost {
    /// Enqueues a job under `key`, replacing any pending job with that key.
    fn schedule_once(&self, key: &str, delay: Duration, payload: ReminderPayload);
    /// Cancels the pending job under `key`; no-op when there is none.
    fn cancel(&self, key: &str);
}

impl<T: DeferredJobHost + ?Sized> DeferredJobHost for &T {
    fn schedule_once(&self, key: &str, delay: Duration, payload: ReminderPayload) {
        (**self).schedule_once(key, delay, payload)
    }

    fn cancel(&self, key: &str) {
        (**self).cancel(key)
    }
}

/// Job key for a task reminder.
pub fn task_reminder_key(task_id: TaskId) -> String {
    format!("task:{task_id}")
}

/// Job key for a name-addressed reminder.
pub fn named_reminder_key(name: &str) -> String {
    format!("name:{name}")
}

/// Task-level reminder API on top of a [`DeferredJobHost`].
pub struct ReminderScheduler<H: DeferredJobHost> {
    host: H,
}

impl<H: DeferredJobHost> ReminderScheduler<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Schedules the reminder for `task`, replacing any previous one.
    pub fn schedule(&self, task: &Task, delay: Duration) {
        let key = task_reminder_key(task.id);
        debug!(
            "event=reminder_schedule module=reminder status=ok key={key} delay_ms={}",
            delay.as_millis()
        );
        self.host.schedule_once(
            &key,
            delay,
            ReminderPayload {
                task_id: Some(task.id),
                name: task.title.clone(),
            },
        );
    }

    /// Cancels the reminder of task `task_id`, if any.
    pub fn cancel(&self, task_id: TaskId) {
        let key = task_reminder_key(task_id);
        debug!("event=reminder_cancel module=reminder status=ok key={key}");
        self.host.cancel(&key);
    }

    /// Schedules a reminder addressed by `name` instead of a task id.
    ///
    /// Two calls with the same name share one job slot.
    pub fn schedule_named(&self, name: &str, delay: Duration) {
        let key = named_reminder_key(name);
        debug!(
            "event=reminder_schedule module=reminder status=ok key_kind=name delay_ms={}",
            delay.as_millis()
        );
        self.host.schedule_once(
            &key,
            delay,
            ReminderPayload {
                task_id: None,
                name: name.to_string(),
            },
        );
    }

    pub fn cancel_named(&self, name: &str) {
        debug!("event=reminder_cancel module=reminder status=ok key_kind=name");
        self.host.cancel(&named_reminder_key(name));
    }
}
