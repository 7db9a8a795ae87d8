//! Task use-case service.
//!
//! # Responsibility
//! - Provide the save/toggle/delete/list flows the presentation layer calls.
//! - Keep task persistence and reminder scheduling in step.
//!
//! # Invariants
//! - Blank titles are rejected before anything is persisted or scheduled.
//! - A task is persisted before its reminder is scheduled.
//! - Deleting a task cancels its reminder.
//! - A store read failure aborts a mutation before anything is scheduled.

use crate::model::task::{Task, TaskDraft, TaskId, TaskValidationError};
use crate::reminder::delay::{compute_delay, format_due_date};
use crate::reminder::scheduler::{DeferredJobHost, ReminderScheduler};
use crate::repo::pref_store::{PreferenceStore, StoreError};
use crate::repo::task_store::TaskStore;
use chrono::{DateTime, TimeZone};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub type ServiceResult<T> = Result<T, TaskServiceError>;

#[derive(Debug)]
pub enum TaskServiceError {
    Validation(TaskValidationError),
    Store(StoreError),
    NotFound(TaskId),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<TaskValidationError> for TaskServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for TaskServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Orchestrates the task store and reminder scheduler.
pub struct TaskService<S: PreferenceStore, H: DeferredJobHost> {
    store: TaskStore<S>,
    reminders: ReminderScheduler<H>,
}

impl<S: PreferenceStore, H: DeferredJobHost> TaskService<S, H> {
    pub fn new(store: TaskStore<S>, reminders: ReminderScheduler<H>) -> Self {
        Self { store, reminders }
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn reminders(&self) -> &ReminderScheduler<H> {
        &self.reminders
    }

    /// Creates a task from `draft` and schedules its reminder.
    ///
    /// # Contract
    /// - Assigns the next free id.
    /// - `created_date` is the calendar date of `now`.
    /// - The reminder fires at the due date/time, or immediately when that
    ///   is in the past or unparsable.
    pub fn create_task<Tz: TimeZone>(
        &self,
        draft: &TaskDraft,
        now: &DateTime<Tz>,
    ) -> ServiceResult<Task> {
        draft.validate()?;

        let task = Task::from_draft(
            self.store.next_id()?,
            draft,
            format_due_date(now.date_naive()),
        );
        self.store.add(task.clone())?;

        let delay = compute_delay(&task.due_date, &task.due_time, now);
        self.reminders.schedule(&task, delay);
        info!(
            "event=task_create module=service status=ok task_id={} category={} delay_ms={}",
            task.id,
            task.category,
            delay.as_millis()
        );
        Ok(task)
    }

    /// Applies `draft` to task `id` and reschedules its reminder.
    pub fn edit_task<Tz: TimeZone>(
        &self,
        id: TaskId,
        draft: &TaskDraft,
        now: &DateTime<Tz>,
    ) -> ServiceResult<Task> {
        draft.validate()?;

        let existing = self.store.find(id)?.ok_or(TaskServiceError::NotFound(id))?;
        let task = existing.with_edits(draft);
        if !self.store.update(&task)? {
            return Err(TaskServiceError::NotFound(id));
        }

        self.reminders.cancel(id);
        let delay = compute_delay(&task.due_date, &task.due_time, now);
        self.reminders.schedule(&task, delay);
        info!(
            "event=task_edit module=service status=ok task_id={} delay_ms={}",
            task.id,
            delay.as_millis()
        );
        Ok(task)
    }

    /// Flips the completion flag of task `id`.
    ///
    /// Returns `None` when no such task exists.
    pub fn toggle_completed(&self, id: TaskId) -> ServiceResult<Option<Task>> {
        let Some(mut task) = self.store.find(id)? else {
            return Ok(None);
        };
        task.toggle_completed();
        self.store.update(&task)?;
        info!(
            "event=task_toggle module=service status=ok task_id={} completed={}",
            task.id, task.completed
        );
        Ok(Some(task))
    }

    /// Deletes task `id` and cancels its reminder.
    ///
    /// Returns whether a task was removed.
    pub fn delete_task(&self, id: TaskId) -> ServiceResult<bool> {
        let removed = self.store.delete_by_id(id)?;
        self.reminders.cancel(id);
        info!("event=task_delete module=service status=ok task_id={id} removed={removed}");
        Ok(removed > 0)
    }

    /// Schedules a reminder for every open task, keyed by id.
    ///
    /// Used when a fresh job host starts, since pending jobs do not outlive
    /// the process. Completed tasks are skipped. Returns the scheduled ids
    /// with their delays in store order.
    pub fn restore_reminders<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Vec<(TaskId, Duration)> {
        let restored = self
            .store
            .get_all()
            .into_iter()
            .filter(|task| !task.completed)
            .map(|task| {
                let delay = compute_delay(&task.due_date, &task.due_time, now);
                self.reminders.schedule(&task, delay);
                (task.id, delay)
            })
            .collect::<Vec<_>>();
        info!(
            "event=reminders_restore module=service status=ok count={}",
            restored.len()
        );
        restored
    }

    pub fn list_tasks(&self) -> Vec<Task> {
        self.store.get_all()
    }

    pub fn tasks_by_category(&self, category: &str) -> Vec<Task> {
        self.store.filter_by_category(category)
    }

    /// Date-range listing with plain string comparison of due dates.
    ///
    /// Both bounds must be non-blank; the start bound is checked first.
    pub fn tasks_by_date_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<Task>, TaskValidationError> {
        require_range_bounds(start, end)?;
        Ok(self.store.filter_by_date_range(start, end))
    }

    /// Date-range listing with calendar comparison of due dates.
    pub fn tasks_by_calendar_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<Task>, TaskValidationError> {
        require_range_bounds(start, end)?;
        self.store.filter_by_calendar_range(start, end)
    }
}

fn require_range_bounds(start: &str, end: &str) -> Result<(), TaskValidationError> {
    if start.trim().is_empty() {
        return Err(TaskValidationError::EmptyStartDate);
    }
    if end.trim().is_empty() {
        return Err(TaskValidationError::EmptyEndDate);
    }
    Ok(())
}
