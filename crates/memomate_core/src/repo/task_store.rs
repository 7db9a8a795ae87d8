//! Task list persistence over a preference store.
//!
//! # Responsibility
//! - Load and save the full task list as one JSON value.
//! - Provide add/update/delete by id and list filters.
//!
//! # Invariants
//! - Every mutation is one full read-modify-write of the stored list.
//! - Undecodable stored data reads as an empty list.
//! - A failed read aborts a mutation before anything is written.
//! - Order of the stored list is the insertion order.
//!
//! Callers must drive one store from a single logical thread; concurrent
//! read-modify-write cycles can lose updates.

use crate::model::task::{Task, TaskId, TaskValidationError};
use crate::reminder::delay::parse_due_date;
use crate::repo::pref_store::{PreferenceStore, StoreError, StoreResult};
use log::{debug, warn};

/// Preference key holding the serialized task list.
pub const TASKS_KEY: &str = "tasks_list";

/// Full-list task store.
pub struct TaskStore<S: PreferenceStore> {
    prefs: S,
}

impl<S: PreferenceStore> TaskStore<S> {
    pub fn new(prefs: S) -> Self {
        Self { prefs }
    }

    /// Loads every stored task.
    ///
    /// Missing, unreadable, or undecodable data is treated as no data.
    pub fn get_all(&self) -> Vec<Task> {
        self.load().unwrap_or_else(|err| {
            warn!("event=tasks_load module=repo status=error error_code=read_failed error={err}");
            Vec::new()
        })
    }

    /// Loads the stored list for a read-modify-write cycle.
    ///
    /// Read failures are returned so a mutation never rewrites the list from
    /// a partial view; missing, `null`, or undecodable data is an empty list.
    fn load(&self) -> StoreResult<Vec<Task>> {
        let Some(raw) = self.prefs.get_string(TASKS_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Option<Vec<Task>>>(&raw) {
            Ok(tasks) => Ok(tasks.unwrap_or_default()),
            Err(err) => {
                warn!(
                    "event=tasks_load module=repo status=error error_code=decode_failed line={} column={}",
                    err.line(),
                    err.column()
                );
                Ok(Vec::new())
            }
        }
    }

    /// Replaces the stored list with `tasks`.
    pub fn save_all(&self, tasks: &[Task]) -> StoreResult<()> {
        let json = serde_json::to_string(tasks)?;
        self.prefs.put_string(TASKS_KEY, &json)?;
        debug!("event=tasks_save module=repo status=ok count={}", tasks.len());
        Ok(())
    }

    /// Appends `task` to the stored list.
    pub fn add(&self, task: Task) -> StoreResult<()> {
        let mut tasks = self.load()?;
        tasks.push(task);
        self.save_all(&tasks)
    }

    /// Replaces the first stored task with the same id.
    ///
    /// Returns `false` and writes nothing when no task matches.
    pub fn update(&self, task: &Task) -> StoreResult<bool> {
        let mut tasks = self.load()?;
        let Some(slot) = tasks.iter_mut().find(|stored| stored.id == task.id) else {
            debug!("event=task_update module=repo status=noop task_id={}", task.id);
            return Ok(false);
        };
        *slot = task.clone();
        self.save_all(&tasks)?;
        Ok(true)
    }

    /// Removes every stored task with the same id as `task`.
    pub fn delete(&self, task: &Task) -> StoreResult<usize> {
        self.delete_by_id(task.id)
    }

    /// Removes every stored task with `id`; returns how many were removed.
    pub fn delete_by_id(&self, id: TaskId) -> StoreResult<usize> {
        let mut tasks = self.load()?;
        let before = tasks.len();
        tasks.retain(|stored| stored.id != id);
        let removed = before - tasks.len();
        if removed > 0 {
            self.save_all(&tasks)?;
        }
        Ok(removed)
    }

    /// First stored task with `id`.
    pub fn find(&self, id: TaskId) -> StoreResult<Option<Task>> {
        Ok(self.load()?.into_iter().find(|task| task.id == id))
    }

    /// Next free id: one past the largest stored id, starting at 1.
    pub fn next_id(&self) -> StoreResult<TaskId> {
        match self.load()?.iter().map(|task| task.id).max() {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or(StoreError::IdSpaceExhausted),
        }
    }

    /// Tasks whose category label equals `category` exactly.
    pub fn filter_by_category(&self, category: &str) -> Vec<Task> {
        self.get_all()
            .into_iter()
            .filter(|task| task.category.as_str() == category)
            .collect()
    }

    /// Tasks whose `due_date` string lies in `[start, end]` by plain string
    /// ordering.
    ///
    /// `Mon DD, YYYY` strings do not sort chronologically: month names
    /// order alphabetically and the year is compared last. Use
    /// [`TaskStore::filter_by_calendar_range`] for calendar semantics.
    pub fn filter_by_date_range(&self, start: &str, end: &str) -> Vec<Task> {
        self.get_all()
            .into_iter()
            .filter(|task| start <= task.due_date.as_str() && task.due_date.as_str() <= end)
            .collect()
    }

    /// Tasks whose due date lies in `[start, end]` as calendar dates.
    ///
    /// Tasks with an unparsable due date are left out.
    pub fn filter_by_calendar_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<Task>, TaskValidationError> {
        let start_date = parse_due_date(start)
            .ok_or_else(|| TaskValidationError::InvalidDate(start.to_string()))?;
        let end_date =
            parse_due_date(end).ok_or_else(|| TaskValidationError::InvalidDate(end.to_string()))?;

        Ok(self
            .get_all()
            .into_iter()
            .filter(|task| {
                parse_due_date(&task.due_date)
                    .is_some_and(|due| start_date <= due && due <= end_date)
            })
            .collect())
    }
}
