//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose task and reminder use cases to Dart via FRB.
//! - Own the process-wide reminder runtime and fired-notification queue.
//! - Restore reminders for open tasks when the runtime starts.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Task store access is serialized through one process-wide lock.

use chrono::Local;
use memomate_core::db::open_db;
use memomate_core::{
    compute_delay, core_version as core_version_inner, init_logging as init_logging_inner,
    parse_category, ping as ping_inner, Notification, ReminderScheduler, SqlitePreferenceStore,
    Task, TaskDraft, TaskService, TaskStore, TokioJobHost,
};
use log::warn;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver};

const ENTRY_DB_FILE_NAME: &str = "memomate.sqlite3";
static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static STORE_LOCK: Mutex<()> = Mutex::new(());
static REMINDERS: OnceCell<ReminderRuntime> = OnceCell::new();

struct ReminderRuntime {
    // Kept alive for the process lifetime; the host spawns onto its handle.
    _runtime: Runtime,
    host: TokioJobHost,
    fired: Mutex<UnboundedReceiver<Notification>>,
}

type EntryService<'conn> = TaskService<SqlitePreferenceStore<'conn>, &'static TokioJobHost>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Task shape handed to Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub due_time: String,
    pub created_date: String,
    /// `High|Medium|Low`.
    pub category: String,
    pub completed: bool,
}

impl From<Task> for TaskItem {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            due_time: task.due_time,
            created_date: task.created_date,
            category: task.category.as_str().to_string(),
            completed: task.completed,
        }
    }
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    /// Whether the listing succeeded; `false` carries the reason in `message`.
    pub ok: bool,
    pub items: Vec<TaskItem>,
    pub message: String,
}

impl TaskListResponse {
    fn success(tasks: Vec<Task>) -> Self {
        let items = tasks.into_iter().map(TaskItem::from).collect::<Vec<_>>();
        let message = if items.is_empty() {
            "No tasks.".to_string()
        } else {
            format!("Found {} task(s).", items.len())
        };
        Self {
            ok: true,
            items,
            message,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            message: message.into(),
        }
    }
}

/// Action response envelope for create/edit/toggle/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    /// Resulting task for create/edit/toggle.
    pub task: Option<TaskItem>,
    /// Human-readable message for UI feedback.
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task: Option<Task>) -> Self {
        Self {
            ok: true,
            task: task.map(TaskItem::from),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task: None,
            message: message.into(),
        }
    }
}

/// A reminder that fired and should be posted as a local notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredReminder {
    pub task_id: Option<i64>,
    pub title: String,
    pub body: String,
}

/// Lists all tasks in store order.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list() -> TaskListResponse {
    match with_task_service(|service| Ok(service.list_tasks())) {
        Ok(tasks) => TaskListResponse::success(tasks),
        Err(err) => TaskListResponse::failure(format!("task_list failed: {err}")),
    }
}

/// Lists tasks whose category label equals `category` exactly.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list_by_category(category: String) -> TaskListResponse {
    match with_task_service(|service| Ok(service.tasks_by_category(&category))) {
        Ok(tasks) => TaskListResponse::success(tasks),
        Err(err) => TaskListResponse::failure(format!("task_list_by_category failed: {err}")),
    }
}

/// Lists tasks due within `[start_date, end_date]`.
///
/// `calendar = false` compares the stored date strings as plain text;
/// `calendar = true` compares them as calendar dates.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list_by_date_range(
    start_date: String,
    end_date: String,
    calendar: bool,
) -> TaskListResponse {
    let result = with_task_service(|service| {
        let tasks = if calendar {
            service.tasks_by_calendar_range(&start_date, &end_date)
        } else {
            service.tasks_by_date_range(&start_date, &end_date)
        };
        tasks.map_err(|err| err.to_string())
    });
    match result {
        Ok(tasks) => TaskListResponse::success(tasks),
        Err(err) => TaskListResponse::failure(err),
    }
}

/// Creates a task and schedules its reminder.
///
/// `category = None` uses the default priority.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create(
    title: String,
    description: String,
    due_date: String,
    due_time: String,
    category: Option<String>,
) -> TaskActionResponse {
    let draft = match build_draft(title, description, due_date, due_time, category) {
        Ok(draft) => draft,
        Err(message) => return TaskActionResponse::failure(message),
    };
    match with_task_service(|service| {
        service
            .create_task(&draft, &Local::now())
            .map_err(|err| err.to_string())
    }) {
        Ok(task) => TaskActionResponse::success("Note added successfully", Some(task)),
        Err(err) => TaskActionResponse::failure(err),
    }
}

/// Edits task `id` and reschedules its reminder.
///
/// `category = None` keeps the current category.
#[flutter_rust_bridge::frb(sync)]
pub fn task_edit(
    id: i64,
    title: String,
    description: String,
    due_date: String,
    due_time: String,
    category: Option<String>,
) -> TaskActionResponse {
    let draft = match build_draft(title, description, due_date, due_time, category) {
        Ok(draft) => draft,
        Err(message) => return TaskActionResponse::failure(message),
    };
    match with_task_service(|service| {
        service
            .edit_task(id, &draft, &Local::now())
            .map_err(|err| err.to_string())
    }) {
        Ok(task) => TaskActionResponse::success("Note updated successfully", Some(task)),
        Err(err) => TaskActionResponse::failure(err),
    }
}

/// Flips the completion flag of task `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle_completed(id: i64) -> TaskActionResponse {
    match with_task_service(|service| service.toggle_completed(id).map_err(|err| err.to_string()))
    {
        Ok(Some(task)) => TaskActionResponse::success("Task updated.", Some(task)),
        Ok(None) => TaskActionResponse::failure(format!("task not found: {id}")),
        Err(err) => TaskActionResponse::failure(err),
    }
}

/// Deletes task `id` and cancels its reminder. Deleting a missing task succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: i64) -> TaskActionResponse {
    match with_task_service(|service| service.delete_task(id).map_err(|err| err.to_string())) {
        Ok(true) => TaskActionResponse::success("Task deleted.", None),
        Ok(false) => TaskActionResponse::success("Nothing to delete.", None),
        Err(err) => TaskActionResponse::failure(err),
    }
}

/// Milliseconds until a reminder for `due_date due_time` fires, in local time.
///
/// Returns 0 for past or unparsable input.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_delay_ms(due_date: String, due_time: String) -> i64 {
    let delay = compute_delay(&due_date, &due_time, &Local::now());
    i64::try_from(delay.as_millis()).unwrap_or(i64::MAX)
}

/// Drains reminders that fired since the last call.
///
/// The Dart side posts each one as a local notification.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_take_fired() -> Vec<FiredReminder> {
    let Some(reminders) = REMINDERS.get() else {
        return Vec::new();
    };
    let mut fired = reminders
        .fired
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    let mut drained = Vec::new();
    while let Ok(notification) = fired.try_recv() {
        drained.push(FiredReminder {
            task_id: notification.task_id,
            title: notification.title,
            body: notification.body,
        });
    }
    drained
}

fn build_draft(
    title: String,
    description: String,
    due_date: String,
    due_time: String,
    category: Option<String>,
) -> Result<TaskDraft, String> {
    let mut draft = TaskDraft::new(title, description, due_date, due_time);
    if let Some(label) = category.filter(|label| !label.trim().is_empty()) {
        draft.category = Some(parse_category(&label).map_err(|err| err.to_string())?);
    }
    draft.validate().map_err(|err| err.to_string())?;
    Ok(draft)
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("MEMOMATE_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
        })
        .clone()
}

fn reminder_runtime() -> Result<&'static ReminderRuntime, String> {
    REMINDERS.get_or_try_init(|| start_reminder_runtime(&resolve_entry_db_path()))
}

/// Starts the reminder runtime and reschedules reminders for every open
/// task stored at `db_path`.
///
/// Pending jobs die with the process, so each start restores them from the
/// store. A store that cannot be opened leaves the runtime running with no
/// restored jobs.
fn start_reminder_runtime(db_path: &Path) -> Result<ReminderRuntime, String> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("memomate-reminders")
        .enable_time()
        .build()
        .map_err(|err| format!("reminder runtime init failed: {err}"))?;
    let (tx, rx) = mpsc::unbounded_channel();
    let host = TokioJobHost::new(runtime.handle().clone(), tx);

    match open_db(db_path) {
        Ok(conn) => {
            let service = TaskService::new(
                TaskStore::new(SqlitePreferenceStore::new(&conn)),
                ReminderScheduler::new(&host),
            );
            service.restore_reminders(&Local::now());
        }
        Err(err) => {
            warn!("event=reminders_restore module=ffi status=error error={err}");
        }
    }

    Ok(ReminderRuntime {
        _runtime: runtime,
        host,
        fired: Mutex::new(rx),
    })
}

fn with_task_service<T>(
    f: impl FnOnce(&EntryService<'_>) -> Result<T, String>,
) -> Result<T, String> {
    let _guard = STORE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let reminders = reminder_runtime()?;
    let db_path = resolve_entry_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("entry DB open failed: {err}"))?;
    let service = TaskService::new(
        TaskStore::new(SqlitePreferenceStore::new(&conn)),
        ReminderScheduler::new(&reminders.host),
    );
    f(&service)
}
