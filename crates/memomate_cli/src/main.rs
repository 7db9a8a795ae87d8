//! Command-line client over MemoMate core.
//!
//! # Responsibility
//! - Provide local task CRUD and listing against the same database the
//!   app uses.
//! - `watch` runs pending reminders in-process and prints them as they fire.

use chrono::Local;
use clap::{Parser, Subcommand};
use memomate_core::db::open_db;
use memomate_core::{
    compute_delay, default_log_level, init_logging, parse_category, DeferredJobHost,
    PreferenceStore, ReminderPayload, ReminderScheduler, SqlitePreferenceStore, Task, TaskDraft,
    TaskService, TaskStore, TokioJobHost,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "memomate", version, about = "Task reminders from the terminal")]
struct Cli {
    /// SQLite database path (defaults to $MEMOMATE_DB_PATH, then the temp dir).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print core health and version.
    Ping,
    /// List tasks, optionally filtered.
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, requires = "to")]
        from: Option<String>,
        #[arg(long, requires = "from")]
        to: Option<String>,
        /// Compare dates on the calendar instead of as plain text.
        #[arg(long)]
        calendar: bool,
    },
    /// Add a task and report when its reminder is due.
    Add {
        title: String,
        /// Due date, e.g. "Jan 05, 2025".
        #[arg(long)]
        date: String,
        /// Due time, e.g. "09:30 AM".
        #[arg(long)]
        time: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Replace the editable fields of a task.
    Edit {
        id: i64,
        title: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Flip the completion flag of a task.
    Toggle { id: i64 },
    /// Delete a task.
    Delete { id: i64 },
    /// Print the reminder delay for a due date and time.
    Delay { date: String, time: String },
    /// Schedule reminders for open tasks and print them as they fire.
    Watch,
}

/// Host for one-shot commands: the process exits before any job could
/// fire, so scheduling is only reported.
struct ReportingHost;

impl DeferredJobHost for ReportingHost {
    fn schedule_once(&self, key: &str, delay: Duration, _payload: ReminderPayload) {
        println!("reminder {key} due in {}", format_delay(delay));
    }

    fn cancel(&self, key: &str) {
        println!("reminder {key} cancelled");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        if let Err(err) = init_logging(default_log_level(), log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Ping => {
            println!("memomate_core ping={}", memomate_core::ping());
            println!("memomate_core version={}", memomate_core::core_version());
            Ok(())
        }
        Command::Delay { date, time } => {
            let delay = compute_delay(&date, &time, &Local::now());
            println!("{} ms ({})", delay.as_millis(), format_delay(delay));
            Ok(())
        }
        Command::Watch => watch(&resolve_db_path(cli.db)),
        command => {
            let conn = open_db(resolve_db_path(cli.db)).map_err(|err| err.to_string())?;
            let service = TaskService::new(
                TaskStore::new(SqlitePreferenceStore::new(&conn)),
                ReminderScheduler::new(ReportingHost),
            );
            run_task_command(&service, command)
        }
    }
}

fn run_task_command(
    service: &TaskService<SqlitePreferenceStore<'_>, ReportingHost>,
    command: Command,
) -> Result<(), String> {
    match command {
        Command::List {
            category,
            from,
            to,
            calendar,
        } => {
            let range = from.zip(to);
            let tasks = list_tasks(service, category.as_deref(), range, calendar)?;
            if tasks.is_empty() {
                println!("No tasks.");
            }
            for task in &tasks {
                print_task(task);
            }
            Ok(())
        }
        Command::Add {
            title,
            date,
            time,
            description,
            category,
        } => {
            let draft = build_draft(title, description, date, time, category)?;
            let task = service
                .create_task(&draft, &Local::now())
                .map_err(|err| err.to_string())?;
            print_task(&task);
            Ok(())
        }
        Command::Edit {
            id,
            title,
            date,
            time,
            description,
            category,
        } => {
            let draft = build_draft(title, description, date, time, category)?;
            let task = service
                .edit_task(id, &draft, &Local::now())
                .map_err(|err| err.to_string())?;
            print_task(&task);
            Ok(())
        }
        Command::Toggle { id } => match service.toggle_completed(id) {
            Ok(Some(task)) => {
                print_task(&task);
                Ok(())
            }
            Ok(None) => Err(format!("task not found: {id}")),
            Err(err) => Err(err.to_string()),
        },
        Command::Delete { id } => {
            let removed = service.delete_task(id).map_err(|err| err.to_string())?;
            println!("{}", if removed { "deleted" } else { "nothing to delete" });
            Ok(())
        }
        Command::Ping | Command::Delay { .. } | Command::Watch => Ok(()),
    }
}

fn list_tasks<S: PreferenceStore, H: DeferredJobHost>(
    service: &TaskService<S, H>,
    category: Option<&str>,
    range: Option<(String, String)>,
    calendar: bool,
) -> Result<Vec<Task>, String> {
    let Some((from, to)) = range else {
        return Ok(match category {
            Some(category) => service.tasks_by_category(category),
            None => service.list_tasks(),
        });
    };

    let mut tasks = if calendar {
        service.tasks_by_calendar_range(&from, &to)
    } else {
        service.tasks_by_date_range(&from, &to)
    }
    .map_err(|err| err.to_string())?;
    if let Some(category) = category {
        tasks.retain(|task| task.category.as_str() == category);
    }
    Ok(tasks)
}

fn watch(db_path: &Path) -> Result<(), String> {
    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|err| format!("runtime init failed: {err}"))?;
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let service = TaskService::new(
        TaskStore::new(SqlitePreferenceStore::new(&conn)),
        ReminderScheduler::new(TokioJobHost::new(runtime.handle().clone(), tx)),
    );

    let restored = service.restore_reminders(&Local::now());
    if restored.is_empty() {
        println!("No open tasks.");
        return Ok(());
    }
    for (id, delay) in &restored {
        println!("#{id} due in {}", format_delay(*delay));
    }

    runtime.block_on(async {
        for _ in 0..restored.len() {
            match rx.recv().await {
                Some(notification) => println!("{}: {}", notification.title, notification.body),
                None => break,
            }
        }
    });
    Ok(())
}

fn build_draft(
    title: String,
    description: String,
    date: String,
    time: String,
    category: Option<String>,
) -> Result<TaskDraft, String> {
    let mut draft = TaskDraft::new(title, description, date, time);
    if let Some(label) = category {
        draft.category = Some(parse_category(&label).map_err(|err| err.to_string())?);
    }
    Ok(draft)
}

fn resolve_db_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| {
            std::env::var("MEMOMATE_DB_PATH")
                .ok()
                .filter(|raw| !raw.trim().is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| std::env::temp_dir().join("memomate.sqlite3"))
}

fn print_task(task: &Task) {
    println!(
        "#{} [{}] {} {} {} {}{}",
        task.id,
        if task.completed { "x" } else { " " },
        task.category,
        task.due_date,
        task.due_time,
        task.title,
        if task.description.is_empty() {
            String::new()
        } else {
            format!(" ({})", task.description)
        }
    );
}

fn format_delay(delay: Duration) -> String {
    let secs = delay.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
