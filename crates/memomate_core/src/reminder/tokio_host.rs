//! In-process deferred job host backed by tokio timers.
//!
//! # Responsibility
//! - Run each reminder as a spawned task that sleeps, then sends one
//!   notification on an mpsc channel.
//! - Track pending jobs by key for replace and cancel.
//!
//! # Invariants
//! - The pending map holds at most one job per key.
//! - A fired job removes its own entry only while it is still the current
//!   generation for that key; a replaced job never sends.

use crate::reminder::scheduler::{DeferredJobHost, Notification, ReminderPayload};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

type JobMap = HashMap<String, PendingJob>;

struct PendingJob {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Timer-service host for reminder jobs.
pub struct TokioJobHost {
    runtime: Handle,
    notifications: UnboundedSender<Notification>,
    jobs: Arc<Mutex<JobMap>>,
    next_generation: AtomicU64,
}

impl TokioJobHost {
    /// Creates a host spawning jobs on `runtime` and delivering fired
    /// notifications to `notifications`.
    pub fn new(runtime: Handle, notifications: UnboundedSender<Notification>) -> Self {
        Self {
            runtime,
            notifications,
            jobs: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Number of jobs that have neither fired nor been cancelled.
    pub fn pending_count(&self) -> usize {
        lock_jobs(&self.jobs).len()
    }

    /// Keys of pending jobs, sorted.
    pub fn pending_keys(&self) -> Vec<String> {
        let mut keys = lock_jobs(&self.jobs).keys().cloned().collect::<Vec<_>>();
        keys.sort();
        keys
    }

    pub fn is_pending(&self, key: &str) -> bool {
        lock_jobs(&self.jobs).contains_key(key)
    }
}

impl DeferredJobHost for TokioJobHost {
    fn schedule_once(&self, key: &str, delay: Duration, payload: ReminderPayload) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let jobs = Arc::clone(&self.jobs);
        let sender = self.notifications.clone();
        let job_key = key.to_string();

        // Held across spawn so the job cannot look itself up before insert.
        let mut pending = lock_jobs(&self.jobs);
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            {
                let mut jobs = lock_jobs(&jobs);
                match jobs.get(&job_key) {
                    Some(job) if job.generation == generation => {
                        jobs.remove(&job_key);
                    }
                    _ => return,
                }
            }

            let notification = Notification::for_payload(&job_key, &payload);
            if sender.send(notification).is_err() {
                warn!(
                    "event=reminder_fire module=reminder status=error key={job_key} error_code=receiver_closed"
                );
                return;
            }
            debug!("event=reminder_fire module=reminder status=ok key={job_key}");
        });

        if let Some(previous) = pending.insert(key.to_string(), PendingJob { generation, handle }) {
            previous.handle.abort();
            debug!("event=reminder_replace module=reminder status=ok key={key}");
        }
    }

    fn cancel(&self, key: &str) {
        if let Some(job) = lock_jobs(&self.jobs).remove(key) {
            job.handle.abort();
        }
    }
}

fn lock_jobs(jobs: &Mutex<JobMap>) -> MutexGuard<'_, JobMap> {
    jobs.lock().unwrap_or_else(PoisonError::into_inner)
}
