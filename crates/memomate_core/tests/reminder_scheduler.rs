use memomate_core::{
    DeferredJobHost, Notification, ReminderPayload, ReminderScheduler, Task, TaskDraft,
    TokioJobHost, NOTIFICATION_TITLE,
};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::Instant;

fn host() -> (TokioJobHost, UnboundedReceiver<Notification>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TokioJobHost::new(Handle::current(), tx), rx)
}

fn payload(name: &str) -> ReminderPayload {
    ReminderPayload {
        task_id: None,
        name: name.to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn job_fires_once_and_not_before_its_delay() {
    let (host, mut rx) = host();
    let started = Instant::now();

    host.schedule_once("name:Buy milk", Duration::from_secs(90), payload("Buy milk"));
    assert_eq!(host.pending_keys(), vec!["name:Buy milk".to_string()]);

    let notification = rx.recv().await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(90));
    assert_eq!(notification.title, NOTIFICATION_TITLE);
    assert_eq!(notification.body, "Time to do Buy milk");
    assert_eq!(notification.key, "name:Buy milk");
    assert_eq!(host.pending_count(), 0);

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn scheduling_same_key_twice_keeps_one_job_and_second_wins() {
    let (host, mut rx) = host();

    host.schedule_once("k", Duration::from_secs(10), payload("first"));
    host.schedule_once("k", Duration::from_secs(30), payload("second"));
    assert_eq!(host.pending_count(), 1);

    let started = Instant::now();
    let notification = rx.recv().await.unwrap();
    assert_eq!(notification.body, "Time to do second");
    assert!(started.elapsed() >= Duration::from_secs(30));

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(host.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancel_drops_pending_job_and_is_noop_for_unknown_keys() {
    let (host, mut rx) = host();

    host.schedule_once("k", Duration::from_secs(5), payload("cancelled"));
    host.cancel("k");
    host.cancel("k");
    host.cancel("never-scheduled");
    assert!(!host.is_pending("k"));

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn zero_delay_fires_immediately() {
    let (host, mut rx) = host();

    host.schedule_once("now", Duration::ZERO, payload("right away"));
    let notification = rx.recv().await.unwrap();
    assert_eq!(notification.body, "Time to do right away");
}

#[tokio::test(start_paused = true)]
async fn tasks_with_same_title_keep_separate_reminders() {
    let (host, mut rx) = host();
    let scheduler = ReminderScheduler::new(&host);
    let draft = TaskDraft::new("Stand-up", "", "Jan 05, 2025", "09:00 AM");
    let first = Task::from_draft(1, &draft, "Jan 01, 2025");
    let second = Task::from_draft(2, &draft, "Jan 01, 2025");

    scheduler.schedule(&first, Duration::from_secs(5));
    scheduler.schedule(&second, Duration::from_secs(10));
    assert_eq!(host.pending_count(), 2);

    let mut fired = vec![
        rx.recv().await.unwrap().task_id,
        rx.recv().await.unwrap().task_id,
    ];
    fired.sort();
    assert_eq!(fired, vec![Some(1), Some(2)]);
}

#[tokio::test(start_paused = true)]
async fn named_reminders_collide_on_purpose() {
    let (host, mut rx) = host();
    let scheduler = ReminderScheduler::new(&host);

    scheduler.schedule_named("Stand-up", Duration::from_secs(5));
    scheduler.schedule_named("Stand-up", Duration::from_secs(20));
    assert_eq!(host.pending_count(), 1);

    scheduler.cancel_named("Stand-up");
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn closed_receiver_does_not_break_the_host() {
    let (host, rx) = host();
    drop(rx);

    host.schedule_once("k", Duration::from_secs(1), payload("nobody listens"));
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(host.pending_count(), 0);
}
