//! Integration test: schedule lifecycle end to end against an on-disk DB.
//!
//! Seeds a profile, a video, and schedules; runs poller ticks with a
//! scripted driver; asserts status transitions and that only due work runs.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use tempfile::tempdir;

use common::SequenceDriver;
use vpost_core::driver::{UploadDriver, UploadOutcome};
use vpost_core::poller::Poller;
use vpost_core::retry::{OutcomeClassifier, RetryPolicy};
use vpost_core::schedule_db::{local_now, ScheduleDb, ScheduleStatus};
use vpost_core::worker::UploadWorker;

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        retry_delay: Duration::from_millis(2),
        initial_delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn due_schedule_completes_and_future_one_waits() {
    let state = tempdir().unwrap();
    let db = ScheduleDb::open_at(state.path().join("vpost.db")).await.unwrap();

    let cookies = tempdir().unwrap();
    std::fs::write(cookies.path().join("acct.txt"), "session-cookies").unwrap();
    let profile = db.add_profile("acct", "acct.txt", None).await.unwrap();

    let clips = tempdir().unwrap();
    let clip_path = clips.path().join("stored.mp4");
    std::fs::write(&clip_path, b"not really a video").unwrap();
    let video = db
        .add_video(
            "clip.mp4",
            "stored.mp4",
            &clip_path.to_string_lossy(),
            Some("default caption"),
            18,
        )
        .await
        .unwrap();

    let now = local_now();
    let due = db
        .add_schedule(video, profile, now - ChronoDuration::minutes(2), "post this")
        .await
        .unwrap();
    let future = db
        .add_schedule(video, profile, now + ChronoDuration::hours(4), "post later")
        .await
        .unwrap();

    let driver = SequenceDriver::new(vec![UploadOutcome::Posted]);
    let worker = Arc::new(UploadWorker::new(
        db.clone(),
        Arc::clone(&driver) as Arc<dyn UploadDriver>,
        OutcomeClassifier::platform_defaults(),
        fast_policy(),
        cookies.path().to_path_buf(),
    ));
    let poller = Poller::new(worker, Duration::from_secs(60));

    assert_eq!(poller.tick().await.unwrap(), 1);
    assert_eq!(driver.calls(), 1);

    let s = db.get_schedule(due).await.unwrap().unwrap().schedule;
    assert_eq!(s.status, ScheduleStatus::Completed);
    assert!(s.uploaded_at.is_some());
    assert!(s.error_message.is_none());

    let s = db.get_schedule(future).await.unwrap().unwrap().schedule;
    assert_eq!(s.status, ScheduleStatus::Pending);
    assert!(s.uploaded_at.is_none());

    // Completed work is not rediscovered.
    assert_eq!(poller.tick().await.unwrap(), 0);
    assert_eq!(driver.calls(), 1);
}

#[tokio::test]
async fn exhausted_retries_leave_inspectable_failure() {
    let state = tempdir().unwrap();
    let db = ScheduleDb::open_at(state.path().join("vpost.db")).await.unwrap();

    let cookies = tempdir().unwrap();
    std::fs::write(cookies.path().join("acct.txt"), "session-cookies").unwrap();
    let profile = db.add_profile("acct", "acct.txt", None).await.unwrap();
    let video = db
        .add_video("clip.mp4", "stored.mp4", "/tmp/stored.mp4", None, 0)
        .await
        .unwrap();
    let id = db
        .add_schedule(video, profile, local_now() - ChronoDuration::minutes(1), "caption")
        .await
        .unwrap();

    let driver = SequenceDriver::new(vec![
        UploadOutcome::Rejected("captcha wall".to_string()),
        UploadOutcome::Rejected("captcha wall".to_string()),
        UploadOutcome::Rejected("captcha wall".to_string()),
    ]);
    let worker = Arc::new(UploadWorker::new(
        db.clone(),
        Arc::clone(&driver) as Arc<dyn UploadDriver>,
        OutcomeClassifier::platform_defaults(),
        fast_policy(),
        cookies.path().to_path_buf(),
    ));
    let poller = Poller::new(worker, Duration::from_secs(60));

    assert_eq!(poller.tick().await.unwrap(), 1);
    assert_eq!(driver.calls(), 3);

    let s = db.get_schedule(id).await.unwrap().unwrap().schedule;
    assert_eq!(s.status, ScheduleStatus::Failed);
    assert!(s.uploaded_at.is_none());
    assert_eq!(s.error_message.as_deref(), Some("attempt 3 failed: captcha wall"));

    // Failed is terminal: the poller leaves the row alone afterwards.
    assert_eq!(poller.tick().await.unwrap(), 0);
    assert_eq!(driver.calls(), 3);
}
