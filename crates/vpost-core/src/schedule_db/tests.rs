//! Tests for schedule_db (use the in-memory DB helper from db).

use chrono::Duration;

use crate::schedule_db::db::open_memory;
use crate::schedule_db::{local_now, ScheduleDb, ScheduleStatus, INTERRUPTED_MESSAGE};

async fn seed_schedule(db: &ScheduleDb) -> i64 {
    let profile = db.add_profile("acct", "acct.txt", None).await.unwrap();
    let video = db
        .add_video("clip.mp4", "stored.mp4", "/tmp/stored.mp4", Some("a clip"), 1024)
        .await
        .unwrap();
    db.add_schedule(video, profile, local_now() - Duration::minutes(1), "caption")
        .await
        .unwrap()
}

#[tokio::test]
async fn schedule_roundtrip_via_db() {
    let db = open_memory().await.unwrap();
    let id = seed_schedule(&db).await;

    let detail = db.get_schedule(id).await.unwrap().expect("schedule exists");
    assert_eq!(detail.schedule.id, id);
    assert_eq!(detail.schedule.status, ScheduleStatus::Pending);
    assert_eq!(detail.schedule.description, "caption");
    assert!(detail.schedule.uploaded_at.is_none());
    assert!(detail.schedule.error_message.is_none());

    let video = detail.video.expect("video joined");
    assert_eq!(video.original_filename, "clip.mp4");
    let profile = detail.profile.expect("profile joined");
    assert_eq!(profile.name, "acct");
    assert!(profile.is_active);
}

#[tokio::test]
async fn claim_pending_wins_exactly_once() {
    let db = open_memory().await.unwrap();
    let id = seed_schedule(&db).await;

    assert!(db.claim_pending(id).await.unwrap());
    // Second claim loses: the row is already uploading.
    assert!(!db.claim_pending(id).await.unwrap());

    let detail = db.get_schedule(id).await.unwrap().unwrap();
    assert_eq!(detail.schedule.status, ScheduleStatus::Uploading);
}

#[tokio::test]
async fn claim_pending_rejects_terminal_rows() {
    let db = open_memory().await.unwrap();
    let id = seed_schedule(&db).await;

    db.claim_pending(id).await.unwrap();
    db.mark_failed(id, "attempt 3 failed: boom").await.unwrap();
    assert!(!db.claim_pending(id).await.unwrap());

    assert!(!db.claim_pending(9999).await.unwrap());
}

#[tokio::test]
async fn uploaded_at_set_only_on_completion() {
    let db = open_memory().await.unwrap();
    let id = seed_schedule(&db).await;

    db.claim_pending(id).await.unwrap();
    db.set_error_message(id, "attempt 1 failed: nope").await.unwrap();
    let s = db.get_schedule(id).await.unwrap().unwrap().schedule;
    assert!(s.uploaded_at.is_none());
    assert_eq!(s.error_message.as_deref(), Some("attempt 1 failed: nope"));

    db.mark_completed(id, None).await.unwrap();
    let s = db.get_schedule(id).await.unwrap().unwrap().schedule;
    assert_eq!(s.status, ScheduleStatus::Completed);
    assert!(s.uploaded_at.is_some());
    // Success clears the per-attempt diagnostic.
    assert!(s.error_message.is_none());
}

#[tokio::test]
async fn mark_completed_can_keep_advisory_note() {
    let db = open_memory().await.unwrap();
    let id = seed_schedule(&db).await;

    db.claim_pending(id).await.unwrap();
    db.mark_completed(id, Some("Completed (timeout - verify manually)"))
        .await
        .unwrap();
    let s = db.get_schedule(id).await.unwrap().unwrap().schedule;
    assert_eq!(s.status, ScheduleStatus::Completed);
    assert!(s.uploaded_at.is_some());
    assert_eq!(
        s.error_message.as_deref(),
        Some("Completed (timeout - verify manually)")
    );
}

#[tokio::test]
async fn edits_rejected_unless_pending() {
    let db = open_memory().await.unwrap();
    let id = seed_schedule(&db).await;

    let new_time = local_now() + Duration::hours(1);
    assert!(db
        .update_schedule(id, Some(new_time), Some("new caption"))
        .await
        .unwrap());
    let s = db.get_schedule(id).await.unwrap().unwrap().schedule;
    assert_eq!(s.description, "new caption");
    assert_eq!(
        s.scheduled_time.format("%Y-%m-%dT%H:%M:%S").to_string(),
        new_time.format("%Y-%m-%dT%H:%M:%S").to_string()
    );

    db.claim_pending(id).await.unwrap();
    assert!(!db.update_schedule(id, None, Some("too late")).await.unwrap());
    db.mark_completed(id, None).await.unwrap();
    assert!(!db.update_schedule(id, None, Some("too late")).await.unwrap());
    let s = db.get_schedule(id).await.unwrap().unwrap().schedule;
    assert_eq!(s.description, "new caption");
}

#[tokio::test]
async fn cancel_only_pending() {
    let db = open_memory().await.unwrap();
    let id = seed_schedule(&db).await;

    assert!(db.cancel_schedule(id).await.unwrap());
    let s = db.get_schedule(id).await.unwrap().unwrap().schedule;
    assert_eq!(s.status, ScheduleStatus::Cancelled);

    // Cancelled is terminal: a second cancel and a claim both fail.
    assert!(!db.cancel_schedule(id).await.unwrap());
    assert!(!db.claim_pending(id).await.unwrap());
}

#[tokio::test]
async fn due_query_skips_future_and_non_pending() {
    let db = open_memory().await.unwrap();
    let profile = db.add_profile("acct", "acct.txt", None).await.unwrap();
    let video = db
        .add_video("clip.mp4", "stored.mp4", "/tmp/stored.mp4", None, 0)
        .await
        .unwrap();

    let now = local_now();
    let due = db
        .add_schedule(video, profile, now - Duration::minutes(5), "due")
        .await
        .unwrap();
    let future = db
        .add_schedule(video, profile, now + Duration::hours(2), "future")
        .await
        .unwrap();
    let cancelled = db
        .add_schedule(video, profile, now - Duration::minutes(5), "cancelled")
        .await
        .unwrap();
    db.cancel_schedule(cancelled).await.unwrap();

    let found = db.due_schedules(now).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, due);

    // flush sees every pending row, including the future one.
    let pending: Vec<i64> = db
        .pending_schedules()
        .await
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(pending, vec![due, future]);
}

#[tokio::test]
async fn recover_interrupted_marks_failed() {
    let db = open_memory().await.unwrap();
    let id = seed_schedule(&db).await;

    db.claim_pending(id).await.unwrap();
    let n = db.recover_interrupted().await.unwrap();
    assert_eq!(n, 1);

    let s = db.get_schedule(id).await.unwrap().unwrap().schedule;
    assert_eq!(s.status, ScheduleStatus::Failed);
    assert_eq!(s.error_message.as_deref(), Some(INTERRUPTED_MESSAGE));
    assert!(s.uploaded_at.is_none());

    // Idempotent on a second pass.
    assert_eq!(db.recover_interrupted().await.unwrap(), 0);
}

#[tokio::test]
async fn profile_with_active_schedules_cannot_be_removed() {
    let db = open_memory().await.unwrap();
    let profile = db.add_profile("acct", "acct.txt", Some("http://proxy:8080")).await.unwrap();
    let video = db
        .add_video("clip.mp4", "stored.mp4", "/tmp/stored.mp4", None, 0)
        .await
        .unwrap();
    let id = db
        .add_schedule(video, profile, local_now() + Duration::hours(1), "caption")
        .await
        .unwrap();

    assert!(db.remove_profile(profile).await.is_err());
    assert!(db.remove_video(video).await.is_err());

    db.cancel_schedule(id).await.unwrap();
    db.remove_profile(profile).await.unwrap();
    let removed = db.remove_video(video).await.unwrap();
    assert_eq!(removed.stored_filename, "stored.mp4");
    assert!(db.list_profiles().await.unwrap().is_empty());
    assert!(db.list_videos().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_schedules_joins_names() {
    let db = open_memory().await.unwrap();
    let id = seed_schedule(&db).await;

    let all = db.list_schedules().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, id);
    assert_eq!(all[0].video_filename.as_deref(), Some("clip.mp4"));
    assert_eq!(all[0].profile_name.as_deref(), Some("acct"));
    assert_eq!(all[0].status, ScheduleStatus::Pending);
}
