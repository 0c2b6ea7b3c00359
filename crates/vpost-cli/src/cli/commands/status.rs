//! `vpost status` – show all scheduled uploads.

use anyhow::Result;
use vpost_core::schedule_db::{ScheduleDb, ScheduleStatus};

pub async fn run_status(db: &ScheduleDb) -> Result<()> {
    let schedules = db.list_schedules().await?;
    if schedules.is_empty() {
        println!("No scheduled uploads.");
        return Ok(());
    }

    println!(
        "{:<6} {:<18} {:<10} {:<24} {:<14} {}",
        "ID", "TIME", "STATUS", "VIDEO", "PROFILE", "DETAIL"
    );
    for s in schedules {
        let detail = match s.status {
            ScheduleStatus::Completed => match (&s.error_message, s.uploaded_at) {
                // Inferred successes keep their advisory note visible.
                (Some(note), _) => note.clone(),
                (None, Some(at)) => format!("uploaded {}", at.format("%Y-%m-%d %H:%M")),
                (None, None) => "-".to_string(),
            },
            _ => s.error_message.clone().unwrap_or_else(|| "-".to_string()),
        };
        println!(
            "{:<6} {:<18} {:<10} {:<24} {:<14} {}",
            s.id,
            s.scheduled_time.format("%Y-%m-%d %H:%M").to_string(),
            s.status.to_string(),
            s.video_filename.as_deref().unwrap_or("?"),
            s.profile_name.as_deref().unwrap_or("?"),
            detail
        );
    }
    Ok(())
}
