//! `vpost flush` – upload every pending schedule right away, sequentially.

use anyhow::Result;
use vpost_core::config::VpostConfig;
use vpost_core::schedule_db::ScheduleDb;

use super::{build_worker, print_outcome};

pub async fn run_flush(db: &ScheduleDb, cfg: &VpostConfig) -> Result<()> {
    let pending = db.pending_schedules().await?;
    if pending.is_empty() {
        println!("No pending uploads.");
        return Ok(());
    }

    println!("Found {} pending upload(s)", pending.len());
    let worker = build_worker(db, cfg, false)?;
    for schedule in pending {
        println!("Uploading schedule {} ({})", schedule.id, schedule.description);
        match worker.process_schedule(schedule.id).await {
            Ok(outcome) => print_outcome(schedule.id, outcome),
            Err(e) => {
                tracing::warn!(schedule = schedule.id, "flush error: {:#}", e);
                println!("Schedule {}: error - {:#}", schedule.id, e);
            }
        }
    }
    println!("Done.");
    Ok(())
}
