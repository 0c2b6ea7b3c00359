//! `vpost run` – run the scheduler loop processing due uploads.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use vpost_core::config::VpostConfig;
use vpost_core::poller::Poller;
use vpost_core::schedule_db::ScheduleDb;
use vpost_core::trigger::{default_control_socket_path, TriggerQueue};

use super::build_worker;
use crate::cli::control_socket;

pub async fn run_scheduler(db: &ScheduleDb, cfg: &VpostConfig, headless: bool) -> Result<()> {
    // Uploads interrupted by a crash are not retried automatically: the
    // attempt may have posted before dying. Surface them as failed instead.
    let interrupted = db.recover_interrupted().await?;
    if interrupted > 0 {
        tracing::warn!(
            "{} upload(s) interrupted by a previous run were marked failed - verify manually",
            interrupted
        );
    }

    let worker = build_worker(db, cfg, headless)?;
    let (trigger, _drainer) = TriggerQueue::spawn(Arc::clone(&worker), cfg.trigger_queue_capacity);

    match default_control_socket_path() {
        Ok(socket_path) => {
            if control_socket::spawn_control_listener(trigger.clone(), &socket_path).is_ok() {
                tracing::debug!(path = %socket_path.display(), "control socket listening");
            }
        }
        Err(e) => tracing::debug!("control socket unavailable: {:#}", e),
    }

    println!(
        "Scheduler started - checking every {} seconds (ctrl-c to stop)",
        cfg.poll_interval_secs
    );
    let poller = Poller::new(worker, Duration::from_secs(cfg.poll_interval_secs));
    poller.run().await;
    Ok(())
}
