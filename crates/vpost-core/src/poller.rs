//! Due-work poller: a fixed-period loop that hands due schedules to the worker.
//!
//! Schedules are processed one at a time so concurrent automation sessions
//! never contend for the same browser or profile; throughput is bounded by
//! how many uploads can realistically come due within one period.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::schedule_db::local_now;
use crate::worker::UploadWorker;

pub struct Poller {
    worker: Arc<UploadWorker>,
    interval: Duration,
}

impl Poller {
    pub fn new(worker: Arc<UploadWorker>, interval: Duration) -> Self {
        Self { worker, interval }
    }

    /// One polling pass: snapshot "now", fetch due schedules, run each
    /// sequentially. A failing schedule is logged and never aborts the
    /// tick. Returns how many schedules were handed to the worker.
    pub async fn tick(&self) -> Result<usize> {
        let now = local_now();
        let due = self.worker.db().due_schedules(now).await?;
        if due.is_empty() {
            return Ok(0);
        }

        tracing::info!(count = due.len(), "found due upload(s)");
        let mut processed = 0;
        for schedule in due {
            match self.worker.process_schedule(schedule.id).await {
                Ok(outcome) => {
                    tracing::info!(schedule = schedule.id, %outcome, "due upload finished");
                    processed += 1;
                }
                Err(e) => {
                    tracing::warn!(schedule = schedule.id, "due upload error: {:#}", e);
                }
            }
        }
        Ok(processed)
    }

    /// Run forever: tick, swallow-and-log any tick error, sleep the period.
    pub async fn run(&self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "poller started");
        loop {
            if let Err(e) = self.tick().await {
                tracing::warn!("poll tick error: {:#}", e);
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}
