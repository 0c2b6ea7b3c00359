//! Immediate-trigger queue: out-of-band uploads without waiting for a tick.
//!
//! "Post now" requests and schedules created inside the immediate horizon
//! land here. A single drainer task runs them one at a time through the
//! same worker the poller uses, so an immediate trigger racing a poll tick
//! on the same schedule is settled by the claim, and a burst of triggers
//! is bounded by the queue instead of spawning a task per request.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::schedule_db::ScheduleId;
use crate::worker::UploadWorker;

/// Default path for the control socket a running scheduler listens on
/// (same XDG state dir as the DB). Other vpost processes write
/// "upload <id>" lines there to feed the trigger queue.
pub fn default_control_socket_path() -> Result<PathBuf> {
    let dir = xdg::BaseDirectories::with_prefix("vpost")?.get_state_home();
    Ok(dir.join("control.sock"))
}

#[derive(Clone)]
pub struct TriggerQueue {
    tx: mpsc::Sender<ScheduleId>,
}

impl TriggerQueue {
    /// Start the drainer task. The handle finishes when every `TriggerQueue`
    /// clone has been dropped.
    pub fn spawn(worker: Arc<UploadWorker>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(async move {
            while let Some(id) = rx.recv().await {
                match worker.process_schedule(id).await {
                    Ok(outcome) => {
                        tracing::info!(schedule = id, %outcome, "immediate upload finished");
                    }
                    Err(e) => {
                        tracing::warn!(schedule = id, "immediate upload error: {:#}", e);
                    }
                }
            }
        });
        (Self { tx }, handle)
    }

    /// Enqueue an immediate upload. Returns false when the queue is full;
    /// the schedule is not lost, the poller will pick it up when due.
    pub fn request(&self, id: ScheduleId) -> bool {
        match self.tx.try_send(id) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(schedule = id, "trigger queue full, leaving to the poller");
                false
            }
        }
    }
}
