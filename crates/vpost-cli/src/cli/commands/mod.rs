//! One module per subcommand, plus shared worker construction.

mod cancel;
mod edit;
mod flush;
mod profiles;
mod run;
mod schedule;
mod status;
mod upload_now;
mod videos;

pub use cancel::run_cancel;
pub use edit::run_edit;
pub use flush::run_flush;
pub use profiles::{run_add_profile, run_profiles, run_remove_profile};
pub use run::run_scheduler;
pub use schedule::run_schedule;
pub use status::run_status;
pub use upload_now::run_upload_now;
pub use videos::{run_add_video, run_remove_video, run_videos};

use anyhow::Result;
use std::sync::Arc;

use vpost_core::config::VpostConfig;
use vpost_core::driver::ProcessDriver;
use vpost_core::retry::OutcomeClassifier;
use vpost_core::schedule_db::{ScheduleDb, ScheduleId};
use vpost_core::trigger::default_control_socket_path;
use vpost_core::worker::{RunOutcome, UploadWorker};

use crate::cli::control_socket;

/// Worker wired up from config: process driver with slow floors applied,
/// platform classifier, configured retry budget.
pub(crate) fn build_worker(
    db: &ScheduleDb,
    cfg: &VpostConfig,
    headless: bool,
) -> Result<Arc<UploadWorker>> {
    let mut driver_cfg = cfg.driver_config().with_slow_floors();
    if headless {
        driver_cfg.headless = true;
    }
    Ok(Arc::new(UploadWorker::new(
        db.clone(),
        Arc::new(ProcessDriver::new(driver_cfg)),
        OutcomeClassifier::platform_defaults(),
        cfg.retry_policy(),
        cfg.cookies_dir()?,
    )))
}

pub(crate) fn print_outcome(id: ScheduleId, outcome: RunOutcome) {
    match outcome {
        RunOutcome::Uploaded => println!("Schedule {}: uploaded.", id),
        RunOutcome::Failed => {
            println!("Schedule {}: failed - run `vpost status` for the error.", id);
        }
        RunOutcome::Skipped(reason) => println!("Schedule {}: skipped ({}).", id, reason),
    }
}

/// Upload a schedule out-of-band: hand it to a running scheduler over the
/// control socket when one is live, otherwise drive it from this process.
pub(crate) async fn trigger_immediately(
    db: &ScheduleDb,
    cfg: &VpostConfig,
    id: ScheduleId,
) -> Result<()> {
    if let Ok(socket_path) = default_control_socket_path() {
        if control_socket::send_upload_request(&socket_path, id).await {
            println!("Schedule {}: handed to the running scheduler.", id);
            return Ok(());
        }
    }

    let worker = build_worker(db, cfg, false)?;
    let outcome = worker.process_schedule(id).await?;
    print_outcome(id, outcome);
    Ok(())
}
