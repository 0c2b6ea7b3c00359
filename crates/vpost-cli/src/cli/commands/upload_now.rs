//! `vpost upload-now` – post a pending schedule immediately.

use anyhow::{bail, Result};
use vpost_core::config::VpostConfig;
use vpost_core::schedule_db::{ScheduleDb, ScheduleId, ScheduleStatus};

use super::trigger_immediately;

pub async fn run_upload_now(db: &ScheduleDb, cfg: &VpostConfig, id: ScheduleId) -> Result<()> {
    let Some(detail) = db.get_schedule(id).await? else {
        bail!("no schedule with id {}", id);
    };
    if detail.schedule.status != ScheduleStatus::Pending {
        bail!(
            "schedule {} is {}, only pending schedules can be uploaded now",
            id,
            detail.schedule.status
        );
    }

    trigger_immediately(db, cfg, id).await
}
