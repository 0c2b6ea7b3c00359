//! `vpost cancel` – cancel a pending schedule.

use anyhow::{bail, Result};
use vpost_core::schedule_db::{ScheduleDb, ScheduleId};

pub async fn run_cancel(db: &ScheduleDb, id: ScheduleId) -> Result<()> {
    if db.cancel_schedule(id).await? {
        println!("Schedule {} cancelled.", id);
        Ok(())
    } else {
        bail!("schedule {} not found or no longer pending", id)
    }
}
