//! `vpost edit` – change a pending schedule's target time or caption.

use anyhow::{bail, Result};
use vpost_core::schedule_db::{local_now, ScheduleDb, ScheduleId};

use super::schedule::parse_schedule_time;

pub async fn run_edit(
    db: &ScheduleDb,
    id: ScheduleId,
    time: Option<&str>,
    description: Option<&str>,
) -> Result<()> {
    if time.is_none() && description.is_none() {
        bail!("nothing to change: pass --time and/or --description");
    }

    let new_time = time.map(parse_schedule_time).transpose()?;
    if let Some(t) = new_time {
        if t <= local_now() {
            bail!("scheduled time must be in the future");
        }
    }

    if db.update_schedule(id, new_time, description).await? {
        println!("Schedule {} updated.", id);
        Ok(())
    } else {
        bail!("schedule {} not found or no longer pending", id)
    }
}
