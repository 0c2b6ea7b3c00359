//! `vpost schedule` – create a schedule; near-term targets upload right away.

use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDateTime};
use vpost_core::config::VpostConfig;
use vpost_core::schedule_db::{local_now, ProfileId, ScheduleDb, VideoId};

use super::trigger_immediately;

const TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a user-supplied target time. Naive local wall-clock, no timezone:
/// what the user types is what the poller compares against.
pub(crate) fn parse_schedule_time(s: &str) -> Result<NaiveDateTime> {
    for fmt in TIME_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(t);
        }
    }
    bail!("could not parse time {:?} (expected e.g. \"2026-08-06 18:30\")", s)
}

pub async fn run_schedule(
    db: &ScheduleDb,
    cfg: &VpostConfig,
    video_id: VideoId,
    profile_id: ProfileId,
    time: &str,
    description: Option<String>,
    now: bool,
) -> Result<()> {
    let video = db
        .get_video(video_id)
        .await?
        .with_context(|| format!("no video with id {}", video_id))?;
    let profile = db
        .get_profile(profile_id)
        .await?
        .with_context(|| format!("no profile with id {}", profile_id))?;

    let scheduled_time = parse_schedule_time(time)?;
    let description = description
        .or_else(|| video.description.clone())
        .unwrap_or_else(|| format!("Video: {}", video.original_filename));

    let id = db
        .add_schedule(video_id, profile_id, scheduled_time, &description)
        .await?;
    println!(
        "Scheduled upload {} of {} via {} at {}",
        id,
        video.original_filename,
        profile.name,
        scheduled_time.format("%Y-%m-%d %H:%M:%S")
    );

    // Targets inside the horizon would otherwise sit a full poll period
    // past their time; hand them to the trigger path instead.
    let horizon = Duration::seconds(cfg.immediate_horizon_secs as i64);
    if now || scheduled_time <= local_now() + horizon {
        trigger_immediately(db, cfg, id).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_time_formats() {
        for s in [
            "2026-08-06T18:30:00",
            "2026-08-06T18:30",
            "2026-08-06 18:30:00",
            "2026-08-06 18:30",
        ] {
            let t = parse_schedule_time(s).unwrap();
            assert_eq!(t.format("%Y-%m-%d %H:%M").to_string(), "2026-08-06 18:30");
        }
    }

    #[test]
    fn rejects_garbage_and_date_only() {
        assert!(parse_schedule_time("tomorrow").is_err());
        assert!(parse_schedule_time("2026-08-06").is_err());
        assert!(parse_schedule_time("18:30").is_err());
    }
}
