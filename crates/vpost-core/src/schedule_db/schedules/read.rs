//! Schedule read operations: list, get (joined), due query.

use anyhow::Result;
use chrono::NaiveDateTime;
use sqlx::Row;

use super::super::db::ScheduleDb;
use super::super::types::{
    format_datetime, parse_datetime, ProfileRecord, ScheduleDetails, ScheduleId, ScheduleOverview,
    ScheduleRecord, ScheduleStatus, VideoRecord,
};

fn schedule_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ScheduleRecord> {
    let scheduled_time: String = row.get("scheduled_time");
    let uploaded_at: Option<String> = row.get("uploaded_at");
    let status: String = row.get("status");

    Ok(ScheduleRecord {
        id: row.get("id"),
        video_id: row.get("video_id"),
        profile_id: row.get("profile_id"),
        scheduled_time: parse_datetime(&scheduled_time)?,
        description: row.get("description"),
        status: ScheduleStatus::from_str(&status),
        uploaded_at: uploaded_at.as_deref().map(parse_datetime).transpose()?,
        error_message: row.get("error_message"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

impl ScheduleDb {
    /// All schedules joined with video filename and profile name, soonest first.
    pub async fn list_schedules(&self) -> Result<Vec<ScheduleOverview>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.scheduled_time, s.status, s.description, s.uploaded_at, s.error_message,
                   v.original_filename AS video_filename,
                   p.name AS profile_name
            FROM scheduled_uploads s
            LEFT JOIN videos v ON v.id = s.video_id
            LEFT JOIN profiles p ON p.id = s.profile_id
            ORDER BY s.scheduled_time ASC, s.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let scheduled_time: String = row.get("scheduled_time");
            let uploaded_at: Option<String> = row.get("uploaded_at");
            let status: String = row.get("status");
            out.push(ScheduleOverview {
                id: row.get("id"),
                scheduled_time: parse_datetime(&scheduled_time)?,
                status: ScheduleStatus::from_str(&status),
                description: row.get("description"),
                uploaded_at: uploaded_at.as_deref().map(parse_datetime).transpose()?,
                error_message: row.get("error_message"),
                video_filename: row.get("video_filename"),
                profile_name: row.get("profile_name"),
            });
        }
        Ok(out)
    }

    /// Fetch one schedule with its video and profile joined in. Dangling
    /// references come back as `None` rather than an error; the worker
    /// decides what a missing reference means.
    pub async fn get_schedule(&self, id: ScheduleId) -> Result<Option<ScheduleDetails>> {
        let row = sqlx::query(
            r#"
            SELECT s.id, s.video_id, s.profile_id, s.scheduled_time, s.description, s.status,
                   s.uploaded_at, s.error_message, s.created_at, s.updated_at,
                   v.id AS v_id, v.original_filename AS v_original_filename,
                   v.stored_filename AS v_stored_filename, v.file_path AS v_file_path,
                   v.description AS v_description, v.file_size AS v_file_size,
                   v.created_at AS v_created_at,
                   p.id AS p_id, p.name AS p_name, p.cookies_filename AS p_cookies_filename,
                   p.proxy AS p_proxy, p.is_active AS p_is_active, p.created_at AS p_created_at
            FROM scheduled_uploads s
            LEFT JOIN videos v ON v.id = s.video_id
            LEFT JOIN profiles p ON p.id = s.profile_id
            WHERE s.id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let schedule = schedule_from_row(&row)?;

        let video = row.get::<Option<i64>, _>("v_id").map(|vid| VideoRecord {
            id: vid,
            original_filename: row.get("v_original_filename"),
            stored_filename: row.get("v_stored_filename"),
            file_path: row.get("v_file_path"),
            description: row.get("v_description"),
            file_size: row.get("v_file_size"),
            created_at: row.get("v_created_at"),
        });

        let profile = row.get::<Option<i64>, _>("p_id").map(|pid| ProfileRecord {
            id: pid,
            name: row.get("p_name"),
            cookies_filename: row.get("p_cookies_filename"),
            proxy: row.get("p_proxy"),
            is_active: row.get::<i64, _>("p_is_active") != 0,
            created_at: row.get("p_created_at"),
        });

        Ok(Some(ScheduleDetails {
            schedule,
            video,
            profile,
        }))
    }

    /// Pending schedules whose target time has passed, soonest first.
    /// This is the poller's per-tick query.
    pub async fn due_schedules(&self, now: NaiveDateTime) -> Result<Vec<ScheduleRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, video_id, profile_id, scheduled_time, description, status,
                   uploaded_at, error_message, created_at, updated_at
            FROM scheduled_uploads
            WHERE status = 'pending' AND scheduled_time <= ?1
            ORDER BY scheduled_time ASC, id ASC
            "#,
        )
        .bind(format_datetime(now))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(schedule_from_row).collect()
    }

    /// All pending schedules regardless of target time (for `vpost flush`).
    pub async fn pending_schedules(&self) -> Result<Vec<ScheduleRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, video_id, profile_id, scheduled_time, description, status,
                   uploaded_at, error_message, created_at, updated_at
            FROM scheduled_uploads
            WHERE status = 'pending'
            ORDER BY scheduled_time ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(schedule_from_row).collect()
    }
}
