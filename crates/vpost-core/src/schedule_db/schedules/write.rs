//! Schedule write operations: add, claim, status transitions, edit, cancel.

use anyhow::Result;
use chrono::NaiveDateTime;

use super::super::db::{unix_timestamp, ScheduleDb};
use super::super::types::{format_datetime, local_now, ProfileId, ScheduleId, VideoId};

/// Error note left on schedules found mid-upload at startup.
pub const INTERRUPTED_MESSAGE: &str = "interrupted before completion - verify manually";

impl ScheduleDb {
    /// Insert a new pending schedule.
    pub async fn add_schedule(
        &self,
        video_id: VideoId,
        profile_id: ProfileId,
        scheduled_time: NaiveDateTime,
        description: &str,
    ) -> Result<ScheduleId> {
        let now = unix_timestamp();
        let row_id = sqlx::query(
            r#"
            INSERT INTO scheduled_uploads (
                video_id, profile_id, scheduled_time, description,
                status, uploaded_at, error_message, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, 'pending', NULL, NULL, ?5, ?6)
            "#,
        )
        .bind(video_id)
        .bind(profile_id)
        .bind(format_datetime(scheduled_time))
        .bind(description)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(row_id)
    }

    /// Atomically claim a pending schedule for upload: `pending -> uploading`
    /// succeeds for exactly one caller. Returns false when the row is absent
    /// or in any other status, so a poller tick and an immediate trigger
    /// racing on the same id never both run the driver.
    pub async fn claim_pending(&self, id: ScheduleId) -> Result<bool> {
        let now = unix_timestamp();
        let r = sqlx::query(
            r#"
            UPDATE scheduled_uploads
            SET status = 'uploading',
                updated_at = ?1
            WHERE id = ?2 AND status = 'pending'
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(r.rows_affected() == 1)
    }

    /// Terminal success: stamps `uploaded_at` and replaces the error message
    /// with `note` (None clears it; inferred successes leave an advisory).
    pub async fn mark_completed(&self, id: ScheduleId, note: Option<&str>) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            UPDATE scheduled_uploads
            SET status = 'completed',
                uploaded_at = ?1,
                error_message = ?2,
                updated_at = ?3
            WHERE id = ?4
            "#,
        )
        .bind(format_datetime(local_now()))
        .bind(note)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Terminal failure with a diagnostic message.
    pub async fn mark_failed(&self, id: ScheduleId, message: &str) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            UPDATE scheduled_uploads
            SET status = 'failed',
                error_message = ?1,
                updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(message)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Record a per-attempt diagnostic without changing status, so an
    /// in-flight retry sequence is observable (and survives a crash).
    pub async fn set_error_message(&self, id: ScheduleId, message: &str) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            UPDATE scheduled_uploads
            SET error_message = ?1,
                updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(message)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Edit target time and/or caption. Guarded on `status = 'pending'`;
    /// returns false when the row is absent or no longer editable.
    pub async fn update_schedule(
        &self,
        id: ScheduleId,
        scheduled_time: Option<NaiveDateTime>,
        description: Option<&str>,
    ) -> Result<bool> {
        let now = unix_timestamp();
        let r = sqlx::query(
            r#"
            UPDATE scheduled_uploads
            SET scheduled_time = COALESCE(?1, scheduled_time),
                description = COALESCE(?2, description),
                updated_at = ?3
            WHERE id = ?4 AND status = 'pending'
            "#,
        )
        .bind(scheduled_time.map(format_datetime))
        .bind(description)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(r.rows_affected() == 1)
    }

    /// Cancel a schedule. Only pending rows can be cancelled; returns false
    /// when the row is absent or already past pending.
    pub async fn cancel_schedule(&self, id: ScheduleId) -> Result<bool> {
        let now = unix_timestamp();
        let r = sqlx::query(
            r#"
            UPDATE scheduled_uploads
            SET status = 'cancelled',
                updated_at = ?1
            WHERE id = ?2 AND status = 'pending'
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(r.rows_affected() == 1)
    }

    /// Mark any schedule left in `uploading` by a crashed run as failed.
    /// Call before starting the poller. The rows are not re-queued: the
    /// interrupted attempt may in fact have posted, so a human has to check.
    /// Returns the number of rows touched.
    pub async fn recover_interrupted(&self) -> Result<u64> {
        let now = unix_timestamp();
        let r = sqlx::query(
            r#"
            UPDATE scheduled_uploads
            SET status = 'failed',
                error_message = ?1,
                updated_at = ?2
            WHERE status = 'uploading'
            "#,
        )
        .bind(INTERRUPTED_MESSAGE)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(r.rows_affected())
    }
}
