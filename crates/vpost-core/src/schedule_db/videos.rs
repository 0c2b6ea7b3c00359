//! Video-library operations.

use anyhow::{bail, Result};
use sqlx::Row;

use super::db::{unix_timestamp, ScheduleDb};
use super::types::{VideoId, VideoRecord};

fn video_from_row(row: &sqlx::sqlite::SqliteRow) -> VideoRecord {
    VideoRecord {
        id: row.get("id"),
        original_filename: row.get("original_filename"),
        stored_filename: row.get("stored_filename"),
        file_path: row.get("file_path"),
        description: row.get("description"),
        file_size: row.get("file_size"),
        created_at: row.get("created_at"),
    }
}

impl ScheduleDb {
    /// Insert a library entry for an already-copied video file.
    pub async fn add_video(
        &self,
        original_filename: &str,
        stored_filename: &str,
        file_path: &str,
        description: Option<&str>,
        file_size: i64,
    ) -> Result<VideoId> {
        let now = unix_timestamp();
        let row_id = sqlx::query(
            r#"
            INSERT INTO videos (original_filename, stored_filename, file_path, description, file_size, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(original_filename)
        .bind(stored_filename)
        .bind(file_path)
        .bind(description)
        .bind(file_size)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(row_id)
    }

    /// List all videos, newest first.
    pub async fn list_videos(&self) -> Result<Vec<VideoRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, original_filename, stored_filename, file_path, description, file_size, created_at
            FROM videos
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(video_from_row).collect())
    }

    /// Fetch a single video.
    pub async fn get_video(&self, id: VideoId) -> Result<Option<VideoRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, original_filename, stored_filename, file_path, description, file_size, created_at
            FROM videos
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(video_from_row))
    }

    /// Remove a video row and return it so the caller can delete the file.
    /// Refused while pending or in-flight schedules still reference it.
    pub async fn remove_video(&self, id: VideoId) -> Result<VideoRecord> {
        let Some(video) = self.get_video(id).await? else {
            bail!("no video with id {}", id);
        };

        let active = self.count_active_schedules("video_id", id).await?;
        if active > 0 {
            bail!("video {} still has {} active schedule(s)", id, active);
        }

        sqlx::query(
            r#"
            DELETE FROM videos
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(video)
    }
}
