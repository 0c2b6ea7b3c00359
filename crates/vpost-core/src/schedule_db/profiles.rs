//! Credential-profile operations.

use anyhow::{bail, Result};
use sqlx::Row;

use super::db::{unix_timestamp, ScheduleDb};
use super::types::{ProfileId, ProfileRecord};

fn profile_from_row(row: &sqlx::sqlite::SqliteRow) -> ProfileRecord {
    ProfileRecord {
        id: row.get("id"),
        name: row.get("name"),
        cookies_filename: row.get("cookies_filename"),
        proxy: row.get("proxy"),
        is_active: row.get::<i64, _>("is_active") != 0,
        created_at: row.get("created_at"),
    }
}

impl ScheduleDb {
    /// Insert a new active profile. The cookies file itself is managed on
    /// disk by the user; only its name is stored here.
    pub async fn add_profile(
        &self,
        name: &str,
        cookies_filename: &str,
        proxy: Option<&str>,
    ) -> Result<ProfileId> {
        let now = unix_timestamp();
        let row_id = sqlx::query(
            r#"
            INSERT INTO profiles (name, cookies_filename, proxy, is_active, created_at)
            VALUES (?1, ?2, ?3, 1, ?4)
            "#,
        )
        .bind(name)
        .bind(cookies_filename)
        .bind(proxy)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(row_id)
    }

    /// List all profiles, oldest first.
    pub async fn list_profiles(&self) -> Result<Vec<ProfileRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, cookies_filename, proxy, is_active, created_at
            FROM profiles
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(profile_from_row).collect())
    }

    /// Fetch a single profile.
    pub async fn get_profile(&self, id: ProfileId) -> Result<Option<ProfileRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, cookies_filename, proxy, is_active, created_at
            FROM profiles
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(profile_from_row))
    }

    /// Remove a profile. Refused while pending or in-flight schedules still
    /// reference it.
    pub async fn remove_profile(&self, id: ProfileId) -> Result<()> {
        let active = self.count_active_schedules("profile_id", id).await?;
        if active > 0 {
            bail!("profile {} still has {} active schedule(s)", id, active);
        }

        let r = sqlx::query(
            r#"
            DELETE FROM profiles
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if r.rows_affected() == 0 {
            bail!("no profile with id {}", id);
        }
        Ok(())
    }

    /// Number of pending/uploading schedules referencing the given video or
    /// profile column.
    pub(super) async fn count_active_schedules(&self, column: &str, id: i64) -> Result<i64> {
        // `column` is one of two fixed identifiers, never user input.
        let sql = format!(
            "SELECT COUNT(*) AS n FROM scheduled_uploads \
             WHERE {column} = ?1 AND status IN ('pending', 'uploading')"
        );
        let row = sqlx::query(&sql).bind(id).fetch_one(&self.pool).await?;
        Ok(row.get("n"))
    }
}
