use crate::DbError;
use chrono::Utc;
use core_types::{MonitoredChannel, NewChannel};
use sqlx::postgres::PgPool;

/// CRUD and cursor bookkeeping for monitored channels.
#[derive(Debug, Clone)]
pub struct ChannelStore {
    pool: PgPool,
}

impl ChannelStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers a channel for monitoring.
    ///
    /// First write wins: if the channel is already registered nothing changes,
    /// including its cursor and activity flag. Returns whether a row was inserted.
    pub async fn create(&self, channel: &NewChannel) -> Result<bool, DbError> {
        let added_at = channel.added_at.unwrap_or_else(Utc::now);

        let result = sqlx::query(
            r#"
            INSERT INTO monitored_channels (channel_id, title, handle, is_active, added_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (channel_id) DO NOTHING
            "#,
        )
        .bind(channel.channel_id)
        .bind(&channel.title)
        .bind(&channel.handle)
        .bind(channel.is_active)
        .bind(added_at)
        .execute(&self.pool)
        .await?;

        let inserted = result.rows_affected() > 0;
        if !inserted {
            tracing::debug!(channel_id = channel.channel_id, "Channel already monitored, create ignored");
        }
        Ok(inserted)
    }

    pub async fn get_by_channel_id(&self, channel_id: i64) -> Result<Option<MonitoredChannel>, DbError> {
        let channel = sqlx::query_as::<_, MonitoredChannel>(
            r#"
            SELECT channel_id, title, handle, last_processed_message_id, last_sync_cursor, is_active, added_at
            FROM monitored_channels
            WHERE channel_id = $1
            "#,
        )
        .bind(channel_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(channel)
    }

    /// Fetches every channel, most recently added first.
    pub async fn get_all(&self) -> Result<Vec<MonitoredChannel>, DbError> {
        let channels = sqlx::query_as::<_, MonitoredChannel>(
            r#"
            SELECT channel_id, title, handle, last_processed_message_id, last_sync_cursor, is_active, added_at
            FROM monitored_channels
            ORDER BY added_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(channels)
    }

    /// Fetches the channels ingestion should poll, most recently added first.
    pub async fn get_active(&self) -> Result<Vec<MonitoredChannel>, DbError> {
        let channels = sqlx::query_as::<_, MonitoredChannel>(
            r#"
            SELECT channel_id, title, handle, last_processed_message_id, last_sync_cursor, is_active, added_at
            FROM monitored_channels
            WHERE is_active = TRUE
            ORDER BY added_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(channels)
    }

    /// Replaces title, handle, cursor fields and the active flag.
    /// A missing channel is not an error; nothing is written.
    pub async fn update(&self, channel: &MonitoredChannel) -> Result<(), DbError> {
        sqlx::query(
            r#"
            UPDATE monitored_channels
            SET title = $2, handle = $3, last_processed_message_id = $4,
                last_sync_cursor = $5, is_active = $6
            WHERE channel_id = $1
            "#,
        )
        .bind(channel.channel_id)
        .bind(&channel.title)
        .bind(&channel.handle)
        .bind(channel.last_processed_message_id)
        .bind(channel.last_sync_cursor)
        .bind(channel.is_active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Records ingestion progress. Only the cursor fields are touched.
    ///
    /// The values are written as given. Callers must never pass a position
    /// older than the stored one, and should call this only after the batch
    /// that produced it has been appended to the ledger.
    pub async fn update_cursor(
        &self,
        channel_id: i64,
        last_processed_message_id: i64,
        last_sync_cursor: i64,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            UPDATE monitored_channels
            SET last_processed_message_id = $2, last_sync_cursor = $3
            WHERE channel_id = $1
            "#,
        )
        .bind(channel_id)
        .bind(last_processed_message_id)
        .bind(last_sync_cursor)
        .execute(&self.pool)
        .await?;
        tracing::debug!(channel_id, last_processed_message_id, last_sync_cursor, "Cursor advanced");
        Ok(())
    }

    /// Pauses or resumes a channel without losing its cursor.
    pub async fn set_active(&self, channel_id: i64, active: bool) -> Result<(), DbError> {
        sqlx::query("UPDATE monitored_channels SET is_active = $2 WHERE channel_id = $1")
            .bind(channel_id)
            .bind(active)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Removes the channel. Its messages and reports are kept.
    pub async fn delete(&self, channel_id: i64) -> Result<(), DbError> {
        sqlx::query("DELETE FROM monitored_channels WHERE channel_id = $1")
            .bind(channel_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
