use crate::DbError;
use chrono::{DateTime, Days, Duration, Utc};
use core_types::{IngestedMessage, NewMessage};
use sqlx::postgres::{PgArguments, PgPool, Postgres};
use sqlx::query::QueryScalar;

/// Inserts a message unless its natural key is already present.
/// Yields the new surrogate ID, or no row for a duplicate.
const INSERT_MESSAGE: &str = r#"
    INSERT INTO ingested_messages (
        channel_id, source_message_id, sender_id, sender_name, message_text,
        is_transcribed, is_forward, forward_source_name, created_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (channel_id, source_message_id) DO NOTHING
    RETURNING id
"#;

fn bind_message<'q>(
    query: QueryScalar<'q, Postgres, i64, PgArguments>,
    message: &'q NewMessage,
) -> QueryScalar<'q, Postgres, i64, PgArguments> {
    query
        .bind(message.channel_id)
        .bind(message.source_message_id)
        .bind(message.sender_id)
        .bind(&message.sender_name)
        .bind(&message.message_text)
        .bind(message.is_transcribed)
        .bind(message.is_forward)
        .bind(&message.forward_source_name)
        .bind(message.created_at)
}

/// The append-only, deduplicating message store.
///
/// Behaves as a set keyed by (`channel_id`, `source_message_id`): replaying a
/// batch after a crash or re-delivery never duplicates or overwrites rows.
#[derive(Debug, Clone)]
pub struct MessageLedger {
    pool: PgPool,
}

impl MessageLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends a message. Returns its new ID, or `None` when the natural key
    /// was already recorded, in which case the stored row is left untouched.
    pub async fn append(&self, message: &NewMessage) -> Result<Option<i64>, DbError> {
        let id = bind_message(sqlx::query_scalar(INSERT_MESSAGE), message)
            .fetch_optional(&self.pool)
            .await?;

        if id.is_none() {
            tracing::debug!(
                channel_id = message.channel_id,
                source_message_id = message.source_message_id,
                "Duplicate message absorbed"
            );
        }
        Ok(id)
    }

    /// Appends a batch and advances the channel cursor in one transaction.
    ///
    /// Either every new message and the cursor move are committed, or nothing
    /// is. Duplicates inside the batch are absorbed the same way [`append`]
    /// absorbs them. Returns the number of rows actually inserted.
    ///
    /// [`append`]: MessageLedger::append
    pub async fn append_batch_with_cursor(
        &self,
        channel_id: i64,
        messages: &[NewMessage],
        last_processed_message_id: i64,
        last_sync_cursor: i64,
    ) -> Result<u64, DbError> {
        if let Some(stray) = messages.iter().find(|m| m.channel_id != channel_id) {
            return Err(DbError::InvalidInput(format!(
                "message {} belongs to channel {}, not {}",
                stray.source_message_id, stray.channel_id, channel_id
            )));
        }

        let mut tx = self.pool.begin().await?;

        let mut inserted = 0u64;
        for message in messages {
            let id = bind_message(sqlx::query_scalar(INSERT_MESSAGE), message)
                .fetch_optional(&mut *tx) // Note: must use the transaction object `tx` here
                .await?;
            if id.is_some() {
                inserted += 1;
            }
        }

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
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let skipped = messages.len() as u64 - inserted;
        if skipped > 0 {
            tracing::warn!(channel_id, skipped, "Batch contained already-ingested messages");
        }
        tracing::debug!(channel_id, inserted, last_processed_message_id, "Batch committed");
        Ok(inserted)
    }

    /// Fetches a channel's messages with `start <= created_at < end`, oldest first.
    pub async fn range_query(
        &self,
        channel_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<IngestedMessage>, DbError> {
        let messages = sqlx::query_as::<_, IngestedMessage>(
            r#"
            SELECT id, channel_id, source_message_id, sender_id, sender_name, message_text,
                   is_transcribed, is_forward, forward_source_name, created_at, saved_at
            FROM ingested_messages
            WHERE channel_id = $1 AND created_at >= $2 AND created_at < $3
            ORDER BY created_at ASC, source_message_id ASC
            "#,
        )
        .bind(channel_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    pub async fn last_24_hours(&self, channel_id: i64) -> Result<Vec<IngestedMessage>, DbError> {
        let now = Utc::now();
        self.range_query(channel_id, now - Duration::hours(24), now).await
    }

    /// Deletes every message whose original creation time is before `cutoff`.
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM ingested_messages WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected();
        tracing::info!(%cutoff, deleted, "Retention sweep finished");
        Ok(deleted)
    }

    /// Purges with a cutoff of now minus `days`. A window reaching past the
    /// representable date range is rejected before any query runs.
    pub async fn purge_older_than_days(&self, days: u32) -> Result<u64, DbError> {
        let cutoff = Utc::now()
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| {
                DbError::InvalidInput(format!("retention window of {days} days is out of range"))
            })?;
        self.purge_older_than(cutoff).await
    }

    pub async fn count_by_channel(&self, channel_id: i64) -> Result<i64, DbError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ingested_messages WHERE channel_id = $1",
        )
        .bind(channel_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn count_total(&self) -> Result<i64, DbError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ingested_messages")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
