use crate::DbError;
use sqlx::postgres::PgPool;

/// Durable key/value cache for the transport client's session state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    pool: PgPool,
}

impl SessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stores `value` under `key`, replacing any previous value entirely.
    pub async fn save(&self, key: &str, value: &[u8]) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO session_blobs (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, DbError> {
        let value = sqlx::query_scalar::<_, Vec<u8>>("SELECT value FROM session_blobs WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    pub async fn delete(&self, key: &str) -> Result<(), DbError> {
        sqlx::query("DELETE FROM session_blobs WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
