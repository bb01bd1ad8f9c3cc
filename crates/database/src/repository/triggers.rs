use crate::DbError;
use core_types::{AlertTrigger, NewTrigger};
use sqlx::postgres::PgPool;

/// Keyword and pattern alert definitions. Matching happens elsewhere.
#[derive(Debug, Clone)]
pub struct TriggerStore {
    pool: PgPool,
}

impl TriggerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, trigger: &NewTrigger) -> Result<AlertTrigger, DbError> {
        let created = sqlx::query_as::<_, AlertTrigger>(
            r#"
            INSERT INTO alert_triggers (phrase, is_regex, alert_level)
            VALUES ($1, $2, $3)
            RETURNING id, phrase, is_regex, alert_level
            "#,
        )
        .bind(&trigger.phrase)
        .bind(trigger.is_regex)
        .bind(&trigger.alert_level)
        .fetch_one(&self.pool)
        .await?;
        tracing::debug!(trigger_id = created.id, "Alert trigger created");
        Ok(created)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<AlertTrigger>, DbError> {
        let trigger = sqlx::query_as::<_, AlertTrigger>(
            "SELECT id, phrase, is_regex, alert_level FROM alert_triggers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(trigger)
    }

    pub async fn get_all(&self) -> Result<Vec<AlertTrigger>, DbError> {
        let triggers = sqlx::query_as::<_, AlertTrigger>(
            "SELECT id, phrase, is_regex, alert_level FROM alert_triggers ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(triggers)
    }

    /// Replaces phrase, mode and level of the trigger with the same ID.
    pub async fn update(&self, trigger: &AlertTrigger) -> Result<(), DbError> {
        sqlx::query(
            r#"
            UPDATE alert_triggers
            SET phrase = $2, is_regex = $3, alert_level = $4
            WHERE id = $1
            "#,
        )
        .bind(trigger.id)
        .bind(&trigger.phrase)
        .bind(trigger.is_regex)
        .bind(&trigger.alert_level)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        sqlx::query("DELETE FROM alert_triggers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
