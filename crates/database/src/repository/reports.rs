use crate::DbError;
use core_types::{DailyReport, NewDailyReport, ReportDate};
use sqlx::postgres::PgPool;

/// Upper bound on rows returned by [`ReportStore::text_search`].
pub const SEARCH_RESULT_LIMIT: i64 = 50;

/// Stores one generated report per channel per UTC calendar day.
#[derive(Debug, Clone)]
pub struct ReportStore {
    pool: PgPool,
}

impl ReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts the report, or replaces summary and payload of the existing
    /// report for the same channel and day and refreshes its timestamp.
    /// Either way the stored row is returned.
    pub async fn upsert(&self, report: &NewDailyReport) -> Result<DailyReport, DbError> {
        let stored = sqlx::query_as::<_, DailyReport>(
            r#"
            INSERT INTO daily_reports (channel_id, report_date, summary, payload, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (channel_id, report_date) DO UPDATE
            SET summary = EXCLUDED.summary, payload = EXCLUDED.payload, created_at = NOW()
            RETURNING id, channel_id, report_date, summary, payload, created_at
            "#,
        )
        .bind(report.channel_id)
        .bind(report.report_date)
        .bind(&report.summary)
        .bind(&report.payload)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(
            report_id = stored.id,
            channel_id = stored.channel_id,
            report_date = %stored.report_date,
            "Daily report stored"
        );
        Ok(stored)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<DailyReport>, DbError> {
        let report = sqlx::query_as::<_, DailyReport>(
            r#"
            SELECT id, channel_id, report_date, summary, payload, created_at
            FROM daily_reports
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(report)
    }

    pub async fn get_by_channel_and_date(
        &self,
        channel_id: i64,
        report_date: ReportDate,
    ) -> Result<Option<DailyReport>, DbError> {
        let report = sqlx::query_as::<_, DailyReport>(
            r#"
            SELECT id, channel_id, report_date, summary, payload, created_at
            FROM daily_reports
            WHERE channel_id = $1 AND report_date = $2
            "#,
        )
        .bind(channel_id)
        .bind(report_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(report)
    }

    /// Fetches a channel's reports, newest day first.
    pub async fn get_by_channel(&self, channel_id: i64) -> Result<Vec<DailyReport>, DbError> {
        let reports = sqlx::query_as::<_, DailyReport>(
            r#"
            SELECT id, channel_id, report_date, summary, payload, created_at
            FROM daily_reports
            WHERE channel_id = $1
            ORDER BY report_date DESC
            "#,
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reports)
    }

    /// Finds reports whose summary contains `needle`, ignoring case.
    ///
    /// The needle is matched literally (`%` and `_` carry no wildcard meaning).
    /// Newest day first, at most [`SEARCH_RESULT_LIMIT`] rows.
    pub async fn text_search(&self, needle: &str) -> Result<Vec<DailyReport>, DbError> {
        let reports = sqlx::query_as::<_, DailyReport>(
            r#"
            SELECT id, channel_id, report_date, summary, payload, created_at
            FROM daily_reports
            WHERE summary ILIKE $1
            ORDER BY report_date DESC
            LIMIT $2
            "#,
        )
        .bind(contains_pattern(needle))
        .bind(SEARCH_RESULT_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(reports)
    }

    /// The most recent reports across all channels.
    pub async fn get_latest(&self, limit: i64) -> Result<Vec<DailyReport>, DbError> {
        let reports = sqlx::query_as::<_, DailyReport>(
            r#"
            SELECT id, channel_id, report_date, summary, payload, created_at
            FROM daily_reports
            ORDER BY report_date DESC
            LIMIT $1
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;
        Ok(reports)
    }
}

/// Builds a `LIKE` pattern matching any string that contains `needle`.
/// Uses the default backslash escape.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_needle_is_wrapped() {
        assert_eq!(contains_pattern("outage"), "%outage%");
        assert_eq!(contains_pattern(""), "%%");
    }

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\tmp"), "%c:\\\\tmp%");
    }
}
