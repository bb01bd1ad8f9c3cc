use crate::date::ReportDate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// A conversational channel being watched, with its resumable ingestion cursor.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct MonitoredChannel {
    /// Externally assigned identity; never reused.
    pub channel_id: i64,
    pub title: Option<String>,
    pub handle: Option<String>,
    /// The newest source message ID the ingestion process has handled.
    pub last_processed_message_id: i64,
    /// Opaque sync-state token from the source network.
    pub last_sync_cursor: i64,
    pub is_active: bool,
    pub added_at: DateTime<Utc>,
}

/// Input for registering a channel. Cursor fields always start at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChannel {
    pub channel_id: i64,
    pub title: Option<String>,
    pub handle: Option<String>,
    pub is_active: bool,
    /// Defaults to the time of insertion when absent.
    pub added_at: Option<DateTime<Utc>>,
}

impl NewChannel {
    /// An active channel with no title or handle.
    pub fn active(channel_id: i64) -> Self {
        Self {
            channel_id,
            title: None,
            handle: None,
            is_active: true,
            added_at: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }
}

/// A message recorded by the ledger. Keyed by (`channel_id`, `source_message_id`).
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct IngestedMessage {
    pub id: i64,
    pub channel_id: i64,
    pub source_message_id: i64,
    /// Service messages have no sender.
    pub sender_id: Option<i64>,
    pub sender_name: Option<String>,
    /// Media-only messages have no text.
    pub message_text: Option<String>,
    pub is_transcribed: bool,
    pub is_forward: bool,
    pub forward_source_name: Option<String>,
    /// Logical time of the original message. Retention is based on this.
    pub created_at: DateTime<Utc>,
    /// Server-assigned ingestion time.
    pub saved_at: DateTime<Utc>,
}

/// Input for appending a message to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub channel_id: i64,
    pub source_message_id: i64,
    pub sender_id: Option<i64>,
    pub sender_name: Option<String>,
    pub message_text: Option<String>,
    pub is_transcribed: bool,
    pub is_forward: bool,
    pub forward_source_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewMessage {
    /// A plain, non-forwarded text message with no sender attached.
    pub fn text(
        channel_id: i64,
        source_message_id: i64,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            channel_id,
            source_message_id,
            sender_id: None,
            sender_name: None,
            message_text: Some(text.into()),
            is_transcribed: false,
            is_forward: false,
            forward_source_name: None,
            created_at,
        }
    }
}

/// A keyword or pattern that raises an alert when an external matcher finds it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct AlertTrigger {
    pub id: i64,
    pub phrase: String,
    /// Selects pattern semantics instead of literal matching.
    pub is_regex: bool,
    pub alert_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTrigger {
    pub phrase: String,
    pub is_regex: bool,
    pub alert_level: String,
}

/// The generated report for one channel on one UTC calendar day.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct DailyReport {
    pub id: i64,
    pub channel_id: i64,
    pub report_date: ReportDate,
    pub summary: Option<String>,
    /// The full structured report document.
    pub payload: JsonValue,
    /// Refreshed every time the report is regenerated.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDailyReport {
    pub channel_id: i64,
    pub report_date: ReportDate,
    pub summary: Option<String>,
    pub payload: JsonValue,
}
