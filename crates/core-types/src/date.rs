//! Calendar-day keys for daily reports.
//!
//! A report is unique per channel per day. Callers in different time zones
//! would otherwise disagree about which day an instant belongs to, so every
//! instant is folded onto its UTC calendar day before it reaches the store.

use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A report date at day granularity, always expressed in UTC.
///
/// Stored in a `DATE` column, so the database compares it exactly like the
/// wrapped `NaiveDate`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct ReportDate(NaiveDate);

impl ReportDate {
    /// Wraps an already-normalized calendar date.
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Builds a date from its components, rejecting impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, CoreError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| {
                CoreError::InvalidInput(
                    "report_date".to_string(),
                    format!("{year:04}-{month:02}-{day:02} is not a calendar date"),
                )
            })
    }

    /// Normalizes an instant in any time zone to its UTC calendar day.
    /// The time of day is discarded.
    pub fn from_instant<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self(instant.with_timezone(&Utc).date_naive())
    }

    /// The UTC calendar day of the current instant.
    pub fn today() -> Self {
        Self::from_instant(&Utc::now())
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for ReportDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for ReportDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for ReportDate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|e| CoreError::InvalidInput("report_date".to_string(), format!("'{s}': {e}")))
    }
}
