//! Date parsing with a single configured pattern.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Default pattern: ISO calendar date.
pub const DEFAULT_DATE_PATTERN: &str = "%Y-%m-%d";

/// A `chrono` strftime pattern used to parse date, time and date-time cells.
///
/// A pattern without time fields yields midnight; a pattern without date fields yields a time on
/// `1970-01-01`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFormat {
    pattern: String,
}

impl DateFormat {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parse `raw` (trimmed) with the configured pattern.
    pub fn parse(&self, raw: &str) -> Option<NaiveDateTime> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, &self.pattern) {
            return Some(dt);
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, &self.pattern) {
            return Some(d.and_time(NaiveTime::MIN));
        }
        let t = NaiveTime::parse_from_str(s, &self.pattern).ok()?;
        NaiveDate::from_ymd_opt(1970, 1, 1).map(|epoch| epoch.and_time(t))
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_PATTERN)
    }
}
