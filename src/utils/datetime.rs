//! Date and time utility functions.
//!
//! Instants are carried through the engine as epoch milliseconds so that the
//! two replicas' modification timestamps stay directly comparable and the
//! completed-position encoding needs no further conversion.

use chrono::{DateTime, NaiveDate, Utc};

/// Calendar date format used for task due dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current instant, epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse a due date string in `YYYY-MM-DD` format.
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str, DATE_FORMAT)
}

/// Render an epoch-milliseconds instant as RFC 3339, for diagnostics and log
/// output. Out-of-range instants fall back to the raw number.
pub fn format_ms(ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(dt) => dt.to_rfc3339(),
        None => format!("{ms}ms"),
    }
}
