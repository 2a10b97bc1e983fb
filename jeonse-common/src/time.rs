//! Timestamp utilities
//!
//! Registry periods and deal dates are Korean civil dates, so "today" is
//! always evaluated in Korea Standard Time (UTC+9) regardless of host zone.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, SecondsFormat, Utc};

const KST_OFFSET_SECS: i32 = 9 * 3600;

/// Korea Standard Time offset
pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Civil date in Seoul at the given instant
pub fn kst_date(ts: &DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&kst()).date_naive()
}

/// Current civil date in KST
pub fn kst_today() -> NaiveDate {
    kst_date(&now())
}

/// Canonical text form for timestamps stored in SQLite
///
/// Fixed-width UTC with a `Z` suffix, so lexicographic order in SQL
/// matches chronological order.
pub fn to_db_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a timestamp written by [`to_db_timestamp`]
pub fn from_db_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
