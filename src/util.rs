//! Date/time utilities for tracking-event timestamps.
//!
//! Every timestamp shown on a page is a naive local time in one of two formats:
//!   - **Timestamps**: `YYYY-MM-DD HH:MM` — `2024-11-18 09:30`
//!   - **Dates**:      ISO 8601 date — `2024-11-18`
//!
//! The zone is never printed. All local times are in the configured fixed
//! offset (KST, UTC+9, unless overridden), so readers must treat the offset
//! as implicit.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, ParseResult, TimeDelta};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Parse a `YYYY-MM-DD HH:MM` timestamp with no zone.
pub fn parse_timestamp(s: &str) -> ParseResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
}

/// Attach a fixed offset to a naive local time.
///
/// `None` only when the matching UTC instant falls outside chrono's range.
pub fn localize(local: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let utc = local.checked_sub_signed(TimeDelta::seconds(offset.local_minus_utc().into()))?;
    Some(DateTime::from_naive_utc_and_offset(utc, offset))
}

pub fn format_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
