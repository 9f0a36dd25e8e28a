//! Duration metrics derived from a pair of instants.
//!
//! Two metrics exist and they are intentionally different:
//!
//! - [`elapsed_days`]: fractional days rounded to two decimals, clamped at
//!   zero. Used for tickets, tasks and milestones.
//! - [`gap_in_days`]: whole days, ceiling of the millisecond difference.
//!   Used for the project start/close gap.
//!
//! Both return [`CoreError::MissingData`] when an instant is absent; the
//! caller decides whether that is fatal.

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Milliseconds in one day.
pub const MS_PER_DAY: i64 = 86_400_000;

/// Fractional days between `start` and `end`, rounded to two decimals.
///
/// Negative spans (clock skew, bad input) clamp to `0.0`.
pub fn elapsed_days(
    start: Option<&Timestamp>,
    end: Option<&Timestamp>,
) -> Result<f64, CoreError> {
    let (start, end) = require_both(start, end)?;
    let ms = (*end - *start).num_milliseconds();
    if ms <= 0 {
        return Ok(0.0);
    }
    let days = ms as f64 / MS_PER_DAY as f64;
    Ok((days * 100.0).round() / 100.0)
}

/// Whole days between `start` and `end`, rounding any partial day up.
///
/// The sign is kept: a close instant before the start yields a zero or
/// negative gap.
pub fn gap_in_days(start: Option<&Timestamp>, end: Option<&Timestamp>) -> Result<i64, CoreError> {
    let (start, end) = require_both(start, end)?;
    let ms = (*end - *start).num_milliseconds();
    let whole = ms / MS_PER_DAY;
    // Integer division truncates toward zero, which is already the ceiling
    // for negative spans.
    if ms % MS_PER_DAY > 0 {
        Ok(whole + 1)
    } else {
        Ok(whole)
    }
}

fn require_both<'a>(
    start: Option<&'a Timestamp>,
    end: Option<&'a Timestamp>,
) -> Result<(&'a Timestamp, &'a Timestamp), CoreError> {
    match (start, end) {
        (Some(s), Some(e)) => Ok((s, e)),
        (None, _) => Err(CoreError::MissingData(
            "start instant is required to compute a duration".into(),
        )),
        (_, None) => Err(CoreError::MissingData(
            "end instant is required to compute a duration".into(),
        )),
    }
}

/// Parse a caller-supplied instant.
///
/// Accepts RFC 3339 (`2024-01-02T01:00:00Z`), a naive date-time
/// (`2024-01-02T01:00:00`, `2024-01-02T01:00`, interpreted as UTC), or a
/// bare date (`2024-01-02`, midnight UTC). Anything else is
/// [`CoreError::MissingData`], since an unparsable instant cannot feed a
/// duration.
pub fn parse_instant(raw: &str) -> Result<Timestamp, CoreError> {
    let raw = raw.trim();

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(CoreError::MissingData(format!(
        "'{raw}' is not a recognisable date or date-time"
    )))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
