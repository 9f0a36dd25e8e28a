//! Human-readable display numbers for tickets.
//!
//! A display number is the creation instant rendered as twelve digits:
//! day, month, year, hour, minute. It is derived purely from the clock and
//! never checked against the store, so two tickets raised in the same
//! minute share a number. Use the internal `id` when uniqueness matters.
//!
//! The month is right-padded, so January and October both render as `10`:
//! 1 Jan and 1 Oct of the same year at 00:00 give the same number.

use chrono::{Datelike, Timelike};

use crate::clock::Clock;
use crate::types::Timestamp;

/// Length of every generated display number.
pub const DISPLAY_NUMBER_LEN: usize = 12;

/// Render `at` as a display number.
///
/// Month is right-padded with `0` (March is `30`, not `03`); numbers
/// already issued to users follow this layout.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use tracklane_core::identifier::display_number;
///
/// let at = Utc.with_ymd_and_hms(2024, 3, 5, 15, 7, 0).unwrap();
/// assert_eq!(display_number(&at), "053020241507");
/// ```
pub fn display_number(at: &Timestamp) -> String {
    format!(
        "{:02}{:0<2}{:04}{:02}{:02}",
        at.day(),
        at.month(),
        at.year(),
        at.hour(),
        at.minute()
    )
}

/// Generate a display number for an item created right now.
pub fn generate(clock: &dyn Clock) -> String {
    display_number(&clock.now())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
