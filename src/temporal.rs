//! Temporal bucketing
//!
//! Assigns calendar-day and season buckets from entry timestamps. Seasons are
//! month-based quarters: spring 3-5, summer 6-8, autumn 9-11, winter 12/1/2.

use crate::types::Season;
use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Season bucket for a calendar day
pub fn season_for_date(date: NaiveDate) -> Season {
    match date.month() {
        3..=5 => Season::Spring,
        6..=8 => Season::Summer,
        9..=11 => Season::Autumn,
        _ => Season::Winter,
    }
}

/// Calendar day (UTC) used for distinct-day counting and the mood series
pub fn day_key(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.date_naive()
}
