// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and calendar arithmetic.

use chrono::{DateTime, FixedOffset, SecondsFormat, TimeZone, Utc};
use std::cmp::Ordering;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Whole days between `now` and `then`, measured on the local calendar of
/// `now`'s time zone and truncated toward zero.
///
/// The calendar-day difference is reduced by one when the final day is not
/// complete, i.e. when `now`'s local time of day has not yet reached the time
/// of day of `then`. Negative results mean `then` lies in the future.
pub fn days_between<Tz: TimeZone>(now: &DateTime<Tz>, then: &DateTime<Utc>) -> i64 {
    let now_local = now.naive_local();
    let then_local = then.with_timezone(&now.timezone()).naive_local();

    let calendar_days = (now_local.date() - then_local.date()).num_days();
    match calendar_days.cmp(&0) {
        Ordering::Greater if now_local.time() < then_local.time() => calendar_days - 1,
        Ordering::Less if now_local.time() > then_local.time() => calendar_days + 1,
        _ => calendar_days,
    }
}

/// Build a fixed offset from minutes east of UTC.
///
/// Returns `None` when the offset is outside +/- 24h.
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
}

/// Serde adapter storing timestamps as second-precision RFC3339 strings.
///
/// A fixed width keeps lexicographic order equal to chronological order,
/// which the activity queries rely on.
pub mod rfc3339_seconds {
    use super::format_utc_rfc3339;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_utc_rfc3339(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
