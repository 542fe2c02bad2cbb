// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly aggregation of a user's activity stream.
//!
//! Pure function over a snapshot: given the activities and a reference
//! instant, produce the dashboard statistics. The local calendar used for
//! day boundaries is the time zone carried by `now`.

use chrono::{DateTime, Days, NaiveDate, TimeZone};
use std::collections::BTreeMap;

use crate::models::{
    Activity, ActivityCategory, CategoryTotal, DailyEmissions, WeeklyStats, CHART_DAYS,
};
use crate::services::calculator::round_to;
use crate::time_utils::days_between;

/// Length of one comparison window, in days.
pub const WINDOW_DAYS: i64 = 7;

/// Decimal places kept on chart values.
const CHART_DECIMALS: i32 = 2;

/// Per-category running total.
#[derive(Default, Clone, Copy)]
struct CategorySum {
    total: f64,
    count: u32,
}

/// Compute weekly statistics for `activities` as seen at `now`.
pub fn aggregate<Tz: TimeZone>(activities: &[Activity], now: &DateTime<Tz>) -> WeeklyStats {
    let mut current_total = 0.0;
    let mut previous_total = 0.0;
    let mut current_logs = 0u32;
    let mut by_category: BTreeMap<ActivityCategory, CategorySum> = BTreeMap::new();

    for activity in activities {
        let age = days_between(now, &activity.date);
        if (0..WINDOW_DAYS).contains(&age) {
            current_total += activity.co2e;
            current_logs += 1;
            let sum = by_category.entry(activity.category()).or_default();
            sum.total += activity.co2e;
            sum.count += 1;
        } else if (WINDOW_DAYS..2 * WINDOW_DAYS).contains(&age) {
            previous_total += activity.co2e;
        }
    }

    WeeklyStats {
        total_emissions: current_total,
        top_category: top_category(&by_category),
        total_logs: current_logs,
        previous_week_emissions: previous_total,
        weekly_change: weekly_change(current_total, previous_total),
        daily: daily_breakdown(activities, now),
    }
}

/// Percentage change from `previous` to `current`.
///
/// An empty previous week counts as +100% when anything was emitted since.
pub fn weekly_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// Highest-emitting category; ties go to the earlier category in
/// [`ActivityCategory::ALL`].
fn top_category(sums: &BTreeMap<ActivityCategory, CategorySum>) -> Option<CategoryTotal> {
    let mut best: Option<CategoryTotal> = None;
    for category in ActivityCategory::ALL {
        let Some(sum) = sums.get(&category).filter(|s| s.count > 0) else {
            continue;
        };
        if best.as_ref().map_or(true, |b| sum.total > b.total) {
            best = Some(CategoryTotal {
                category,
                total: sum.total,
            });
        }
    }
    best
}

/// Seven buckets for the local calendar days ending today, oldest first.
fn daily_breakdown<Tz: TimeZone>(
    activities: &[Activity],
    now: &DateTime<Tz>,
) -> [DailyEmissions; CHART_DAYS] {
    let today = now.date_naive();
    let mut days: [DailyEmissions; CHART_DAYS] = std::array::from_fn(|i| {
        let back = Days::new((CHART_DAYS - 1 - i) as u64);
        // Only fails at the start of the representable calendar
        DailyEmissions::empty(today.checked_sub_days(back).unwrap_or(NaiveDate::MIN))
    });
    let first_day = days[0].date;

    let tz = now.timezone();
    for activity in activities {
        let local_date = activity.date.with_timezone(&tz).date_naive();
        if local_date < first_day || local_date > today {
            continue;
        }
        let index = (local_date - first_day).num_days() as usize;
        if let Some(day) = days.get_mut(index) {
            *day.slot_mut(activity.category()) += activity.co2e;
        }
    }

    for day in &mut days {
        for category in ActivityCategory::ALL {
            let slot = day.slot_mut(category);
            *slot = round_to(*slot, CHART_DECIMALS);
        }
    }

    days
}
