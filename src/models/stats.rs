//! Weekly emission statistics for the dashboard.
//!
//! These are computed on read from the user's activity stream by
//! `services::aggregation`; nothing here is persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::ActivityCategory;

/// Number of calendar days shown on the dashboard chart.
pub const CHART_DAYS: usize = 7;

/// Rolling 7-day statistics for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    // ─── Current Week ────────────────────────────────────────────
    /// Total kg CO2e over the last 7 days
    pub total_emissions: f64,
    /// Category with the highest emissions this week
    pub top_category: Option<CategoryTotal>,
    /// Activities logged in the last 7 days
    pub total_logs: u32,

    // ─── Comparison ──────────────────────────────────────────────
    /// Total kg CO2e over the 7 days before that
    pub previous_week_emissions: f64,
    /// Percentage change against the previous week
    pub weekly_change: f64,

    // ─── Chart ───────────────────────────────────────────────────
    /// One entry per local calendar day, oldest first
    pub daily: [DailyEmissions; CHART_DAYS],
}

/// Summed emissions for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CategoryTotal {
    pub category: ActivityCategory,
    pub total: f64,
}

/// Chart bucket for a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyEmissions {
    pub date: NaiveDate,
    /// Short weekday name ("Mon")
    pub label: String,
    pub transport: f64,
    pub energy: f64,
    pub diet: f64,
}

impl DailyEmissions {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            label: date.format("%a").to_string(),
            transport: 0.0,
            energy: 0.0,
            diet: 0.0,
        }
    }

    /// Mutable sum for a category.
    pub fn slot_mut(&mut self, category: ActivityCategory) -> &mut f64 {
        match category {
            ActivityCategory::Transport => &mut self.transport,
            ActivityCategory::Energy => &mut self.energy,
            ActivityCategory::Diet => &mut self.diet,
        }
    }

    pub fn total(&self) -> f64 {
        self.transport + self.energy + self.diet
    }
}
