// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reduction tips: AI context formatting, fallback selection and
//! anti-repetition.
//!
//! The AI collaborator is always raced against a local timeout. Any outcome
//! other than a non-empty tip list falls back to the general pool, so the
//! caller never sees a hard failure.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Activity, ActivityDetails};
use crate::services::ai_tips::{TipsProvider, TipsRequest};

/// Activities included in the AI summary.
pub const DEFAULT_SUMMARY_LIMIT: usize = 15;

/// Summary used when there is nothing to summarize.
pub const NO_ACTIVITY_SUMMARY: &str = "No activities logged recently.";

/// General suggestions used when personalized tips are unavailable.
pub const GENERAL_TIPS_POOL: [&str; 8] = [
    "Consider using public transit, biking, or carpooling to cut transportation emissions.",
    "Reduce electricity usage by turning off unused devices and using energy-efficient lighting.",
    "Add more plant-based meals this week to lower diet-related emissions.",
    "Lower your thermostat by 1-2°C and wear a sweater to save energy.",
    "Wash clothes on cold and line-dry when possible to reduce drying energy.",
    "Combine errands into one trip to reduce total driving distance.",
    "Unplug chargers and electronics when not in use to prevent standby power draw.",
    "Plan a meat-free day once or twice a week to cut diet emissions.",
];

/// Result of asking the AI collaborator for tips.
#[derive(Debug, Clone, PartialEq)]
pub enum TipsOutcome {
    Ready(Vec<String>),
    TimedOut,
    Failed(String),
}

/// Where the displayed tips came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum TipSource {
    Personalized,
    General,
}

/// Tips chosen for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TipSelection {
    pub tips: Vec<String>,
    pub source: TipSource,
}

// ─── Formatting ──────────────────────────────────────────────

/// Render the most recent `limit` activities (input is newest first) as the
/// AI context summary.
pub fn format_summary(activities: &[Activity], limit: usize) -> String {
    let recent = &activities[..activities.len().min(limit)];
    if recent.is_empty() {
        return NO_ACTIVITY_SUMMARY.to_string();
    }

    let lines: Vec<String> = recent.iter().map(summary_line).collect();
    format!("User's recent activities:\n{}", lines.join("\n"))
}

fn summary_line(activity: &Activity) -> String {
    match &activity.details {
        ActivityDetails::Transport { mode, distance } => format!(
            "- Transport: Traveled {} km by {}. CO2e: {:.2} kg.",
            distance, mode, activity.co2e
        ),
        ActivityDetails::Energy {
            electricity,
            natural_gas,
        } => format!(
            "- Energy: Used {} kWh of electricity and {} m³ of natural gas. CO2e: {:.2} kg.",
            electricity, natural_gas, activity.co2e
        ),
        ActivityDetails::Diet {
            beef,
            chicken,
            vegetarian,
        } => format!(
            "- Diet: Ate {} servings of beef, {} of chicken, and {} vegetarian. CO2e: {:.2} kg.",
            beef, chicken, vegetarian, activity.co2e
        ),
    }
}

// ─── Selection ───────────────────────────────────────────────

/// Random sample of the general pool, without replacement.
pub fn sample_general_tips<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<String> {
    GENERAL_TIPS_POOL
        .choose_multiple(rng, count)
        .map(|tip| tip.to_string())
        .collect()
}

/// Choose the tips to display for an AI outcome.
///
/// Falls back to the general pool unless the outcome carries at least one
/// tip, then makes sure the result visibly differs from `previous`.
pub fn select_tips<R: Rng + ?Sized>(
    outcome: &TipsOutcome,
    previous: &[String],
    count: usize,
    rng: &mut R,
) -> TipSelection {
    let (candidate, source) = match outcome {
        TipsOutcome::Ready(tips) if !tips.is_empty() => (tips.clone(), TipSource::Personalized),
        _ => (sample_general_tips(count, rng), TipSource::General),
    };

    TipSelection {
        tips: ensure_perceived_change(previous, candidate, rng),
        source,
    }
}

/// Return `next`, altered if it has the same content as `previous`.
///
/// Content is compared case- and punctuation-insensitively, in either the
/// same order or as a set. The last tip is swapped for an unused pool entry;
/// if every pool entry is already shown the order is changed instead.
pub fn ensure_perceived_change<R: Rng + ?Sized>(
    previous: &[String],
    mut next: Vec<String>,
    rng: &mut R,
) -> Vec<String> {
    if next.is_empty() {
        return next;
    }

    let prev_norm: Vec<String> = previous.iter().map(|s| normalize_tip(s)).collect();
    let next_norm: Vec<String> = next.iter().map(|s| normalize_tip(s)).collect();

    let equal_order = prev_norm == next_norm;
    let same_set =
        prev_norm.len() == next_norm.len() && prev_norm.iter().all(|p| next_norm.contains(p));
    if !equal_order && !same_set {
        return next;
    }

    let unused: Vec<&str> = GENERAL_TIPS_POOL
        .iter()
        .copied()
        .filter(|tip| !next_norm.contains(&normalize_tip(tip)))
        .collect();

    if let Some(replacement) = unused.choose(rng) {
        if let Some(last) = next.last_mut() {
            *last = replacement.to_string();
        }
        return next;
    }

    reorder(&prev_norm, next, rng)
}

/// Shuffle until the normalized order differs from `previous`; rotate as a
/// last resort so the result is never the same sequence.
fn reorder<R: Rng + ?Sized>(previous: &[String], mut tips: Vec<String>, rng: &mut R) -> Vec<String> {
    const MAX_SHUFFLES: usize = 8;

    let differs = |tips: &[String]| {
        tips.iter()
            .map(|s| normalize_tip(s))
            .ne(previous.iter().cloned())
    };

    for _ in 0..MAX_SHUFFLES {
        tips.shuffle(rng);
        if differs(&tips) {
            return tips;
        }
    }
    tips.rotate_left(1);
    tips
}

/// Lowercase, drop punctuation, collapse whitespace.
pub fn normalize_tip(tip: &str) -> String {
    let cleaned: String = tip
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ─── Service ─────────────────────────────────────────────────

/// Tips service: bounded AI call plus local fallback.
#[derive(Clone)]
pub struct TipsService {
    provider: Option<Arc<dyn TipsProvider>>,
    timeout: Duration,
    tip_count: usize,
    summary_limit: usize,
}

impl TipsService {
    pub fn new(provider: Option<Arc<dyn TipsProvider>>, timeout: Duration, tip_count: usize) -> Self {
        Self {
            provider,
            timeout,
            tip_count,
            summary_limit: DEFAULT_SUMMARY_LIMIT,
        }
    }

    /// Ask the provider for tips, bounded by the configured timeout.
    ///
    /// A late response is dropped with the losing future.
    pub async fn request(&self, activity_summary: String) -> TipsOutcome {
        let Some(provider) = &self.provider else {
            return TipsOutcome::Failed("tips provider not configured".to_string());
        };

        let request = TipsRequest {
            activity_summary,
            randomizer: Some(rand::random::<f64>()),
        };

        match tokio::time::timeout(self.timeout, provider.suggest(request)).await {
            Ok(Ok(response)) => TipsOutcome::Ready(response.tips),
            Ok(Err(e)) => TipsOutcome::Failed(e.to_string()),
            Err(_) => TipsOutcome::TimedOut,
        }
    }

    /// Produce display tips for a user's activities (newest first).
    pub async fn suggest(&self, activities: &[Activity], previous: &[String]) -> TipSelection {
        let summary = format_summary(activities, self.summary_limit);
        let outcome = self.request(summary).await;

        match &outcome {
            TipsOutcome::Ready(tips) => {
                tracing::debug!(count = tips.len(), "Received personalized tips")
            }
            TipsOutcome::TimedOut => {
                tracing::warn!(timeout = ?self.timeout, "Tips request timed out, using general tips")
            }
            TipsOutcome::Failed(reason) => {
                tracing::warn!(reason = %reason, "Tips request failed, using general tips")
            }
        }

        select_tips(&outcome, previous, self.tip_count, &mut rand::thread_rng())
    }
}
