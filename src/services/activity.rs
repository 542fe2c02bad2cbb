// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity logging service.
//!
//! Handles the core workflow:
//! 1. Validate the raw input
//! 2. Normalize it into calculation and storage shapes
//! 3. Load the active emission factors
//! 4. Calculate CO2e and reject non-finite results
//! 5. Store the record

use chrono::{DateTime, Duration, Utc};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use validator::Validate;

use crate::db::ActivityStore;
use crate::error::{AppError, Result};
use crate::models::{Activity, ActivityInput, EmissionFactors, TransportMode};
use crate::services::calculator::calculate_co2e;
use crate::services::normalizer;
use crate::services::FactorProvider;

/// Maximum concurrent store writes when seeding.
const MAX_CONCURRENT_DB_OPS: usize = 8;

/// Logs activities against the active emission factor table.
#[derive(Clone)]
pub struct ActivityLogger {
    store: Arc<dyn ActivityStore>,
    factors: Arc<dyn FactorProvider>,
    factors_version: String,
}

impl ActivityLogger {
    pub fn new(
        store: Arc<dyn ActivityStore>,
        factors: Arc<dyn FactorProvider>,
        factors_version: impl Into<String>,
    ) -> Self {
        Self {
            store,
            factors,
            factors_version: factors_version.into(),
        }
    }

    /// Log one activity for a user, dated now.
    pub async fn log_activity(&self, user_id: &str, input: ActivityInput) -> Result<Activity> {
        input.validate()?;

        let factors = self.factors.get_factors(&self.factors_version).await?;
        let mut activity = build_activity(user_id, &input, &factors, Utc::now())?;

        let id = self.store.add_activity(&activity).await?;
        activity.id = Some(id);

        tracing::info!(
            user_id,
            activity_id = activity.id.as_deref(),
            category = %activity.category(),
            co2e = activity.co2e,
            "Logged activity"
        );

        Ok(activity)
    }

    /// Insert the demo data set, dated relative to `today_start`.
    ///
    /// Returns the number of records written.
    pub async fn seed_activities(&self, user_id: &str, today_start: DateTime<Utc>) -> Result<usize> {
        let factors = self.factors.get_factors(&self.factors_version).await?;

        let activities = seed_inputs()
            .into_iter()
            .map(|(days_ago, input)| {
                build_activity(user_id, &input, &factors, today_start - Duration::days(days_ago))
            })
            .collect::<Result<Vec<_>>>()?;

        let store = &self.store;
        let written = stream::iter(activities)
            .map(|activity| async move { store.add_activity(&activity).await })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<String>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<String>>>()?
            .len();

        tracing::info!(user_id, count = written, "Seeded demo activities");

        Ok(written)
    }
}

/// Build a stored activity from validated input.
///
/// Fails with `AppError::Calculation` when the result is not a finite number.
pub fn build_activity(
    user_id: &str,
    input: &ActivityInput,
    factors: &EmissionFactors,
    date: DateTime<Utc>,
) -> Result<Activity> {
    let calculation = normalizer::to_calculation_input(input);
    let co2e = calculate_co2e(&calculation, factors);

    if !co2e.is_finite() {
        tracing::error!(
            user_id,
            category = %input.category(),
            input = ?calculation,
            "CO2e calculation produced a non-finite value"
        );
        return Err(AppError::Calculation);
    }

    Ok(Activity {
        id: None,
        user_id: user_id.to_string(),
        date,
        co2e,
        details: normalizer::to_persisted_details(input),
    })
}

/// Demo data: (days before today, input). Seven entries fall in the previous
/// week and eight in the current one.
fn seed_inputs() -> Vec<(i64, ActivityInput)> {
    vec![
        (8, ActivityInput::transport(TransportMode::Car, 20.0)),
        (8, ActivityInput::energy(15.0, Some(5.0))),
        (9, ActivityInput::diet(1.0, 2.0, 1.0)),
        (10, ActivityInput::transport(TransportMode::Bus, 10.0)),
        (11, ActivityInput::diet(0.0, 3.0, 2.0)),
        (12, ActivityInput::transport(TransportMode::Train, 50.0)),
        (13, ActivityInput::energy(12.0, Some(0.0))),
        (1, ActivityInput::diet(2.0, 1.0, 1.0)),
        (1, ActivityInput::transport(TransportMode::Car, 15.0)),
        (2, ActivityInput::energy(18.0, Some(6.0))),
        (3, ActivityInput::diet(0.0, 2.0, 3.0)),
        (4, ActivityInput::transport(TransportMode::Walk, 3.0)),
        (5, ActivityInput::energy(14.0, Some(4.0))),
        (6, ActivityInput::diet(1.0, 0.0, 4.0)),
        (0, ActivityInput::transport(TransportMode::Car, 25.0)),
    ]
}
