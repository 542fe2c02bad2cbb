// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod activity;
pub mod factors;
pub mod stats;

pub use activity::{
    Activity, ActivityCategory, ActivityDetails, ActivityInput, DietInput, EnergyInput,
    TransportInput, TransportMode,
};
pub use factors::{EmissionFactors, DEFAULT_FACTORS_VERSION};
pub use stats::{CategoryTotal, DailyEmissions, WeeklyStats, CHART_DAYS};
