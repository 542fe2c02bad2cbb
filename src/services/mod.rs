// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod aggregation;
pub mod ai_tips;
pub mod calculator;
pub mod factors;
pub mod normalizer;
pub mod tips;

pub use activity::ActivityLogger;
pub use ai_tips::{GeminiTipsClient, TipsError, TipsProvider, TipsRequest, TipsResponse};
pub use calculator::{calculate_co2e, CalculationInput, Servings};
pub use factors::{FactorProvider, StaticFactorProvider};
pub use tips::{TipSelection, TipSource, TipsOutcome, TipsService};
