// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CO2e calculation for a single normalized activity.
//!
//! The calculator performs no validation: a missing or non-finite quantity
//! produces a non-finite result, which callers must check before persisting.

use crate::models::{EmissionFactors, TransportMode};

/// Decimal places kept on a computed emissions value.
pub const CO2E_DECIMALS: i32 = 3;

/// Calculation shape of an activity.
///
/// Diet servings are nested under [`Servings`]; the natural gas quantity is
/// always present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalculationInput {
    Transport { mode: TransportMode, distance: f64 },
    Energy { electricity: f64, natural_gas: f64 },
    Diet { servings: Servings },
}

/// Serving counts per food type.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Servings {
    pub beef: f64,
    pub chicken: f64,
    pub vegetarian: f64,
}

/// Compute kg CO2e for an activity, rounded to [`CO2E_DECIMALS`] places.
pub fn calculate_co2e(input: &CalculationInput, factors: &EmissionFactors) -> f64 {
    let co2e = match *input {
        CalculationInput::Transport { mode, distance } => {
            distance * factors.transport.per_km(mode)
        }
        CalculationInput::Energy {
            electricity,
            natural_gas,
        } => electricity * factors.energy.electricity + natural_gas * factors.energy.natural_gas,
        CalculationInput::Diet { servings } => {
            servings.beef * factors.diet.beef
                + servings.chicken * factors.diet.chicken
                + servings.vegetarian * factors.diet.vegetarian
        }
    };

    round_to(co2e, CO2E_DECIMALS)
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
