// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity normalization.
//!
//! Validated input is reshaped twice: into the calculator's shape (diet
//! servings nested) and into the stored shape (diet servings flat). Both
//! carry the same numbers; only the structure differs.

use crate::models::{ActivityDetails, ActivityInput, DietInput};
use crate::services::calculator::{CalculationInput, Servings};

/// Input → calculation shape.
pub fn to_calculation_input(input: &ActivityInput) -> CalculationInput {
    match input {
        ActivityInput::Transport(t) => CalculationInput::Transport {
            mode: t.mode,
            distance: t.distance,
        },
        ActivityInput::Energy(e) => CalculationInput::Energy {
            electricity: e.electricity,
            natural_gas: e.natural_gas.unwrap_or(0.0),
        },
        ActivityInput::Diet(d) => CalculationInput::Diet {
            servings: servings_from(d),
        },
    }
}

/// Input → persisted shape.
pub fn to_persisted_details(input: &ActivityInput) -> ActivityDetails {
    match input {
        ActivityInput::Transport(t) => ActivityDetails::Transport {
            mode: t.mode,
            distance: t.distance,
        },
        ActivityInput::Energy(e) => ActivityDetails::Energy {
            electricity: e.electricity,
            natural_gas: e.natural_gas.unwrap_or(0.0),
        },
        ActivityInput::Diet(d) => {
            let servings = servings_from(d);
            ActivityDetails::Diet {
                beef: servings.beef,
                chicken: servings.chicken,
                vegetarian: servings.vegetarian,
            }
        }
    }
}

fn servings_from(input: &DietInput) -> Servings {
    Servings {
        beef: input.beef.unwrap_or(0.0),
        chicken: input.chicken.unwrap_or(0.0),
        vegetarian: input.vegetarian.unwrap_or(0.0),
    }
}

impl ActivityDetails {
    /// Stored (flat) shape → calculation shape.
    pub fn to_calculation_input(&self) -> CalculationInput {
        match *self {
            ActivityDetails::Transport { mode, distance } => {
                CalculationInput::Transport { mode, distance }
            }
            ActivityDetails::Energy {
                electricity,
                natural_gas,
            } => CalculationInput::Energy {
                electricity,
                natural_gas,
            },
            ActivityDetails::Diet {
                beef,
                chicken,
                vegetarian,
            } => CalculationInput::Diet {
                servings: Servings {
                    beef,
                    chicken,
                    vegetarian,
                },
            },
        }
    }
}
