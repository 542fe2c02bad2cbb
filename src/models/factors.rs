// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Emission factor tables.
//!
//! A table is a snapshot: it is loaded once per calculation context and
//! shared read-only. Coefficients missing from a loaded table read as zero.

use serde::{Deserialize, Serialize};

use crate::models::TransportMode;

/// Version tag of the built-in factor table.
pub const DEFAULT_FACTORS_VERSION: &str = "v1";

/// Versioned coefficient table (kg CO2e per unit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionFactors {
    pub version: String,
    #[serde(default)]
    pub transport: TransportFactors,
    #[serde(default)]
    pub energy: EnergyFactors,
    #[serde(default)]
    pub diet: DietFactors,
}

/// kg CO2e per km, by travel mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportFactors {
    pub car: f64,
    pub bus: f64,
    pub train: f64,
    pub bike: f64,
    pub walk: f64,
}

impl TransportFactors {
    pub fn per_km(&self, mode: TransportMode) -> f64 {
        match mode {
            TransportMode::Car => self.car,
            TransportMode::Bus => self.bus,
            TransportMode::Train => self.train,
            TransportMode::Bike => self.bike,
            TransportMode::Walk => self.walk,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnergyFactors {
    /// kg CO2e per kWh
    pub electricity: f64,
    /// kg CO2e per m³
    pub natural_gas: f64,
}

/// kg CO2e per serving (~100g).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DietFactors {
    pub beef: f64,
    pub chicken: f64,
    pub vegetarian: f64,
}

impl EmissionFactors {
    /// Built-in `v1` table.
    pub fn v1() -> Self {
        Self {
            version: DEFAULT_FACTORS_VERSION.to_string(),
            transport: TransportFactors {
                car: 0.17, // petrol car
                bus: 0.08,
                train: 0.04,
                bike: 0.0,
                walk: 0.0,
            },
            energy: EnergyFactors {
                electricity: 0.233, // UK grid
                natural_gas: 2.05,
            },
            diet: DietFactors {
                beef: 14.0,
                chicken: 3.5,
                vegetarian: 1.0,
            },
        }
    }
}

impl Default for EmissionFactors {
    fn default() -> Self {
        Self::v1()
    }
}
