// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity model for storage, input validation and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationErrors};

use crate::models::EmissionFactors;
use crate::services::{calculator, normalizer};

/// Activity category. Declaration order is the tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Transport,
    Energy,
    Diet,
}

impl ActivityCategory {
    /// All categories in priority order (`transport > energy > diet`).
    pub const ALL: [ActivityCategory; 3] = [
        ActivityCategory::Transport,
        ActivityCategory::Energy,
        ActivityCategory::Diet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Transport => "transport",
            ActivityCategory::Energy => "energy",
            ActivityCategory::Diet => "diet",
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Travel mode for transport activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Car,
    Bus,
    Train,
    Bike,
    Walk,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Car => "car",
            TransportMode::Bus => "bus",
            TransportMode::Train => "train",
            TransportMode::Bike => "bike",
            TransportMode::Walk => "walk",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category-specific quantities of a stored activity.
///
/// This is the persisted (flat) shape: diet servings are top-level fields so
/// the stored document stays directly queryable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum ActivityDetails {
    Transport {
        mode: TransportMode,
        /// Distance in kilometers
        distance: f64,
    },
    Energy {
        /// Electricity consumed in kWh
        electricity: f64,
        /// Natural gas consumed in m³
        #[serde(rename = "naturalGas", default)]
        natural_gas: f64,
    },
    Diet {
        #[serde(default)]
        beef: f64,
        #[serde(default)]
        chicken: f64,
        #[serde(default)]
        vegetarian: f64,
    },
}

impl ActivityDetails {
    pub fn category(&self) -> ActivityCategory {
        match self {
            ActivityDetails::Transport { .. } => ActivityCategory::Transport,
            ActivityDetails::Energy { .. } => ActivityCategory::Energy,
            ActivityDetails::Diet { .. } => ActivityCategory::Diet,
        }
    }
}

/// Stored activity record.
///
/// Stored at: `activities/{auto_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Document ID, assigned by the store on insert
    #[serde(
        default,
        alias = "_firestore_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Owning user ID
    pub user_id: String,
    /// When the activity occurred or was logged
    #[serde(with = "crate::time_utils::rfc3339_seconds")]
    pub date: DateTime<Utc>,
    /// Emissions in kg CO2e (always derived)
    pub co2e: f64,
    #[serde(flatten)]
    pub details: ActivityDetails,
}

impl Activity {
    pub fn category(&self) -> ActivityCategory {
        self.details.category()
    }

    /// Recompute `co2e` from the stored quantities against a factor table.
    pub fn recalculate(&mut self, factors: &EmissionFactors) {
        let input = self.details.to_calculation_input();
        self.co2e = calculator::calculate_co2e(&input, factors);
    }
}

// ─── Input ───────────────────────────────────────────────────

/// Raw user input for logging an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum ActivityInput {
    Transport(TransportInput),
    Energy(EnergyInput),
    Diet(DietInput),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TransportInput {
    pub mode: TransportMode,
    #[validate(range(min = 0.1, message = "Distance must be positive"))]
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EnergyInput {
    #[validate(range(min = 0.0, message = "Electricity usage cannot be negative"))]
    pub electricity: f64,
    #[serde(rename = "naturalGas", default)]
    #[validate(range(min = 0.0, message = "Natural gas usage cannot be negative"))]
    pub natural_gas: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct DietInput {
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Beef servings cannot be negative"))]
    pub beef: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Chicken servings cannot be negative"))]
    pub chicken: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Vegetarian servings cannot be negative"))]
    pub vegetarian: Option<f64>,
}

impl ActivityInput {
    pub fn category(&self) -> ActivityCategory {
        match self {
            ActivityInput::Transport(_) => ActivityCategory::Transport,
            ActivityInput::Energy(_) => ActivityCategory::Energy,
            ActivityInput::Diet(_) => ActivityCategory::Diet,
        }
    }

    pub fn transport(mode: TransportMode, distance: f64) -> Self {
        ActivityInput::Transport(TransportInput { mode, distance })
    }

    pub fn energy(electricity: f64, natural_gas: Option<f64>) -> Self {
        ActivityInput::Energy(EnergyInput {
            electricity,
            natural_gas,
        })
    }

    pub fn diet(beef: f64, chicken: f64, vegetarian: f64) -> Self {
        ActivityInput::Diet(DietInput {
            beef: Some(beef),
            chicken: Some(chicken),
            vegetarian: Some(vegetarian),
        })
    }
}

impl Validate for ActivityInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            ActivityInput::Transport(input) => input.validate(),
            ActivityInput::Energy(input) => input.validate(),
            ActivityInput::Diet(input) => input.validate(),
        }
    }
}

impl From<&ActivityInput> for ActivityDetails {
    fn from(input: &ActivityInput) -> Self {
        normalizer::to_persisted_details(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_activity_serializes_flat() {
        let activity = Activity {
            id: None,
            user_id: "user-1".to_string(),
            date: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            co2e: 22.0,
            details: ActivityDetails::Diet {
                beef: 1.0,
                chicken: 2.0,
                vegetarian: 1.0,
            },
        };

        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "userId": "user-1",
                "date": "2024-01-15T10:00:00Z",
                "co2e": 22.0,
                "category": "diet",
                "beef": 1.0,
                "chicken": 2.0,
                "vegetarian": 1.0,
            })
        );
    }

    #[test]
    fn test_activity_reads_store_id_and_defaults_gas() {
        let activity: Activity = serde_json::from_value(serde_json::json!({
            "_firestore_id": "abc123",
            "userId": "user-1",
            "date": "2024-01-15T10:00:00Z",
            "co2e": 3.495,
            "category": "energy",
            "electricity": 15.0,
        }))
        .unwrap();

        assert_eq!(activity.id.as_deref(), Some("abc123"));
        assert_eq!(activity.category(), ActivityCategory::Energy);
        assert_eq!(
            activity.details,
            ActivityDetails::Energy {
                electricity: 15.0,
                natural_gas: 0.0
            }
        );
    }

    #[test]
    fn test_input_parses_by_category_tag() {
        let input: ActivityInput = serde_json::from_value(serde_json::json!({
            "category": "transport",
            "mode": "train",
            "distance": 50,
        }))
        .unwrap();
        assert_eq!(input, ActivityInput::transport(TransportMode::Train, 50.0));

        let input: ActivityInput =
            serde_json::from_value(serde_json::json!({ "category": "diet", "beef": 2 })).unwrap();
        assert_eq!(
            input,
            ActivityInput::Diet(DietInput {
                beef: Some(2.0),
                chicken: None,
                vegetarian: None,
            })
        );
    }

    #[test]
    fn test_input_rejects_unknown_mode() {
        let result: Result<ActivityInput, _> = serde_json::from_value(serde_json::json!({
            "category": "transport",
            "mode": "plane",
            "distance": 500,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rules() {
        assert!(ActivityInput::transport(TransportMode::Car, 0.1).validate().is_ok());
        assert!(ActivityInput::transport(TransportMode::Car, 0.05).validate().is_err());
        assert!(ActivityInput::energy(0.0, None).validate().is_ok());
        assert!(ActivityInput::energy(-1.0, None).validate().is_err());
        assert!(ActivityInput::energy(1.0, Some(-0.5)).validate().is_err());
        assert!(ActivityInput::diet(0.0, 0.0, 0.0).validate().is_ok());
        assert!(ActivityInput::diet(0.0, -1.0, 0.0).validate().is_err());
    }

    #[test]
    fn test_recalculate_tracks_factor_changes() {
        let mut activity = Activity {
            id: Some("a1".to_string()),
            user_id: "user-1".to_string(),
            date: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            co2e: 0.0,
            details: ActivityDetails::Transport {
                mode: TransportMode::Car,
                distance: 20.0,
            },
        };

        let mut factors = EmissionFactors::default();
        activity.recalculate(&factors);
        assert_eq!(activity.co2e, 3.4);

        factors.transport.car = 0.2;
        activity.recalculate(&factors);
        assert_eq!(activity.co2e, 4.0);
    }
}
