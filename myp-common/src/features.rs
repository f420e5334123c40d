//! Audio feature schema shared by training and serving
//!
//! The canonical feature order lives in [`FEATURES`]. Training intersects it
//! with the dataset columns and persists the result as the feature-name list;
//! serving assembles positional vectors from that persisted list, never from
//! this table directly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Domain constraint on a single feature value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// Closed interval [0, 1]
    UnitInterval,
    /// Strictly greater than zero
    Positive,
    /// Closed interval [min, max]
    Range { min: f64, max: f64 },
    /// Any finite value
    Unconstrained,
}

impl Constraint {
    /// Whether `value` satisfies the constraint. Non-finite values never do.
    pub fn check(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match *self {
            Constraint::UnitInterval => (0.0..=1.0).contains(&value),
            Constraint::Positive => value > 0.0,
            Constraint::Range { min, max } => (min..=max).contains(&value),
            Constraint::Unconstrained => true,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::UnitInterval => write!(f, "between 0 and 1"),
            Constraint::Positive => write!(f, "greater than 0"),
            Constraint::Range { min, max } => write!(f, "between {} and {}", min, max),
            Constraint::Unconstrained => write!(f, "a finite number"),
        }
    }
}

/// Static description of one model input
#[derive(Debug, Clone, Copy)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub constraint: Constraint,
    pub description: &'static str,
}

/// Canonical feature order
pub const FEATURES: [FeatureSpec; 12] = [
    FeatureSpec {
        name: "acousticness",
        constraint: Constraint::UnitInterval,
        description: "Acousticness (0-1)",
    },
    FeatureSpec {
        name: "danceability",
        constraint: Constraint::UnitInterval,
        description: "Danceability (0-1)",
    },
    FeatureSpec {
        name: "energy",
        constraint: Constraint::UnitInterval,
        description: "Energy (0-1)",
    },
    FeatureSpec {
        name: "instrumentalness",
        constraint: Constraint::UnitInterval,
        description: "Instrumentalness (0-1)",
    },
    FeatureSpec {
        name: "liveness",
        constraint: Constraint::UnitInterval,
        description: "Liveness (0-1)",
    },
    FeatureSpec {
        name: "loudness",
        constraint: Constraint::Unconstrained,
        description: "Loudness in dB (typically -60 to 0)",
    },
    FeatureSpec {
        name: "speechiness",
        constraint: Constraint::UnitInterval,
        description: "Speechiness (0-1)",
    },
    FeatureSpec {
        name: "tempo",
        constraint: Constraint::Positive,
        description: "Tempo in BPM (typically 50-250)",
    },
    FeatureSpec {
        name: "valence",
        constraint: Constraint::UnitInterval,
        description: "Valence/positivity (0-1)",
    },
    FeatureSpec {
        name: "duration_ms",
        constraint: Constraint::Positive,
        description: "Duration in milliseconds",
    },
    FeatureSpec {
        name: "key",
        constraint: Constraint::Range {
            min: 0.0,
            max: 11.0,
        },
        description: "Musical key (0-11)",
    },
    FeatureSpec {
        name: "mode",
        constraint: Constraint::UnitInterval,
        description: "Mode: 0=minor, 1=major",
    },
];

/// Look up a canonical feature by column name
pub fn feature_spec(name: &str) -> Option<&'static FeatureSpec> {
    FEATURES.iter().find(|spec| spec.name == name)
}

/// Canonical feature names in canonical order
pub fn canonical_names() -> impl Iterator<Item = &'static str> {
    FEATURES.iter().map(|spec| spec.name)
}

/// One rejected request field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub field: String,
    /// Submitted value, `None` when the field was absent
    pub value: Option<f64>,
    pub constraint: String,
    pub message: String,
}

impl Violation {
    fn missing(spec: &FeatureSpec) -> Self {
        Self {
            field: spec.name.to_string(),
            value: None,
            constraint: spec.constraint.to_string(),
            message: format!("field '{}' is required", spec.name),
        }
    }

    fn out_of_range(spec: &FeatureSpec, value: f64) -> Self {
        Self {
            field: spec.name.to_string(),
            value: Some(value),
            constraint: spec.constraint.to_string(),
            message: format!("'{}' must be {}, got {}", spec.name, spec.constraint, value),
        }
    }
}

/// Raw prediction request body
///
/// Every field is optional at the decoding stage so that missing fields are
/// reported through [`FeatureInput::validate`] along with range violations.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeatureInput {
    pub acousticness: Option<f64>,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub liveness: Option<f64>,
    pub loudness: Option<f64>,
    pub speechiness: Option<f64>,
    pub tempo: Option<f64>,
    pub valence: Option<f64>,
    pub duration_ms: Option<f64>,
    pub key: Option<f64>,
    pub mode: Option<f64>,
}

impl FeatureInput {
    fn raw(&self, name: &str) -> Option<f64> {
        match name {
            "acousticness" => self.acousticness,
            "danceability" => self.danceability,
            "energy" => self.energy,
            "instrumentalness" => self.instrumentalness,
            "liveness" => self.liveness,
            "loudness" => self.loudness,
            "speechiness" => self.speechiness,
            "tempo" => self.tempo,
            "valence" => self.valence,
            "duration_ms" => self.duration_ms,
            "key" => self.key,
            "mode" => self.mode,
            _ => None,
        }
    }

    /// Check every field against its constraint
    ///
    /// Violations are returned in canonical feature order, so the first entry
    /// is the first offending field.
    pub fn validate(&self) -> std::result::Result<FeatureVector, Vec<Violation>> {
        let mut values = [0.0; FEATURES.len()];
        let mut violations = Vec::new();

        for (slot, spec) in values.iter_mut().zip(FEATURES.iter()) {
            match self.raw(spec.name) {
                None => violations.push(Violation::missing(spec)),
                Some(value) if !spec.constraint.check(value) => {
                    violations.push(Violation::out_of_range(spec, value))
                }
                Some(value) => *slot = value,
            }
        }

        if violations.is_empty() {
            Ok(FeatureVector { values })
        } else {
            Err(violations)
        }
    }
}

/// Validated feature values, stored in canonical order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURES.len()],
}

impl FeatureVector {
    /// Value of a canonical feature by name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURES
            .iter()
            .position(|spec| spec.name == name)
            .map(|idx| self.values[idx])
    }

    /// Positional model input following `order`
    ///
    /// `order` is the persisted feature-name list, not the canonical order.
    pub fn assemble(&self, order: &[String]) -> Result<Vec<f64>> {
        order
            .iter()
            .map(|name| {
                self.get(name)
                    .ok_or_else(|| Error::InvalidInput(format!("unknown feature '{}'", name)))
            })
            .collect()
    }
}
