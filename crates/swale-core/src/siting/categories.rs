//! Linguistic categories of the two siting stages.
//!
//! Default membership corners are in the input's own units: degrees for
//! slope, the ordinal soil scale (D=1 … A=4), `[0, 1]` for suitability and
//! impervious fraction, and raw index values for TWI.
use serde::{Deserialize, Serialize};

use crate::fuzzy::Category;

/// Slope class (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlopeClass {
    Flat,
    Ideal,
    Moderate,
    Steep,
}

impl Category for SlopeClass {
    const VARIABLE: &'static str = "slope";
    const ALL: &'static [Self] = &[Self::Flat, Self::Ideal, Self::Moderate, Self::Steep];

    fn label(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Ideal => "ideal",
            Self::Moderate => "moderate",
            Self::Steep => "steep",
        }
    }

    fn default_params(self) -> [f64; 4] {
        match self {
            Self::Flat => [0.0, 0.0, 0.3, 0.8],
            Self::Ideal => [0.3, 0.8, 2.0, 3.5],
            Self::Moderate => [2.0, 3.5, 5.0, 8.0],
            Self::Steep => [5.0, 8.0, 25.0, 25.0],
        }
    }

    fn id(self) -> usize {
        self as usize
    }
}

/// Infiltration class on the ordinal soil-group scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilClass {
    /// Group D.
    Poor,
    /// Group C.
    Marginal,
    /// Group B.
    Good,
    /// Group A.
    Excellent,
}

impl Category for SoilClass {
    const VARIABLE: &'static str = "soil";
    const ALL: &'static [Self] = &[Self::Poor, Self::Marginal, Self::Good, Self::Excellent];

    fn label(self) -> &'static str {
        match self {
            Self::Poor => "poor",
            Self::Marginal => "marginal",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }

    fn default_params(self) -> [f64; 4] {
        match self {
            Self::Poor => [0.5, 1.0, 1.0, 1.5],
            Self::Marginal => [1.5, 2.0, 2.0, 2.5],
            Self::Good => [2.5, 3.0, 3.0, 3.5],
            Self::Excellent => [3.5, 4.0, 4.0, 4.5],
        }
    }

    fn id(self) -> usize {
        self as usize
    }
}

/// Stage-1 suitability as a stage-2 input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuitabilityClass {
    Low,
    Moderate,
    Good,
    High,
}

impl Category for SuitabilityClass {
    const VARIABLE: &'static str = "suitability";
    const ALL: &'static [Self] = &[Self::Low, Self::Moderate, Self::Good, Self::High];

    fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::Good => "good",
            Self::High => "high",
        }
    }

    fn default_params(self) -> [f64; 4] {
        match self {
            Self::Low => [0.0, 0.0, 0.2, 0.35],
            Self::Moderate => [0.2, 0.35, 0.5, 0.65],
            Self::Good => [0.35, 0.55, 0.7, 0.85],
            Self::High => [0.65, 0.8, 1.0, 1.0],
        }
    }

    fn id(self) -> usize {
        self as usize
    }
}

/// Share of sealed surface in the neighbourhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImperviousClass {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl Category for ImperviousClass {
    const VARIABLE: &'static str = "impervious";
    const ALL: &'static [Self] = &[Self::Low, Self::Moderate, Self::High, Self::VeryHigh];

    fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::VeryHigh => "very_high",
        }
    }

    fn default_params(self) -> [f64; 4] {
        match self {
            Self::Low => [0.0, 0.0, 0.15, 0.30],
            Self::Moderate => [0.15, 0.30, 0.50, 0.65],
            Self::High => [0.40, 0.60, 0.80, 0.90],
            Self::VeryHigh => [0.75, 0.90, 1.0, 1.0],
        }
    }

    fn id(self) -> usize {
        self as usize
    }
}

/// Topographic wetness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WetnessClass {
    Low,
    Moderate,
    High,
}

impl Category for WetnessClass {
    const VARIABLE: &'static str = "wetness";
    const ALL: &'static [Self] = &[Self::Low, Self::Moderate, Self::High];

    fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }

    fn default_params(self) -> [f64; 4] {
        match self {
            Self::Low => [2.0, 2.0, 5.0, 6.0],
            Self::Moderate => [5.0, 6.0, 7.5, 9.0],
            Self::High => [7.5, 9.0, 18.0, 18.0],
        }
    }

    fn id(self) -> usize {
        self as usize
    }
}
