//! Generic fuzzy inference: trapezoidal fuzzification, min-AND rule firing
//! and weighted-average defuzzification over grids.
pub mod config;
pub mod engine;
pub mod membership;
pub mod rules;
pub mod variable;

pub use config::{CategoryConfig, FisConfig, RuleConfig, VariableConfig};
pub use engine::FuzzySystem;
pub use membership::{trapezoidal_membership, Trapezoid};
pub use rules::{FuzzyRule, RuleBase};
pub use variable::{Category, FuzzySet, FuzzyVariable};
