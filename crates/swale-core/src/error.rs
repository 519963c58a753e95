//! Error types for the siting engine.
//!
//! Only structural problems are errors: mismatched grids, malformed
//! membership functions and rule tables. Numeric degeneracy inside valid
//! input (flat terrain, cells no rule fires for) is absorbed in-band.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "grid shape mismatch: expected {expected_rows}x{expected_cols} @ {expected_pixel}, \
         got {rows}x{cols} @ {pixel}"
    )]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        expected_pixel: f64,
        rows: usize,
        cols: usize,
        pixel: f64,
    },

    #[error("invalid membership for {variable}/{label}: {params:?} must satisfy a <= b <= c <= d")]
    InvalidMembership {
        variable: String,
        label: String,
        params: [f64; 4],
    },

    #[error("invalid grid dimensions: {rows}x{cols} with {len} values")]
    InvalidDimensions { rows: usize, cols: usize, len: usize },

    #[error("pixel size must be finite and positive, got {0}")]
    InvalidPixelSize(f64),

    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("variable {variable} has no category {label:?}")]
    UnknownCategory { variable: String, label: String },

    #[error("rule {rule}: category id {id} out of range for {variable} ({count} categories)")]
    CategoryOutOfRange {
        rule: usize,
        variable: String,
        id: usize,
        count: usize,
    },

    #[error("rule {rule}: expected {expected} antecedents, got {actual}")]
    RuleArity {
        rule: usize,
        expected: usize,
        actual: usize,
    },

    #[error("expected {expected} fuzzy variables, got {actual}")]
    VariableCount { expected: usize, actual: usize },

    #[error("configuration parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
