//! Hydrologic soil groups and their ordinal encoding.
//!
//! Groups are ranked by infiltration capacity, A best: A=4, B=3, C=2, D=1.
//! Anything unrecognised, and ground no soil polygon covers, is treated as
//! D, the conservative choice for infiltration siting.
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::grid::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HydrologicSoilGroup {
    A,
    B,
    C,
    D,
}

impl HydrologicSoilGroup {
    pub const ALL: [HydrologicSoilGroup; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Ordinal value fed to the soil fuzzy variable.
    pub fn ordinal(self) -> f64 {
        match self {
            Self::A => 4.0,
            Self::B => 3.0,
            Self::C => 2.0,
            Self::D => 1.0,
        }
    }

    /// Parse a survey code. Missing, dual ("A/D") and unknown codes give D.
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(|s| s.trim().to_ascii_uppercase()).as_deref() {
            Some("A") => Self::A,
            Some("B") => Self::B,
            Some("C") => Self::C,
            _ => Self::D,
        }
    }
}

/// Build the soil grid from per-cell groups, row-major. `None` cells are D.
pub fn encode_soil_groups(
    groups: &[Option<HydrologicSoilGroup>],
    rows: usize,
    cols: usize,
    pixel_size: f64,
) -> Result<Grid> {
    if rows.checked_mul(cols) != Some(groups.len()) {
        return Err(Error::InvalidDimensions { rows, cols, len: groups.len() });
    }
    let data = groups
        .iter()
        .map(|g| g.unwrap_or(HydrologicSoilGroup::D).ordinal())
        .collect();
    let grid = Grid::from_vec(rows, cols, pixel_size, data)?;

    for (group, n) in count_soil_groups(&grid) {
        info!(
            group = ?group,
            cells = n,
            percent = n as f64 / grid.len() as f64 * 100.0,
            "soil group coverage"
        );
    }
    Ok(grid)
}

/// Cells per group in an encoded soil grid. Values off the ordinal scale
/// are not counted.
pub fn count_soil_groups(soil: &Grid) -> [(HydrologicSoilGroup, usize); 4] {
    HydrologicSoilGroup::ALL.map(|g| {
        let n = soil.data().iter().filter(|&&v| v == g.ordinal()).count();
        (g, n)
    })
}
