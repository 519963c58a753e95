//! Terrain derivatives: slope, D8 flow and wetness from one elevation grid.
mod gradient;
pub mod slope;

use tracing::info;

use crate::error::Result;
use crate::grid::Grid;
use crate::hydrology::flow_routing::{FlowDirectionGrid, SinkReport};
use crate::hydrology::{compute_d8_flow, wetness::compute_twi};
pub use slope::{compute_slope, SlopeResult};

/// The four terrain outputs plus the sink report.
pub struct TerrainResult {
    pub slope_deg: Grid,
    pub slope_rad: Grid,
    pub directions: FlowDirectionGrid,
    pub accumulation: Grid,
    pub twi: Grid,
    pub sinks: SinkReport,
}

/// Derive slope, flow direction, accumulation and TWI from `elevation`.
///
/// Steps:
/// 1. Slope (degrees and radians).
/// 2. D8 flow direction.
/// 3. Flow accumulation.
/// 4. TWI from accumulation and slope in radians.
pub fn derive_terrain(elevation: &Grid) -> Result<TerrainResult> {
    info!(rows = elevation.rows(), cols = elevation.cols(), pixel = elevation.pixel_size(), "deriving terrain");

    let SlopeResult { degrees, radians } = compute_slope(elevation);
    let flow = compute_d8_flow(elevation)?;
    let twi = compute_twi(&flow.accumulation, &radians)?;

    Ok(TerrainResult {
        slope_deg: degrees,
        slope_rad: radians,
        directions: flow.directions,
        accumulation: flow.accumulation,
        twi,
        sinks: flow.sinks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrology::flow_routing::Direction;

    #[test]
    fn outputs_share_elevation_shape() {
        let dem = Grid::from_fn(9, 7, 2.0, |r, c| (r * r + c) as f64).unwrap();
        let t = derive_terrain(&dem).unwrap();
        for g in [&t.slope_deg, &t.slope_rad, &t.accumulation, &t.twi] {
            assert!(g.same_shape(&dem));
        }
        assert_eq!(t.directions.rows(), 9);
        assert_eq!(t.directions.cols(), 7);
    }

    #[test]
    fn depression_scenario() {
        let dem = Grid::from_rows(&[[5.0, 5.0, 5.0], [5.0, 1.0, 5.0], [5.0, 5.0, 5.0]], 1.0).unwrap();
        let t = derive_terrain(&dem).unwrap();
        assert_eq!(t.directions.get(1, 1), Direction::Sink);
        assert_eq!(t.accumulation.get(1, 1), 9.0);
        assert!(t.twi.data().iter().all(|v| v.is_finite()));
    }
}
