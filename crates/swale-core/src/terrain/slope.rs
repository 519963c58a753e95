//! Slope magnitude from a central-difference gradient.
//!
//! `slope = atan(√(dz_dx² + dz_dy²))`, reported in degrees. The radian grid is
//! kept alongside so the wetness index can reuse it without a round trip
//! through degrees.
use tracing::info;

use super::gradient::central_gradient;
use crate::grid::Grid;
use crate::maybe_rayon::*;

pub struct SlopeResult {
    /// Slope angle in degrees, `[0, 90)`.
    pub degrees: Grid,
    /// Slope angle in radians, `[0, π/2)`.
    pub radians: Grid,
}

/// Compute slope over every cell of `elevation`.
///
/// Nodata cells (NaN or the grid's sentinel) yield NaN, and so does every
/// cell whose difference stencil touches one. Nothing is zeroed.
pub fn compute_slope(elevation: &Grid) -> SlopeResult {
    let z = elevation.with_nan_nodata();
    let (rows, cols) = (z.rows(), z.cols());

    let radians: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|r| {
            let mut row = vec![f64::NAN; cols];
            for (c, out) in row.iter_mut().enumerate() {
                if z.get(r, c).is_nan() {
                    continue;
                }
                let (dz_dx, dz_dy) = central_gradient(&z, r, c);
                *out = (dz_dx * dz_dx + dz_dy * dz_dy).sqrt().atan();
            }
            row
        })
        .collect();

    let degrees: Vec<f64> = radians.iter().map(|s| s.to_degrees()).collect();

    let result = SlopeResult {
        degrees: z.derive(degrees),
        radians: z.derive(radians),
    };
    let s = result.degrees.summary();
    info!(min = s.min, max = s.max, "slope range (degrees)");
    result
}
