//! Topographic Wetness Index.
//!
//! TWI = ln(a / tan β), with specific catchment area `a = accumulation ·
//! pixel_size` (cell area over a contour length of one pixel) and local
//! slope β in radians.
use tracing::info;

use crate::error::Result;
use crate::grid::Grid;
use crate::maybe_rayon::*;

/// Floor on `tan β`. Flat cells get a large but finite index.
pub const TAN_SLOPE_FLOOR: f64 = 0.001;

/// Compute TWI from flow accumulation (cell counts) and slope (radians).
///
/// NaN in either input gives NaN; the slope floor never masks missing data.
pub fn compute_twi(accumulation: &Grid, slope_rad: &Grid) -> Result<Grid> {
    accumulation.ensure_same_shape(slope_rad)?;

    let (rows, cols) = (accumulation.rows(), accumulation.cols());
    let pixel = accumulation.pixel_size();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|r| {
            (0..cols)
                .map(|c| {
                    let acc = accumulation.get(r, c);
                    let beta = slope_rad.get(r, c);
                    if acc.is_nan() || beta.is_nan() {
                        return f64::NAN;
                    }
                    let sca = acc * pixel;
                    let tan_beta = beta.tan().max(TAN_SLOPE_FLOOR);
                    (sca / tan_beta).ln()
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let twi = accumulation.derive(data);
    let s = twi.summary();
    info!(min = s.min, max = s.max, "TWI range");
    Ok(twi)
}
