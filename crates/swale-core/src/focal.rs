//! k×k neighbourhood mean via summed-area tables.
//!
//! Windows are clamped at the grid edge: a corner cell of an 11×11 filter
//! averages its 6×6 in-bounds block rather than padding with zeros. Cost is
//! O(rows × cols) whatever the window size.
use tracing::info;

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::maybe_rayon::*;

/// Window used for the impervious neighbourhood fraction.
pub const DEFAULT_IMPERVIOUS_WINDOW: usize = 11;

/// Mean of the `window × window` block centred on each cell.
///
/// Nodata and NaN cells are left out of both the window sum and the window
/// count; a window with no valid cell yields NaN. `window` must be odd.
pub fn box_mean(grid: &Grid, window: usize) -> Result<Grid> {
    check_window(window)?;

    let (rows, cols) = (grid.rows(), grid.cols());
    let half = window / 2;
    let table = SummedArea::build(grid);

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|r| {
            let r0 = r.saturating_sub(half);
            let r1 = (r + half).min(rows - 1) + 1;
            (0..cols)
                .map(|c| {
                    let c0 = c.saturating_sub(half);
                    let c1 = (c + half).min(cols - 1) + 1;
                    let (sum, count) = table.window(r0, r1, c0, c1);
                    if count > 0.0 {
                        sum / count
                    } else {
                        f64::NAN
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect();

    Ok(grid.derive(data))
}

/// Window sizes must be odd so the window has a centre cell.
pub fn check_window(window: usize) -> Result<()> {
    if window == 0 || window % 2 == 0 {
        return Err(Error::InvalidParameter {
            name: "window",
            value: window.to_string(),
            reason: "must be a positive odd integer",
        });
    }
    Ok(())
}

/// Box mean of a binary impervious-surface raster: the share of sealed
/// ground within the window, in `[0, 1]`.
pub fn impervious_fraction(impervious: &Grid, window: usize) -> Result<Grid> {
    let frac = box_mean(impervious, window)?;
    let s = frac.summary();
    info!(
        window,
        min = s.min,
        max = s.max,
        mean = s.mean,
        median = s.median,
        "impervious neighbourhood fraction"
    );
    Ok(frac)
}

/// Inclusive-prefix sums of values and of valid-cell counts, padded with a
/// leading zero row and column.
struct SummedArea {
    sum: Vec<f64>,
    count: Vec<f64>,
    stride: usize,
}

impl SummedArea {
    fn build(grid: &Grid) -> Self {
        let (rows, cols) = (grid.rows(), grid.cols());
        let stride = cols + 1;
        let mut sum = vec![0.0f64; (rows + 1) * stride];
        let mut count = vec![0.0f64; (rows + 1) * stride];

        for r in 0..rows {
            let mut row_sum = 0.0;
            let mut row_count = 0.0;
            for c in 0..cols {
                let v = grid.get(r, c);
                if !grid.is_nodata(v) {
                    row_sum += v;
                    row_count += 1.0;
                }
                let i = (r + 1) * stride + c + 1;
                sum[i] = sum[i - stride] + row_sum;
                count[i] = count[i - stride] + row_count;
            }
        }
        Self { sum, count, stride }
    }

    /// Sum and count over rows `r0..r1`, cols `c0..c1` (exclusive ends).
    #[inline]
    fn window(&self, r0: usize, r1: usize, c0: usize, c1: usize) -> (f64, f64) {
        let at = |t: &[f64], r: usize, c: usize| t[r * self.stride + c];
        let rect = |t: &[f64]| at(t, r1, c1) - at(t, r0, c1) - at(t, r1, c0) + at(t, r0, c0);
        (rect(&self.sum), rect(&self.count))
    }
}
