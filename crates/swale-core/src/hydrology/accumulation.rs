//! D8 flow accumulation by descending-elevation sweep.
//!
//! Every cell starts at 1 (itself). Cells are visited from highest to lowest
//! and each non-sink cell adds its running total to its downstream
//! neighbour. Because a cell only ever drains to a strictly lower cell, its
//! total is final by the time it is visited. Equal elevations never drain
//! into each other, so the order among ties cannot change the result; it is
//! fixed to ascending row-major index anyway.
//!
//! This is the one pass in the engine that is inherently sequential.
use tracing::info;

use super::flow_routing::FlowDirectionGrid;
use crate::error::{Error, Result};
use crate::grid::Grid;

/// Upstream cell counts (including the cell itself) for every cell.
///
/// Values are plain counts; multiply by cell area for physical units.
/// NaN elevations sort ahead of every finite value and, being sinks that
/// nothing drains into, stay at 1.
pub fn compute_flow_accumulation(elevation: &Grid, directions: &FlowDirectionGrid) -> Result<Grid> {
    if !directions.matches(elevation) {
        return Err(Error::ShapeMismatch {
            expected_rows: elevation.rows(),
            expected_cols: elevation.cols(),
            expected_pixel: elevation.pixel_size(),
            rows: directions.rows(),
            cols: directions.cols(),
            pixel: directions.pixel_size(),
        });
    }

    let z = elevation.with_nan_nodata();
    let elev = z.data();

    let mut order: Vec<usize> = (0..elev.len()).collect();
    order.sort_by(|&a, &b| elev[b].total_cmp(&elev[a]).then(a.cmp(&b)));

    // Owned accumulator, scoped to this call.
    let mut accum = vec![1.0f64; elev.len()];
    for &i in &order {
        if let Some(j) = directions.downstream(i) {
            accum[j] += accum[i];
        }
    }

    let result = z.derive(accum);
    let s = result.summary();
    info!(min = s.min, max = s.max, "flow accumulation range (cells)");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrology::flow_routing::{compute_flow_direction, Direction};

    fn accumulate(g: &Grid) -> (FlowDirectionGrid, Grid) {
        let fd = compute_flow_direction(g);
        let acc = compute_flow_accumulation(g, &fd).unwrap();
        (fd, acc)
    }

    /// Deterministic bumpy surface with many local pits.
    fn bumpy(rows: usize, cols: usize) -> Grid {
        Grid::from_fn(rows, cols, 1.0, |r, c| {
            let h = (r as u64)
                .wrapping_mul(2654435761)
                .wrapping_add(c as u64 * 2246822519);
            let h = h ^ (h >> 16);
            (h & 0xFF) as f64 + r as f64 * 3.0
        })
        .unwrap()
    }

    #[test]
    fn depression_collects_all_nine_cells() {
        let g = Grid::from_rows(&[[5.0, 5.0, 5.0], [5.0, 1.0, 5.0], [5.0, 5.0, 5.0]], 1.0).unwrap();
        let (fd, acc) = accumulate(&g);
        assert_eq!(fd.get(1, 1), Direction::Sink);
        assert_eq!(acc.get(1, 1), 9.0);
        for r in 0..3 {
            for c in 0..3 {
                if (r, c) != (1, 1) {
                    assert_eq!(acc.get(r, c), 1.0, "cell ({r},{c})");
                }
            }
        }
    }

    #[test]
    fn linear_strip_counts_upstream_cells() {
        let g = Grid::from_rows(&[[5.0, 4.0, 3.0, 2.0, 1.0]], 1.0).unwrap();
        let (_, acc) = accumulate(&g);
        assert_eq!(acc.data(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn flat_grid_stays_at_one() {
        let g = Grid::filled(4, 7, 1.0, 3.0).unwrap();
        let (_, acc) = accumulate(&g);
        assert!(acc.data().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn all_nodata_grid_stays_at_one() {
        let g = Grid::filled(3, 3, 1.0, f64::NAN).unwrap();
        let (fd, acc) = accumulate(&g);
        assert!(fd.sink_report().is_degenerate());
        assert!(acc.data().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn accumulation_is_monotone_downstream_and_bounded() {
        let g = bumpy(24, 17);
        let (fd, acc) = accumulate(&g);
        let n = acc.len() as f64;
        for i in 0..acc.len() {
            let a = acc.data()[i];
            assert!(a >= 1.0);
            assert!(a <= n);
            if let Some(j) = fd.downstream(i) {
                assert!(a < acc.data()[j], "cell {i}: {a} !< downstream {}", acc.data()[j]);
            }
        }
    }

    #[test]
    fn sinks_conserve_every_cell() {
        let g = bumpy(20, 20);
        let (fd, acc) = accumulate(&g);

        // Follow every cell to its terminal sink and count arrivals.
        let mut arrivals = vec![0usize; acc.len()];
        for start in 0..acc.len() {
            let mut i = start;
            while let Some(j) = fd.downstream(i) {
                i = j;
            }
            arrivals[i] += 1;
        }

        let mut sink_total = 0.0;
        for (i, &d) in fd.directions().iter().enumerate() {
            if d == Direction::Sink {
                assert_eq!(acc.data()[i], arrivals[i] as f64, "sink {i}");
                sink_total += acc.data()[i];
            }
        }
        assert_eq!(sink_total, acc.len() as f64);
    }

    #[test]
    fn rejects_mismatched_direction_grid() {
        let a = Grid::filled(3, 3, 1.0, 0.0).unwrap();
        let b = Grid::filled(3, 4, 1.0, 0.0).unwrap();
        let fd = compute_flow_direction(&b);
        assert!(matches!(
            compute_flow_accumulation(&a, &fd),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let g = bumpy(15, 11);
        let (_, a) = accumulate(&g);
        let (_, b) = accumulate(&g);
        let bits = |g: &Grid| g.data().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }
}
