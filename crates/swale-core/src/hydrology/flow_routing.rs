//! D8 steepest-descent flow direction.
//!
//! Each cell drains to the single in-bounds neighbour with the largest
//! positive drop per unit distance. Neighbours are examined in the fixed
//! order E, SE, S, SW, W, NW, N, NE and ties keep the first one seen, so
//! results are reproducible bit for bit.
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::grid::Grid;
use crate::maybe_rayon::*;

/// Row/column offsets in enumeration order.
pub(crate) const D8_OFFSETS: [(isize, isize); 8] = [
    (0, 1),   // E
    (1, 1),   // SE
    (1, 0),   // S
    (1, -1),  // SW
    (0, -1),  // W
    (-1, -1), // NW
    (-1, 0),  // N
    (-1, 1),  // NE
];

/// Distance weights: 1 for cardinal, √2 for diagonal.
pub(crate) const D8_DIST: [f64; 8] = [
    1.0,
    std::f64::consts::SQRT_2,
    1.0,
    std::f64::consts::SQRT_2,
    1.0,
    std::f64::consts::SQRT_2,
    1.0,
    std::f64::consts::SQRT_2,
];

/// Outflow direction of a cell, or `Sink` when no neighbour is strictly lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    E,
    SE,
    S,
    SW,
    W,
    NW,
    N,
    NE,
    Sink,
}

impl Direction {
    /// The eight flowing directions in enumeration order.
    pub const D8: [Direction; 8] = [
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
        Direction::N,
        Direction::NE,
    ];

    /// Position in `D8`, `None` for `Sink`.
    #[inline]
    pub fn ordinal(self) -> Option<usize> {
        match self {
            Direction::Sink => None,
            d => Some(d as usize),
        }
    }

    /// `(d_row, d_col)` towards the downstream cell.
    #[inline]
    pub fn offset(self) -> Option<(isize, isize)> {
        self.ordinal().map(|k| D8_OFFSETS[k])
    }

    /// Distance weight in pixels: 1 cardinal, √2 diagonal.
    #[inline]
    pub fn distance(self) -> Option<f64> {
        self.ordinal().map(|k| D8_DIST[k])
    }

    /// Raster code: 0–7 in enumeration order, −1 for sinks.
    pub fn code(self) -> i8 {
        self.ordinal().map_or(-1, |k| k as i8)
    }

    pub fn from_code(code: i8) -> Option<Direction> {
        match code {
            -1 => Some(Direction::Sink),
            0..=7 => Some(Self::D8[code as usize]),
            _ => None,
        }
    }
}

/// Sink count for a direction grid. A high share of sinks signals flat or
/// unconditioned terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SinkReport {
    pub sinks: usize,
    pub cells: usize,
}

impl SinkReport {
    pub fn percent(&self) -> f64 {
        if self.cells == 0 {
            0.0
        } else {
            self.sinks as f64 / self.cells as f64 * 100.0
        }
    }

    /// Every cell is a sink: all-nodata or all-equal elevation input.
    pub fn is_degenerate(&self) -> bool {
        self.sinks == self.cells
    }
}

/// One `Direction` per elevation cell, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDirectionGrid {
    directions: Vec<Direction>,
    rows: usize,
    cols: usize,
    pixel_size: f64,
}

impl FlowDirectionGrid {
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    #[inline]
    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Direction {
        self.directions[row * self.cols + col]
    }

    /// Row-major index of the cell that `index` drains into.
    ///
    /// Directions are only ever assigned towards in-bounds neighbours, so the
    /// target always exists.
    #[inline]
    pub fn downstream(&self, index: usize) -> Option<usize> {
        let (dr, dc) = self.directions[index].offset()?;
        let r = (index / self.cols) as isize + dr;
        let c = (index % self.cols) as isize + dc;
        Some(r as usize * self.cols + c as usize)
    }

    pub fn sink_report(&self) -> SinkReport {
        SinkReport {
            sinks: self.directions.iter().filter(|&&d| d == Direction::Sink).count(),
            cells: self.directions.len(),
        }
    }

    /// Float grid of direction codes (−1 for sinks) for raster writers.
    pub fn to_grid(&self) -> Grid {
        let data = self.directions.iter().map(|d| d.code() as f64).collect();
        Grid::from_parts(self.rows, self.cols, self.pixel_size, data, Some(-1.0))
    }

    /// True when `grid` has this direction grid's rows, cols and pixel size.
    pub(crate) fn matches(&self, grid: &Grid) -> bool {
        self.rows == grid.rows() && self.cols == grid.cols() && self.pixel_size == grid.pixel_size()
    }
}

/// Compute D8 flow directions for `elevation`.
///
/// Candidates need a strictly positive drop; flat and uphill neighbours never
/// qualify. Border cells only consider in-bounds neighbours, so a border cell
/// with no lower in-bounds neighbour is a sink even if the terrain clearly
/// continues downhill off the grid. Nodata cells are sinks, and no cell ever
/// drains into one.
pub fn compute_flow_direction(elevation: &Grid) -> FlowDirectionGrid {
    let z = elevation.with_nan_nodata();
    let (rows, cols) = (z.rows(), z.cols());
    let pixel = z.pixel_size();

    let directions: Vec<Direction> = (0..rows)
        .into_par_iter()
        .flat_map(|r| {
            (0..cols)
                .map(|c| steepest_descent(&z, r, c, pixel))
                .collect::<Vec<_>>()
        })
        .collect();

    let grid = FlowDirectionGrid { directions, rows, cols, pixel_size: pixel };

    let report = grid.sink_report();
    info!(
        sinks = report.sinks,
        percent = report.percent(),
        "sinks (no downhill neighbour)"
    );
    if report.is_degenerate() {
        warn!("every cell is a sink; elevation is flat or entirely nodata");
    }
    grid
}

fn steepest_descent(z: &Grid, r: usize, c: usize, pixel: f64) -> Direction {
    let z0 = z.get(r, c);
    let mut best_slope = 0.0f64;
    let mut best = Direction::Sink;

    for (k, &(dr, dc)) in D8_OFFSETS.iter().enumerate() {
        let nr = r as isize + dr;
        let nc = c as isize + dc;
        if nr < 0 || nc < 0 || nr >= z.rows() as isize || nc >= z.cols() as isize {
            continue;
        }
        let drop = z0 - z.get(nr as usize, nc as usize);
        // NaN drops fail this comparison.
        if drop > 0.0 {
            let slope = drop / (pixel * D8_DIST[k]);
            if slope > best_slope {
                best_slope = slope;
                best = Direction::D8[k];
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depression() -> Grid {
        Grid::from_rows(&[[5.0, 5.0, 5.0], [5.0, 1.0, 5.0], [5.0, 5.0, 5.0]], 1.0).unwrap()
    }

    #[test]
    fn depression_centre_is_sink_and_neighbours_point_inward() {
        let fd = compute_flow_direction(&depression());
        assert_eq!(fd.get(1, 1), Direction::Sink);
        assert_eq!(fd.get(0, 0), Direction::SE);
        assert_eq!(fd.get(0, 1), Direction::S);
        assert_eq!(fd.get(1, 0), Direction::E);
        assert_eq!(fd.get(2, 2), Direction::NW);
        assert_eq!(fd.sink_report().sinks, 1);
    }

    #[test]
    fn ties_keep_first_direction_in_enumeration_order() {
        // Centre drops by 1 to both E and S; E is enumerated first.
        let g = Grid::from_rows(&[[9.0, 9.0, 9.0], [9.0, 5.0, 4.0], [9.0, 4.0, 9.0]], 1.0).unwrap();
        assert_eq!(compute_flow_direction(&g).get(1, 1), Direction::E);

        // Same drop on W and N: W comes before N.
        let g = Grid::from_rows(&[[9.0, 4.0, 9.0], [4.0, 5.0, 9.0], [9.0, 9.0, 9.0]], 1.0).unwrap();
        assert_eq!(compute_flow_direction(&g).get(1, 1), Direction::W);
    }

    #[test]
    fn diagonal_drop_is_distance_weighted() {
        // SE drops 1.3 over √2 (0.92 per pixel), S drops 1.0 over 1.
        let g = Grid::from_rows(&[[9.0, 9.0, 9.0], [9.0, 5.0, 9.0], [9.0, 4.0, 3.7]], 1.0).unwrap();
        assert_eq!(compute_flow_direction(&g).get(1, 1), Direction::S);
        // SE drops 1.5 over √2 (1.06 per pixel) and wins.
        let g = Grid::from_rows(&[[9.0, 9.0, 9.0], [9.0, 5.0, 9.0], [9.0, 4.0, 3.5]], 1.0).unwrap();
        assert_eq!(compute_flow_direction(&g).get(1, 1), Direction::SE);
    }

    #[test]
    fn border_cell_without_lower_neighbour_is_sink() {
        // Ramp descending westward: the west column has nowhere in-bounds to go.
        let g = Grid::from_fn(4, 4, 1.0, |_, c| c as f64).unwrap();
        let fd = compute_flow_direction(&g);
        for r in 0..4 {
            assert_eq!(fd.get(r, 0), Direction::Sink);
            for c in 1..4 {
                assert_eq!(fd.get(r, c), Direction::W);
            }
        }
    }

    #[test]
    fn flat_grid_is_all_sinks() {
        let fd = compute_flow_direction(&Grid::filled(5, 6, 2.0, 12.0).unwrap());
        let report = fd.sink_report();
        assert!(report.is_degenerate());
        assert_eq!(report.percent(), 100.0);
    }

    #[test]
    fn nodata_cells_are_sinks_and_never_receive_flow() {
        let g = Grid::from_rows(&[[5.0, -1.0, 5.0], [5.0, 4.0, 5.0], [5.0, 5.0, 5.0]], 1.0)
            .unwrap()
            .with_nodata(Some(-1.0));
        let fd = compute_flow_direction(&g);
        assert_eq!(fd.get(0, 1), Direction::Sink);
        assert_eq!(fd.get(0, 0), Direction::SE);
        assert_eq!(fd.get(0, 2), Direction::SW);
    }

    #[test]
    fn codes_round_trip() {
        for d in Direction::D8.into_iter().chain([Direction::Sink]) {
            assert_eq!(Direction::from_code(d.code()), Some(d));
        }
        assert_eq!(Direction::from_code(8), None);
        assert_eq!(Direction::E.code(), 0);
        assert_eq!(Direction::NE.code(), 7);
    }

    #[test]
    fn direction_grid_exports_codes() {
        let g = compute_flow_direction(&depression()).to_grid();
        assert_eq!(g.get(1, 1), -1.0);
        assert_eq!(g.get(1, 0), 0.0);
        assert_eq!(g.get(0, 0), 1.0);
    }
}
