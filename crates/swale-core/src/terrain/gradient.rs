//! Finite-difference elevation gradient shared by slope and wetness.
//! `pub(crate)` only.

use crate::grid::Grid;

/// Gradient `(dz_dx, dz_dy)` at `(r, c)`, scaled by the grid's pixel size.
///
/// Interior cells use central differences, edge cells one-sided first-order
/// differences:
/// ```text
///   interior: (z[i+1] − z[i−1]) / (2·h)
///   first:    (z[1]   − z[0])   / h
///   last:     (z[n−1] − z[n−2]) / h
/// ```
/// An axis of length 1 contributes zero. NaN cells poison only the stencils
/// they belong to.
pub(crate) fn central_gradient(z: &Grid, r: usize, c: usize) -> (f64, f64) {
    let h = z.pixel_size();
    let dz_dx = axis_difference(z.cols(), c, h, |i| z.get(r, i));
    let dz_dy = axis_difference(z.rows(), r, h, |i| z.get(i, c));
    (dz_dx, dz_dy)
}

#[inline]
fn axis_difference<F: Fn(usize) -> f64>(n: usize, i: usize, h: f64, at: F) -> f64 {
    if n < 2 {
        0.0
    } else if i == 0 {
        (at(1) - at(0)) / h
    } else if i == n - 1 {
        (at(n - 1) - at(n - 2)) / h
    } else {
        (at(i + 1) - at(i - 1)) / (2.0 * h)
    }
}
