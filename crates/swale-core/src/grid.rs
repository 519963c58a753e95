use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single-band raster of f64 values, row-major, with square pixels.
///
/// Grids are immutable once built. Every producing stage returns a fresh
/// grid carrying the same shape and pixel size as its input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridRepr", into = "GridRepr")]
pub struct Grid {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
    pixel_size: f64,
    nodata: Option<f64>,
}

/// Finite-value statistics of a grid, used for stage log lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Cells that are finite and not the nodata sentinel.
    pub valid_cells: usize,
}

impl Grid {
    /// Build a grid from row-major values.
    pub fn from_vec(rows: usize, cols: usize, pixel_size: f64, data: Vec<f64>) -> Result<Self> {
        if rows == 0 || cols == 0 || rows.checked_mul(cols) != Some(data.len()) {
            return Err(Error::InvalidDimensions { rows, cols, len: data.len() });
        }
        if !(pixel_size.is_finite() && pixel_size > 0.0) {
            return Err(Error::InvalidPixelSize(pixel_size));
        }
        Ok(Self { data, rows, cols, pixel_size, nodata: None })
    }

    /// Grid filled with a single value.
    pub fn filled(rows: usize, cols: usize, pixel_size: f64, value: f64) -> Result<Self> {
        let len = rows
            .checked_mul(cols)
            .ok_or(Error::InvalidDimensions { rows, cols, len: 0 })?;
        Self::from_vec(rows, cols, pixel_size, vec![value; len])
    }

    /// Grid whose cell `(r, c)` is `f(r, c)`.
    pub fn from_fn<F>(rows: usize, cols: usize, pixel_size: f64, f: F) -> Result<Self>
    where
        F: Fn(usize, usize) -> f64,
    {
        let data = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .map(|(r, c)| f(r, c))
            .collect();
        Self::from_vec(rows, cols, pixel_size, data)
    }

    /// Grid from equal-length rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R], pixel_size: f64) -> Result<Self> {
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(Error::InvalidDimensions {
                    rows: rows.len(),
                    cols,
                    len: data.len() + row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(rows.len(), cols, pixel_size, data)
    }

    /// Attach a nodata sentinel.
    pub fn with_nodata(mut self, nodata: Option<f64>) -> Self {
        self.nodata = nodata;
        self
    }

    /// Assemble a grid whose dimensions were validated by the producer.
    pub(crate) fn from_parts(
        rows: usize,
        cols: usize,
        pixel_size: f64,
        data: Vec<f64>,
        nodata: Option<f64>,
    ) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { data, rows, cols, pixel_size, nodata }
    }

    /// New grid with this grid's shape and pixel size, nodata marked as NaN.
    pub(crate) fn derive(&self, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), self.data.len());
        Self {
            data,
            rows: self.rows,
            cols: self.cols,
            pixel_size: self.pixel_size,
            nodata: Some(f64::NAN),
        }
    }

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
    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// True for NaN and for the nodata sentinel.
    #[inline]
    pub fn is_nodata(&self, value: f64) -> bool {
        value.is_nan() || self.nodata.is_some_and(|nd| nd == value)
    }

    /// Copy with every nodata sentinel cell replaced by NaN.
    pub fn with_nan_nodata(&self) -> Self {
        let data = self
            .data
            .iter()
            .map(|&v| if self.is_nodata(v) { f64::NAN } else { v })
            .collect();
        self.derive(data)
    }

    pub fn same_shape(&self, other: &Grid) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.pixel_size == other.pixel_size
    }

    /// Fails with `ShapeMismatch` unless `other` has identical rows, cols and pixel size.
    pub fn ensure_same_shape(&self, other: &Grid) -> Result<()> {
        if self.same_shape(other) {
            Ok(())
        } else {
            Err(Error::ShapeMismatch {
                expected_rows: self.rows,
                expected_cols: self.cols,
                expected_pixel: self.pixel_size,
                rows: other.rows,
                cols: other.cols,
                pixel: other.pixel_size,
            })
        }
    }

    /// Statistics over valid cells. All fields are NaN when no cell is valid.
    pub fn summary(&self) -> GridSummary {
        let mut valid: Vec<f64> = self
            .data
            .iter()
            .copied()
            .filter(|&v| v.is_finite() && !self.is_nodata(v))
            .collect();

        if valid.is_empty() {
            return GridSummary {
                min: f64::NAN,
                max: f64::NAN,
                mean: f64::NAN,
                median: f64::NAN,
                valid_cells: 0,
            };
        }

        valid.sort_unstable_by(f64::total_cmp);
        let n = valid.len();
        let median = if n % 2 == 1 {
            valid[n / 2]
        } else {
            (valid[n / 2 - 1] + valid[n / 2]) / 2.0
        };

        GridSummary {
            min: valid[0],
            max: valid[n - 1],
            mean: valid.iter().sum::<f64>() / n as f64,
            median,
            valid_cells: n,
        }
    }
}

// ── Serialisation ────────────────────────────────────────────────────────────

/// Wire form: JSON has no NaN, so non-finite cells travel as `null`.
#[derive(Serialize, Deserialize)]
struct GridRepr {
    rows: usize,
    cols: usize,
    pixel_size: f64,
    #[serde(default)]
    nodata: Option<f64>,
    data: Vec<Option<f64>>,
}

impl From<Grid> for GridRepr {
    fn from(g: Grid) -> Self {
        Self {
            rows: g.rows,
            cols: g.cols,
            pixel_size: g.pixel_size,
            nodata: g.nodata.filter(|v| v.is_finite()),
            data: g.data.into_iter().map(|v| v.is_finite().then_some(v)).collect(),
        }
    }
}

impl TryFrom<GridRepr> for Grid {
    type Error = Error;

    fn try_from(r: GridRepr) -> Result<Self> {
        let data = r.data.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
        Ok(Grid::from_vec(r.rows, r.cols, r.pixel_size, data)?.with_nodata(r.nodata))
    }
}
