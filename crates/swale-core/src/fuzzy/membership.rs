//! Trapezoidal membership functions.
use serde::{Deserialize, Serialize};

/// Degree of membership of `x` in the trapezoid `(a, b, c, d)`.
///
/// ```text
///   0                   x ≤ a or x ≥ d (outside the plateau)
///   (x − a) / (b − a)   a < x < b
///   1                   b ≤ x ≤ c
///   (d − x) / (d − c)   c < x < d
/// ```
/// The plateau is tested first, so with `a == b` the rising edge is a step
/// at `a` (and `x == a` is fully a member); `c == d` likewise. Neither ramp
/// is ever evaluated with a zero width. NaN gives 0.
#[inline]
pub fn trapezoidal_membership(x: f64, a: f64, b: f64, c: f64, d: f64) -> f64 {
    if x >= b && x <= c {
        1.0
    } else if x > a && x < b {
        (x - a) / (b - a)
    } else if x > c && x < d {
        (d - x) / (d - c)
    } else {
        0.0
    }
}

/// Validated trapezoid parameters, `a ≤ b ≤ c ≤ d`, all finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 4]", try_from = "[f64; 4]")]
pub struct Trapezoid {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl Trapezoid {
    /// `None` unless `a ≤ b ≤ c ≤ d` and every corner is finite.
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Option<Self> {
        let finite = [a, b, c, d].iter().all(|v| v.is_finite());
        (finite && a <= b && b <= c && c <= d).then_some(Self { a, b, c, d })
    }

    #[inline]
    pub fn membership(&self, x: f64) -> f64 {
        trapezoidal_membership(x, self.a, self.b, self.c, self.d)
    }

    pub fn params(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }
}

impl From<Trapezoid> for [f64; 4] {
    fn from(t: Trapezoid) -> Self {
        t.params()
    }
}

impl TryFrom<[f64; 4]> for Trapezoid {
    type Error = String;

    fn try_from(p: [f64; 4]) -> Result<Self, Self::Error> {
        Trapezoid::new(p[0], p[1], p[2], p[3])
            .ok_or_else(|| format!("trapezoid {p:?} must satisfy a <= b <= c <= d"))
    }
}
