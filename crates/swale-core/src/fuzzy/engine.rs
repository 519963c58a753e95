//! Rule evaluation and weighted-average defuzzification.
//!
//! For every cell:
//! ```text
//!   μᵥ,ₖ      = trapezoid membership of input v in category k
//!   strengthᵢ = min over antecedents of μ            (fuzzy AND)
//!   output    = Σ strengthᵢ · centroidᵢ / Σ strengthᵢ
//! ```
//! A cell no rule fires for (Σ strength = 0) is 0. The engine knows nothing
//! about what its variables mean.
use tracing::debug;

use super::rules::{FuzzyRule, RuleBase};
use super::variable::FuzzyVariable;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::maybe_rayon::*;

/// A complete N-input Mamdani-style system with crisp consequents.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzySystem<const N: usize> {
    variables: [FuzzyVariable; N],
    rules: RuleBase<N>,
    /// Start of each variable's block in the per-cell membership buffer.
    offsets: [usize; N],
    width: usize,
}

impl<const N: usize> FuzzySystem<N> {
    /// Validates that every rule refers to an existing category of its
    /// variable and carries a finite consequent.
    pub fn new(variables: [FuzzyVariable; N], rules: RuleBase<N>) -> Result<Self> {
        if N == 0 {
            return Err(Error::VariableCount { expected: 1, actual: 0 });
        }
        for (i, rule) in rules.rules().iter().enumerate() {
            for (var, &id) in variables.iter().zip(&rule.antecedents) {
                if id >= var.len() {
                    return Err(Error::CategoryOutOfRange {
                        rule: i,
                        variable: var.name().to_string(),
                        id,
                        count: var.len(),
                    });
                }
            }
            if !rule.centroid.is_finite() {
                return Err(Error::InvalidParameter {
                    name: "centroid",
                    value: rule.centroid.to_string(),
                    reason: "rule consequents must be finite",
                });
            }
        }

        let mut offsets = [0usize; N];
        let mut width = 0;
        for (o, v) in offsets.iter_mut().zip(&variables) {
            *o = width;
            width += v.len();
        }
        Ok(Self { variables, rules, offsets, width })
    }

    pub fn variables(&self) -> &[FuzzyVariable; N] {
        &self.variables
    }

    pub fn rules(&self) -> &RuleBase<N> {
        &self.rules
    }

    /// Evaluate one cell.
    pub fn evaluate_cell(&self, inputs: [f64; N]) -> f64 {
        let mut memberships = vec![0.0; self.width];
        self.infer(&inputs, &mut memberships)
    }

    /// Evaluate every cell of `inputs`, which must share one shape.
    ///
    /// Shapes are checked before any cell is touched. NaN inputs belong to no
    /// category, so cells carrying them usually come out as 0.
    pub fn evaluate(&self, inputs: [&Grid; N]) -> Result<Grid> {
        let first = inputs[0];
        for g in &inputs[1..] {
            first.ensure_same_shape(g)?;
        }
        debug!(
            variables = N,
            rules = self.rules.len(),
            cells = first.len(),
            "evaluating fuzzy system"
        );

        let (rows, cols) = (first.rows(), first.cols());
        let data: Vec<f64> = (0..rows)
            .into_par_iter()
            .flat_map(|r| {
                let mut memberships = vec![0.0; self.width];
                let mut x = [0.0f64; N];
                let mut out = Vec::with_capacity(cols);
                for c in 0..cols {
                    for (xv, g) in x.iter_mut().zip(&inputs) {
                        *xv = g.get(r, c);
                    }
                    out.push(self.infer(&x, &mut memberships));
                }
                out
            })
            .collect();

        Ok(first.derive(data))
    }

    fn infer(&self, x: &[f64; N], memberships: &mut [f64]) -> f64 {
        for ((v, &off), &xv) in self.variables.iter().zip(&self.offsets).zip(x) {
            v.fuzzify(xv, &mut memberships[off..off + v.len()]);
        }

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for rule in self.rules.rules() {
            let strength = self.firing_strength(rule, memberships);
            numerator += strength * rule.centroid;
            denominator += strength;
        }

        if denominator > 0.0 {
            numerator / denominator
        } else {
            0.0
        }
    }

    #[inline]
    fn firing_strength(&self, rule: &FuzzyRule<N>, memberships: &[f64]) -> f64 {
        let mut strength = memberships[self.offsets[0] + rule.antecedents[0]];
        for j in 1..N {
            strength = strength.min(memberships[self.offsets[j] + rule.antecedents[j]]);
        }
        strength
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, sets: &[(&str, [f64; 4])]) -> FuzzyVariable {
        FuzzyVariable::new(name, sets.iter().map(|(l, p)| (l.to_string(), *p)).collect()).unwrap()
    }

    fn slope() -> FuzzyVariable {
        var("slope", &[("flat", [0.0, 0.0, 0.3, 0.8]), ("steep", [5.0, 8.0, 25.0, 25.0])])
    }

    fn soil() -> FuzzyVariable {
        var("soil", &[("poor", [0.5, 1.0, 1.0, 1.5]), ("excellent", [3.5, 4.0, 4.0, 4.5])])
    }

    #[test]
    fn single_full_match_returns_its_centroid() {
        let rules = RuleBase::new(vec![FuzzyRule::new([0, 1], 0.70)]);
        let sys = FuzzySystem::new([slope(), soil()], rules).unwrap();
        assert_eq!(sys.evaluate_cell([0.1, 4.0]), 0.70);

        let s = Grid::filled(2, 3, 5.0, 0.1).unwrap();
        let h = Grid::filled(2, 3, 5.0, 4.0).unwrap();
        let out = sys.evaluate([&s, &h]).unwrap();
        assert!(out.data().iter().all(|&v| v == 0.70));
    }

    #[test]
    fn nothing_fires_gives_zero() {
        let rules = RuleBase::new(vec![FuzzyRule::new([0, 1], 0.70)]);
        let sys = FuzzySystem::new([slope(), soil()], rules).unwrap();
        assert_eq!(sys.evaluate_cell([3.0, 4.0]), 0.0);
        assert_eq!(sys.evaluate_cell([f64::NAN, 4.0]), 0.0);
    }

    #[test]
    fn strength_is_minimum_and_output_is_weighted_mean() {
        let rules = RuleBase::new(vec![
            FuzzyRule::new([0, 1], 0.8), // flat & excellent
            FuzzyRule::new([0, 0], 0.2), // flat & poor
        ]);
        let sys = FuzzySystem::new([slope(), soil()], rules).unwrap();
        // slope 0.55 → flat 0.5; soil 1.25 → poor 0.5, excellent 0.
        assert!((sys.evaluate_cell([0.55, 1.25]) - 0.2).abs() < 1e-12);
        // slope 0.0 → flat 1; soil 3.75 → excellent 0.5 → only rule 1 fires.
        assert!((sys.evaluate_cell([0.0, 3.75]) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn duplicate_rules_add_weight() {
        let a = var("a", &[("lo", [0.0, 0.0, 1.0, 2.0]), ("hi", [1.0, 2.0, 3.0, 3.0])]);
        let one = RuleBase::new(vec![FuzzyRule::new([0], 0.0), FuzzyRule::new([1], 1.0)]);
        let two = RuleBase::new(vec![
            FuzzyRule::new([0], 0.0),
            FuzzyRule::new([1], 1.0),
            FuzzyRule::new([1], 1.0),
        ]);
        let sys1 = FuzzySystem::new([a.clone()], one).unwrap();
        let sys2 = FuzzySystem::new([a], two).unwrap();
        // x = 1.5 → lo 0.5, hi 0.5.
        assert!((sys1.evaluate_cell([1.5]) - 0.5).abs() < 1e-12);
        assert!((sys2.evaluate_cell([1.5]) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn output_stays_within_centroid_range() {
        let a = var(
            "a",
            &[("lo", [0.0, 0.0, 2.0, 5.0]), ("mid", [2.0, 4.0, 6.0, 8.0]), ("hi", [5.0, 8.0, 10.0, 10.0])],
        );
        let b = var("b", &[("lo", [0.0, 0.0, 0.4, 0.7]), ("hi", [0.3, 0.6, 1.0, 1.0])]);
        let rules: RuleBase<2> = (0..3)
            .flat_map(|i| (0..2).map(move |j| FuzzyRule::new([i, j], 0.15 + 0.1 * (i * 2 + j) as f64)))
            .collect();
        let (lo, hi) = rules.centroid_range().unwrap();
        let sys = FuzzySystem::new([a, b], rules).unwrap();
        for i in 0..=100 {
            for j in 0..=20 {
                let out = sys.evaluate_cell([i as f64 * 0.1, j as f64 * 0.05]);
                assert!(out >= lo - 1e-12 && out <= hi + 1e-12, "out {out}");
            }
        }
    }

    #[test]
    fn out_of_range_category_is_rejected() {
        let rules = RuleBase::new(vec![FuzzyRule::new([0, 2], 0.5)]);
        assert!(matches!(
            FuzzySystem::new([slope(), soil()], rules),
            Err(Error::CategoryOutOfRange { rule: 0, id: 2, .. })
        ));
    }

    #[test]
    fn non_finite_centroid_is_rejected() {
        let rules = RuleBase::new(vec![FuzzyRule::new([0, 0], f64::NAN)]);
        assert!(FuzzySystem::new([slope(), soil()], rules).is_err());
    }

    #[test]
    fn mismatched_inputs_fail_before_evaluation() {
        let sys = FuzzySystem::new([slope(), soil()], RuleBase::default()).unwrap();
        let a = Grid::filled(2, 2, 1.0, 0.0).unwrap();
        let b = Grid::filled(2, 3, 1.0, 0.0).unwrap();
        assert!(matches!(sys.evaluate([&a, &b]), Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn grid_and_cell_evaluation_agree_bitwise() {
        let rules = RuleBase::new(vec![
            FuzzyRule::new([0, 0], 0.1),
            FuzzyRule::new([0, 1], 0.7),
            FuzzyRule::new([1, 0], 0.1),
            FuzzyRule::new([1, 1], 0.3),
        ]);
        let sys = FuzzySystem::new([slope(), soil()], rules).unwrap();
        let s = Grid::from_fn(6, 7, 1.0, |r, c| (r * 7 + c) as f64 * 0.23).unwrap();
        let h = Grid::from_fn(6, 7, 1.0, |r, c| 1.0 + ((r + c) % 4) as f64 * 0.9).unwrap();
        let out = sys.evaluate([&s, &h]).unwrap();
        for r in 0..6 {
            for c in 0..7 {
                let cell = sys.evaluate_cell([s.get(r, c), h.get(r, c)]);
                assert_eq!(out.get(r, c).to_bits(), cell.to_bits());
            }
        }
    }
}
