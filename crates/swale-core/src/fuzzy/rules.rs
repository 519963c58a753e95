//! Rule tables: one category per antecedent plus a crisp consequent.

/// `IF v₀ is antecedents[0] AND … AND vₙ₋₁ is antecedents[N−1] THEN centroid`.
///
/// Antecedents are category ids of the corresponding variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyRule<const N: usize> {
    pub antecedents: [usize; N],
    pub centroid: f64,
}

impl<const N: usize> FuzzyRule<N> {
    pub const fn new(antecedents: [usize; N], centroid: f64) -> Self {
        Self { antecedents, centroid }
    }
}

/// Ordered rule list.
///
/// Rules sharing an antecedent combination are all kept and all contribute
/// to defuzzification; an extra rule is how an override gains weight.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleBase<const N: usize> {
    rules: Vec<FuzzyRule<N>>,
}

impl<const N: usize> RuleBase<N> {
    pub fn new(rules: Vec<FuzzyRule<N>>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: FuzzyRule<N>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[FuzzyRule<N>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Smallest and largest consequent, `None` for an empty base.
    pub fn centroid_range(&self) -> Option<(f64, f64)> {
        self.rules.iter().map(|r| r.centroid).fold(None, |acc, c| match acc {
            None => Some((c, c)),
            Some((lo, hi)) => Some((lo.min(c), hi.max(c))),
        })
    }
}

impl<const N: usize> FromIterator<FuzzyRule<N>> for RuleBase<N> {
    fn from_iter<I: IntoIterator<Item = FuzzyRule<N>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
