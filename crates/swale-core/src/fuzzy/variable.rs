//! Linguistic input variables and their categories.
use super::membership::Trapezoid;
use crate::error::{Error, Result};

/// A closed set of linguistic categories known at compile time.
///
/// Implemented by the enums that name each stage's categories. A category's
/// id is its position in `ALL` and is what rules store, so evaluation never
/// looks anything up by name.
pub trait Category: Copy + 'static {
    /// Variable name used in errors and configuration.
    const VARIABLE: &'static str;
    /// Every category, in id order.
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    /// Membership parameters `[a, b, c, d]` of the default system.
    fn default_params(self) -> [f64; 4];

    fn id(self) -> usize;

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }
}

/// One category of a variable.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzySet {
    pub label: String,
    pub mf: Trapezoid,
}

/// A named input axis: an ordered list of categories, each with a trapezoid.
/// Category ids are positions in that list.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyVariable {
    name: String,
    sets: Vec<FuzzySet>,
}

impl FuzzyVariable {
    /// Build from `(label, [a, b, c, d])` pairs.
    ///
    /// Fails with `InvalidMembership` on the first trapezoid that is not
    /// ordered, and with `InvalidParameter` for an empty or duplicated label
    /// list.
    pub fn new<S: Into<String>>(name: S, categories: Vec<(String, [f64; 4])>) -> Result<Self> {
        let name = name.into();
        if categories.is_empty() {
            return Err(Error::InvalidParameter {
                name: "categories",
                value: name,
                reason: "a variable needs at least one category",
            });
        }

        let mut sets: Vec<FuzzySet> = Vec::with_capacity(categories.len());
        for (label, p) in categories {
            if sets.iter().any(|s| s.label == label) {
                return Err(Error::InvalidParameter {
                    name: "categories",
                    value: format!("{name}/{label}"),
                    reason: "duplicate category label",
                });
            }
            let mf = Trapezoid::new(p[0], p[1], p[2], p[3]).ok_or_else(|| Error::InvalidMembership {
                variable: name.clone(),
                label: label.clone(),
                params: p,
            })?;
            sets.push(FuzzySet { label, mf });
        }
        Ok(Self { name, sets })
    }

    /// Variable with the default parameters of every category of `C`.
    pub fn from_category<C: Category>() -> Result<Self> {
        let categories = C::ALL
            .iter()
            .map(|&c| (c.label().to_string(), c.default_params()))
            .collect();
        Self::new(C::VARIABLE, categories)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sets(&self) -> &[FuzzySet] {
        &self.sets
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Id of the category called `label`.
    pub fn category_id(&self, label: &str) -> Result<usize> {
        self.sets
            .iter()
            .position(|s| s.label == label)
            .ok_or_else(|| Error::UnknownCategory {
                variable: self.name.clone(),
                label: label.to_string(),
            })
    }

    /// Membership of `x` in every category, written to `out[..len()]`.
    #[inline]
    pub fn fuzzify(&self, x: f64, out: &mut [f64]) {
        for (o, s) in out.iter_mut().zip(&self.sets) {
            *o = s.mf.membership(x);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slope_like() -> FuzzyVariable {
        FuzzyVariable::new(
            "slope",
            vec![
                ("flat".into(), [0.0, 0.0, 0.3, 0.8]),
                ("ideal".into(), [0.3, 0.8, 2.0, 3.5]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn ids_follow_declaration_order() {
        let v = slope_like();
        assert_eq!(v.category_id("flat").unwrap(), 0);
        assert_eq!(v.category_id("ideal").unwrap(), 1);
        assert!(matches!(v.category_id("steep"), Err(Error::UnknownCategory { .. })));
    }

    #[test]
    fn fuzzify_fills_every_category() {
        let v = slope_like();
        let mut out = [0.0; 2];
        v.fuzzify(0.55, &mut out);
        assert!((out[0] - 0.5).abs() < 1e-12);
        assert!((out[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn unordered_trapezoid_is_rejected_eagerly() {
        let err = FuzzyVariable::new("twi", vec![("low".into(), [2.0, 5.0, 4.0, 6.0])]).unwrap_err();
        match err {
            Error::InvalidMembership { variable, label, params } => {
                assert_eq!(variable, "twi");
                assert_eq!(label, "low");
                assert_eq!(params, [2.0, 5.0, 4.0, 6.0]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn empty_and_duplicate_labels_are_rejected() {
        assert!(FuzzyVariable::new("x", vec![]).is_err());
        let dup = vec![("a".into(), [0.0, 0.0, 1.0, 1.0]), ("a".into(), [1.0, 1.0, 2.0, 2.0])];
        assert!(matches!(
            FuzzyVariable::new("x", dup),
            Err(Error::InvalidParameter { .. })
        ));
    }
}
