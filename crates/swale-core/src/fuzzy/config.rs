//! Serialisable description of a fuzzy system.
//!
//! Labels are resolved to category ids once, in `build`; every trapezoid is
//! validated there too, so a bad configuration fails before any grid is
//! evaluated.
use serde::{Deserialize, Serialize};

use super::engine::FuzzySystem;
use super::rules::{FuzzyRule, RuleBase};
use super::variable::{Category, FuzzyVariable};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub label: String,
    /// Trapezoid corners `[a, b, c, d]`.
    pub params: [f64; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableConfig {
    pub name: String,
    pub categories: Vec<CategoryConfig>,
}

impl VariableConfig {
    /// Every category of `C` with its default parameters.
    pub fn from_category<C: Category>() -> Self {
        Self {
            name: C::VARIABLE.to_string(),
            categories: C::ALL
                .iter()
                .map(|&c| CategoryConfig { label: c.label().to_string(), params: c.default_params() })
                .collect(),
        }
    }
}

/// `when` holds one category label per variable, in variable order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub when: Vec<String>,
    pub then: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FisConfig {
    pub variables: Vec<VariableConfig>,
    pub rules: Vec<RuleConfig>,
}

impl FisConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolve into an `N`-input system.
    pub fn build<const N: usize>(&self) -> Result<FuzzySystem<N>> {
        if self.variables.len() != N {
            return Err(Error::VariableCount { expected: N, actual: self.variables.len() });
        }

        let variables: Vec<FuzzyVariable> = self
            .variables
            .iter()
            .map(|v| {
                let cats = v.categories.iter().map(|c| (c.label.clone(), c.params)).collect();
                FuzzyVariable::new(v.name.clone(), cats)
            })
            .collect::<Result<_>>()?;
        let variables: [FuzzyVariable; N] = variables
            .try_into()
            .map_err(|v: Vec<FuzzyVariable>| Error::VariableCount { expected: N, actual: v.len() })?;

        let mut rules = RuleBase::new(Vec::with_capacity(self.rules.len()));
        for (i, rule) in self.rules.iter().enumerate() {
            if rule.when.len() != N {
                return Err(Error::RuleArity { rule: i, expected: N, actual: rule.when.len() });
            }
            let mut antecedents = [0usize; N];
            for ((slot, var), label) in antecedents.iter_mut().zip(&variables).zip(&rule.when) {
                *slot = var.category_id(label)?;
            }
            rules.push(FuzzyRule::new(antecedents, rule.then));
        }

        FuzzySystem::new(variables, rules)
    }

    /// Describe an existing system.
    pub fn from_system<const N: usize>(system: &FuzzySystem<N>) -> Self {
        let variables = system
            .variables()
            .iter()
            .map(|v| VariableConfig {
                name: v.name().to_string(),
                categories: v
                    .sets()
                    .iter()
                    .map(|s| CategoryConfig { label: s.label.clone(), params: s.mf.params() })
                    .collect(),
            })
            .collect();

        let rules = system
            .rules()
            .rules()
            .iter()
            .map(|r| RuleConfig {
                when: r
                    .antecedents
                    .iter()
                    .zip(system.variables())
                    .map(|(&id, v)| v.sets()[id].label.clone())
                    .collect(),
                then: r.centroid,
            })
            .collect();

        Self { variables, rules }
    }
}
