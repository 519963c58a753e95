//! The two siting stages and their default rule tables.
//!
//! Stage 1, physical suitability: slope × soil → `[0, 1]`.
//! Stage 2, capture priority: suitability × impervious × wetness → `[0, 1]`.
use tracing::info;

use super::categories::{ImperviousClass, SlopeClass, SoilClass, SuitabilityClass, WetnessClass};
use crate::error::Result;
use crate::fuzzy::{Category, FisConfig, FuzzyRule, FuzzySystem, FuzzyVariable, RuleBase, RuleConfig, VariableConfig};
use crate::grid::Grid;

pub type SuitabilitySystem = FuzzySystem<2>;
pub type PrioritySystem = FuzzySystem<3>;

/// Output centroids.
const VERY_LOW: f64 = 0.10;
const LOW: f64 = 0.25;
const MEDIUM: f64 = 0.45;
const HIGH: f64 = 0.70;
const VERY_HIGH: f64 = 0.90;

// ── Stage 1 ──────────────────────────────────────────────────────────────────

/// Slope × soil → suitability. Gentle (not flat) slopes on well-draining
/// soil score best; steep ground is poor whatever the soil.
pub const SUITABILITY_RULES: [(SlopeClass, SoilClass, f64); 16] = {
    use SlopeClass::*;
    use SoilClass::*;
    [
        (Flat, Excellent, 0.70),
        (Flat, Good, 0.50),
        (Flat, Marginal, 0.30),
        (Flat, Poor, 0.10),
        (Ideal, Excellent, 0.90),
        (Ideal, Good, 0.70),
        (Ideal, Marginal, 0.50),
        (Ideal, Poor, 0.30),
        (Moderate, Excellent, 0.70),
        (Moderate, Good, 0.50),
        (Moderate, Marginal, 0.30),
        (Moderate, Poor, 0.10),
        (Steep, Excellent, 0.30),
        (Steep, Good, 0.10),
        (Steep, Marginal, 0.10),
        (Steep, Poor, 0.10),
    ]
};

pub fn default_suitability_system() -> Result<SuitabilitySystem> {
    let rules = SUITABILITY_RULES
        .iter()
        .map(|&(s, h, out)| FuzzyRule::new([s.id(), h.id()], out))
        .collect();
    FuzzySystem::new(
        [
            FuzzyVariable::from_category::<SlopeClass>()?,
            FuzzyVariable::from_category::<SoilClass>()?,
        ],
        rules,
    )
}

/// Stage 1 defaults in configuration form.
pub fn suitability_config() -> FisConfig {
    FisConfig {
        variables: vec![
            VariableConfig::from_category::<SlopeClass>(),
            VariableConfig::from_category::<SoilClass>(),
        ],
        rules: SUITABILITY_RULES
            .iter()
            .map(|&(s, h, out)| RuleConfig { when: vec![s.label().into(), h.label().into()], then: out })
            .collect(),
    }
}

/// Evaluate stage 1 over a slope grid (degrees) and an ordinal soil grid.
pub fn physical_suitability(system: &SuitabilitySystem, slope_deg: &Grid, soil: &Grid) -> Result<Grid> {
    let suitability = system.evaluate([slope_deg, soil])?;
    let s = suitability.summary();
    info!(min = s.min, max = s.max, mean = s.mean, median = s.median, "physical suitability");
    Ok(suitability)
}

// ── Stage 2 ──────────────────────────────────────────────────────────────────

/// Priority for every combination with suitability above `Low`.
pub const PRIORITY_RULES: [(SuitabilityClass, ImperviousClass, WetnessClass, f64); 36] = {
    use ImperviousClass as I;
    use SuitabilityClass as S;
    use WetnessClass as W;
    [
        (S::Moderate, I::Low, W::Low, VERY_LOW),
        (S::Moderate, I::Low, W::Moderate, VERY_LOW),
        (S::Moderate, I::Low, W::High, LOW),
        (S::Moderate, I::Moderate, W::Low, VERY_LOW),
        (S::Moderate, I::Moderate, W::Moderate, LOW),
        (S::Moderate, I::Moderate, W::High, LOW),
        (S::Moderate, I::High, W::Low, LOW),
        (S::Moderate, I::High, W::Moderate, LOW),
        (S::Moderate, I::High, W::High, MEDIUM),
        (S::Moderate, I::VeryHigh, W::Low, LOW),
        (S::Moderate, I::VeryHigh, W::Moderate, MEDIUM),
        (S::Moderate, I::VeryHigh, W::High, MEDIUM),
        (S::Good, I::Low, W::Low, VERY_LOW),
        (S::Good, I::Low, W::Moderate, LOW),
        (S::Good, I::Low, W::High, MEDIUM),
        (S::Good, I::Moderate, W::Low, LOW),
        (S::Good, I::Moderate, W::Moderate, MEDIUM),
        (S::Good, I::Moderate, W::High, MEDIUM),
        (S::Good, I::High, W::Low, MEDIUM),
        (S::Good, I::High, W::Moderate, MEDIUM),
        (S::Good, I::High, W::High, HIGH),
        (S::Good, I::VeryHigh, W::Low, MEDIUM),
        (S::Good, I::VeryHigh, W::Moderate, HIGH),
        (S::Good, I::VeryHigh, W::High, HIGH),
        (S::High, I::Low, W::Low, LOW),
        (S::High, I::Low, W::Moderate, LOW),
        (S::High, I::Low, W::High, MEDIUM),
        (S::High, I::Moderate, W::Low, LOW),
        (S::High, I::Moderate, W::Moderate, MEDIUM),
        (S::High, I::Moderate, W::High, HIGH),
        (S::High, I::High, W::Low, MEDIUM),
        (S::High, I::High, W::Moderate, HIGH),
        (S::High, I::High, W::High, VERY_HIGH),
        (S::High, I::VeryHigh, W::Low, HIGH),
        (S::High, I::VeryHigh, W::Moderate, HIGH),
        (S::High, I::VeryHigh, W::High, VERY_HIGH),
    ]
};

/// Override sub-table: low suitability forces very-low priority for every
/// impervious × wetness combination.
fn low_suitability_override() -> impl Iterator<Item = FuzzyRule<3>> {
    ImperviousClass::ALL.iter().flat_map(|&i| {
        WetnessClass::ALL
            .iter()
            .map(move |&w| FuzzyRule::new([SuitabilityClass::Low.id(), i.id(), w.id()], VERY_LOW))
    })
}

pub fn default_priority_system() -> Result<PrioritySystem> {
    let rules: RuleBase<3> = low_suitability_override()
        .chain(
            PRIORITY_RULES
                .iter()
                .map(|&(s, i, w, out)| FuzzyRule::new([s.id(), i.id(), w.id()], out)),
        )
        .collect();
    FuzzySystem::new(
        [
            FuzzyVariable::from_category::<SuitabilityClass>()?,
            FuzzyVariable::from_category::<ImperviousClass>()?,
            FuzzyVariable::from_category::<WetnessClass>()?,
        ],
        rules,
    )
}

/// Stage 2 defaults in configuration form, override rules first.
pub fn priority_config() -> FisConfig {
    let override_rules = ImperviousClass::ALL.iter().flat_map(|&i| {
        WetnessClass::ALL.iter().map(move |&w| RuleConfig {
            when: vec![SuitabilityClass::Low.label().into(), i.label().into(), w.label().into()],
            then: VERY_LOW,
        })
    });
    let rules = override_rules
        .chain(PRIORITY_RULES.iter().map(|&(s, i, w, out)| RuleConfig {
            when: vec![s.label().into(), i.label().into(), w.label().into()],
            then: out,
        }))
        .collect();

    FisConfig {
        variables: vec![
            VariableConfig::from_category::<SuitabilityClass>(),
            VariableConfig::from_category::<ImperviousClass>(),
            VariableConfig::from_category::<WetnessClass>(),
        ],
        rules,
    }
}

/// Evaluate stage 2 over suitability, impervious fraction and TWI.
pub fn capture_priority(
    system: &PrioritySystem,
    suitability: &Grid,
    impervious: &Grid,
    twi: &Grid,
) -> Result<Grid> {
    let priority = system.evaluate([suitability, impervious, twi])?;
    let s = priority.summary();
    info!(min = s.min, max = s.max, mean = s.mean, median = s.median, "capture priority");
    Ok(priority)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn default_tables_cover_full_products() {
        let s1 = default_suitability_system().unwrap();
        assert_eq!(s1.rules().len(), 16);
        let s2 = default_priority_system().unwrap();
        assert_eq!(s2.rules().len(), 48);

        // Every suitability × impervious × wetness combination appears once.
        let mut seen = std::collections::HashSet::new();
        for r in s2.rules().rules() {
            assert!(seen.insert(r.antecedents), "duplicate {:?}", r.antecedents);
        }
        assert_eq!(seen.len(), 4 * 4 * 3);
    }

    #[test]
    fn flat_excellent_scores_point_seven() {
        let sys = default_suitability_system().unwrap();
        // 0.1° is fully flat; ordinal 4 is fully excellent.
        assert_eq!(sys.evaluate_cell([0.1, 4.0]), 0.70);
        assert_eq!(sys.evaluate_cell([1.0, 4.0]), 0.90);
        assert_eq!(sys.evaluate_cell([15.0, 1.0]), 0.10);
    }

    #[test]
    fn slope_beyond_steep_plateau_fires_nothing() {
        let sys = default_suitability_system().unwrap();
        assert_eq!(sys.evaluate_cell([40.0, 4.0]), 0.0);
    }

    #[test]
    fn blended_slope_interpolates() {
        let sys = default_suitability_system().unwrap();
        // 0.55°: flat 0.5, ideal 0.5 on soil A → (0.5·0.7 + 0.5·0.9) / 1.
        assert_abs_diff_eq!(sys.evaluate_cell([0.55, 4.0]), 0.80, epsilon = 1e-12);
    }

    #[test]
    fn low_suitability_overrides_everything() {
        let sys = default_priority_system().unwrap();
        for imp in [0.0, 0.5, 0.95] {
            for twi in [3.0, 7.0, 12.0] {
                assert_abs_diff_eq!(sys.evaluate_cell([0.1, imp, twi]), VERY_LOW, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn high_suitability_sealed_and_wet_is_top_priority() {
        let sys = default_priority_system().unwrap();
        assert_abs_diff_eq!(sys.evaluate_cell([0.9, 0.95, 12.0]), VERY_HIGH, epsilon = 1e-12);
        assert_abs_diff_eq!(sys.evaluate_cell([0.9, 0.05, 3.0]), LOW, epsilon = 1e-12);
    }

    #[test]
    fn stage_outputs_stay_in_unit_interval() {
        let sys1 = default_suitability_system().unwrap();
        let sys2 = default_priority_system().unwrap();
        let slope = Grid::from_fn(10, 10, 1.0, |r, c| (r * 10 + c) as f64 * 0.12).unwrap();
        let soil = Grid::from_fn(10, 10, 1.0, |r, c| 1.0 + ((r + 3 * c) % 4) as f64).unwrap();
        let imp = Grid::from_fn(10, 10, 1.0, |r, _| r as f64 / 9.0).unwrap();
        let twi = Grid::from_fn(10, 10, 1.0, |_, c| 2.0 + c as f64 * 1.5).unwrap();

        let suit = physical_suitability(&sys1, &slope, &soil).unwrap();
        let pri = capture_priority(&sys2, &suit, &imp, &twi).unwrap();
        for &v in suit.data().iter().chain(pri.data()) {
            assert!((0.0..=1.0).contains(&v), "value {v}");
        }
    }

    #[test]
    fn config_defaults_build_the_typed_systems() {
        assert_eq!(suitability_config().build::<2>().unwrap(), default_suitability_system().unwrap());
        assert_eq!(priority_config().build::<3>().unwrap(), default_priority_system().unwrap());
    }

    #[test]
    fn defaults_survive_config_round_trip() {
        let sys = default_priority_system().unwrap();
        let json = FisConfig::from_system(&sys).to_json_pretty().unwrap();
        let again = FisConfig::from_json(&json).unwrap().build::<3>().unwrap();
        assert_eq!(sys, again);
    }
}
