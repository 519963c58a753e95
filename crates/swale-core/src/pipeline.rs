//! Pipeline orchestrator: terrain derivatives, impervious fraction and both
//! fuzzy stages, in order.
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::focal::{check_window, impervious_fraction, DEFAULT_IMPERVIOUS_WINDOW};
use crate::fuzzy::FisConfig;
use crate::grid::Grid;
use crate::hydrology::flow_routing::{FlowDirectionGrid, SinkReport};
use crate::siting::stages::{
    capture_priority, physical_suitability, priority_config, suitability_config, PrioritySystem,
    SuitabilitySystem,
};
use crate::terrain::{derive_terrain, TerrainResult};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Everything tunable about a siting run. Defaults are the bioswale tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitingConfig {
    /// Odd window edge, in cells, of the impervious neighbourhood mean.
    pub impervious_window: usize,
    /// Slope × soil.
    pub suitability: FisConfig,
    /// Suitability × impervious × wetness.
    pub priority: FisConfig,
}

impl Default for SitingConfig {
    fn default() -> Self {
        Self {
            impervious_window: DEFAULT_IMPERVIOUS_WINDOW,
            suitability: suitability_config(),
            priority: priority_config(),
        }
    }
}

impl SitingConfig {
    /// Missing fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ── Inputs and outputs ────────────────────────────────────────────────────────

/// The three co-registered input rasters.
pub struct SitingInputs {
    /// Elevation, in the grid's length unit.
    pub elevation: Grid,
    /// Ordinal hydrologic soil group, A=4 … D=1.
    pub soil: Grid,
    /// Binary impervious surface, 1 = sealed.
    pub impervious: Grid,
}

/// Every intermediate and final raster of a run.
pub struct SitingResult {
    pub slope_deg: Grid,
    pub slope_rad: Grid,
    pub flow: FlowDirectionGrid,
    pub accumulation: Grid,
    pub twi: Grid,
    pub impervious_fraction: Grid,
    /// Stage 1 output in `[0, 1]`.
    pub suitability: Grid,
    /// Stage 2 output in `[0, 1]`.
    pub priority: Grid,
    pub sinks: SinkReport,
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

pub struct SitingPipeline {
    impervious_window: usize,
    suitability: SuitabilitySystem,
    priority: PrioritySystem,
}

impl SitingPipeline {
    /// Resolve both fuzzy systems and check the window. Nothing in `config`
    /// can fail later, during evaluation.
    pub fn new(config: &SitingConfig) -> Result<Self> {
        check_window(config.impervious_window)?;
        let suitability = config.suitability.build::<2>()?;
        let priority = config.priority.build::<3>()?;
        info!(
            window = config.impervious_window,
            suitability_rules = suitability.rules().len(),
            priority_rules = priority.rules().len(),
            "siting pipeline ready"
        );
        Ok(Self { impervious_window: config.impervious_window, suitability, priority })
    }

    pub fn suitability_system(&self) -> &SuitabilitySystem {
        &self.suitability
    }

    pub fn priority_system(&self) -> &PrioritySystem {
        &self.priority
    }

    /// Run every stage.
    ///
    /// Pipeline order:
    ///   1. Shape check of all three inputs
    ///   2. Terrain: slope, D8 flow, accumulation, TWI
    ///   3. Impervious neighbourhood fraction
    ///   4. Physical suitability
    ///   5. Capture priority
    pub fn run(&self, inputs: &SitingInputs) -> Result<SitingResult> {
        // ── 1. Shapes ───────────────────────────────────────────────────────
        inputs.elevation.ensure_same_shape(&inputs.soil)?;
        inputs.elevation.ensure_same_shape(&inputs.impervious)?;

        // ── 2. Terrain ──────────────────────────────────────────────────────
        let elevation = inputs.elevation.with_nan_nodata();
        let TerrainResult { slope_deg, slope_rad, directions, accumulation, twi, sinks } =
            derive_terrain(&elevation)?;

        // ── 3. Impervious fraction ──────────────────────────────────────────
        let impervious_fraction = impervious_fraction(&inputs.impervious, self.impervious_window)?;

        // ── 4 & 5. Fuzzy stages ─────────────────────────────────────────────
        let suitability = self.suitability(&slope_deg, &inputs.soil)?;
        let priority = self.priority(&suitability, &impervious_fraction, &twi)?;

        Ok(SitingResult {
            slope_deg,
            slope_rad,
            flow: directions,
            accumulation,
            twi,
            impervious_fraction,
            suitability,
            priority,
            sinks,
        })
    }

    /// Stage 1 alone: slope in degrees × ordinal soil. Nodata cells of
    /// either input score 0.
    pub fn suitability(&self, slope_deg: &Grid, soil: &Grid) -> Result<Grid> {
        physical_suitability(&self.suitability, &slope_deg.with_nan_nodata(), &soil.with_nan_nodata())
    }

    /// Stage 2 alone: suitability × impervious fraction × TWI. Nodata cells
    /// of any input score 0.
    pub fn priority(&self, suitability: &Grid, impervious_fraction: &Grid, twi: &Grid) -> Result<Grid> {
        capture_priority(
            &self.priority,
            &suitability.with_nan_nodata(),
            &impervious_fraction.with_nan_nodata(),
            &twi.with_nan_nodata(),
        )
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
