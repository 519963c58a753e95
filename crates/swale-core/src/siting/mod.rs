//! Bioswale siting: the two fuzzy stages and the soil encoding that feeds them.
pub mod categories;
pub mod soil;
pub mod stages;

pub use categories::{ImperviousClass, SlopeClass, SoilClass, SuitabilityClass, WetnessClass};
pub use soil::{count_soil_groups, encode_soil_groups, HydrologicSoilGroup};
pub use stages::{
    capture_priority, default_priority_system, default_suitability_system, physical_suitability,
    priority_config, suitability_config, PrioritySystem, SuitabilitySystem,
};
