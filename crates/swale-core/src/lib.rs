//! Raster terrain analysis and fuzzy inference for bioswale siting.
//!
//! Every raster is a [`Grid`]: row-major `f64` cells with a square pixel size
//! in the grid's length unit. The terrain stages derive slope, D8 flow,
//! accumulation and TWI from one elevation grid; the siting stages feed
//! those into two fuzzy systems. [`pipeline::SitingPipeline`] runs the lot.
pub mod error;
pub mod focal;
pub mod fuzzy;
pub mod grid;
pub mod hydrology;
mod maybe_rayon;
pub mod pipeline;
pub mod siting;
pub mod terrain;

pub use error::{Error, Result};
pub use grid::{Grid, GridSummary};
pub use pipeline::{SitingConfig, SitingInputs, SitingPipeline, SitingResult};
