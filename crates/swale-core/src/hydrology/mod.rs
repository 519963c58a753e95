//! Flow routing, accumulation and wetness over an elevation grid.
pub mod accumulation;
pub mod flow_routing;
pub mod wetness;

use crate::error::Result;
use crate::grid::Grid;
use accumulation::compute_flow_accumulation;
use flow_routing::{compute_flow_direction, FlowDirectionGrid, SinkReport};

/// D8 directions and the accumulation derived from them.
pub struct FlowField {
    pub directions: FlowDirectionGrid,
    /// Upstream cell count, ≥ 1 everywhere.
    pub accumulation: Grid,
    pub sinks: SinkReport,
}

/// Run D8 routing then accumulation on `elevation`.
///
/// Flat or all-nodata input is not an error: every cell becomes a sink,
/// accumulation stays at 1 and `sinks.is_degenerate()` reports it.
pub fn compute_d8_flow(elevation: &Grid) -> Result<FlowField> {
    let directions = compute_flow_direction(elevation);
    let accumulation = compute_flow_accumulation(elevation, &directions)?;
    let sinks = directions.sink_report();
    Ok(FlowField { directions, accumulation, sinks })
}
