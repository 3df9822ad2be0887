use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::ConfigError;
use crate::core::rng::Rng;
use crate::spatial::chunks::{ChunkMap, MergedDirtyRects};
use crate::spatial::grid::Grid;
use crate::systems::compiler::RuleBook;
use crate::systems::deferred::DeferredWrites;
use crate::systems::handlers::HandlerRegistry;

use super::perf_stats::PerfStats;
use super::Simulation;

/// Save headers store dimensions as u16.
pub const MAX_DIMENSION: u32 = u16::MAX as u32;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    pub width: u32,
    pub height: u32,
    pub seed: u32,
    pub chunk_sleeping: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            seed: 12345,
            chunk_sleeping: true,
        }
    }
}

impl SimulationConfig {
    pub fn new(width: u32, height: u32, seed: u32) -> Self {
        Self { width, height, seed, ..Self::default() }
    }
}

pub(super) fn check_dimensions(width: u32, height: u32) -> Result<(), ConfigError> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(ConfigError::InvalidDimensions { width, height, max: MAX_DIMENSION });
    }
    Ok(())
}

pub(super) fn create(config: SimulationConfig, book: Arc<RuleBook>) -> Result<Simulation, ConfigError> {
    check_dimensions(config.width, config.height)?;

    let mut chunks = ChunkMap::new(config.width, config.height);
    chunks.set_sleeping_enabled(config.chunk_sleeping);

    info!(
        width = config.width,
        height = config.height,
        seed = config.seed,
        chunks = chunks.total_chunks(),
        "simulation created"
    );

    Ok(Simulation {
        book,
        handlers: HandlerRegistry::new(),
        grid: Grid::new(config.width, config.height),
        chunks,
        deferred: DeferredWrites::new(),
        rng: Rng::new(config.seed),
        seed: config.seed,
        step_count: 0,
        trace: None,
        merged_rects: MergedDirtyRects::new(),
        perf_enabled: false,
        perf_stats: PerfStats::default(),
    })
}
