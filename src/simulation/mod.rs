//! Simulation - orchestration only.
//!
//! Owns one grid, its chunk tracker, the RNG and the deferred write queues,
//! and drives the compiled `RuleBook` over them. Every tick runs two scans:
//! a rising pass (top row first) and a falling pass (bottom row first).
//! All behaviour lives in the rule book and the handler registry; nothing
//! here knows what any particular material does.

use std::sync::Arc;

use crate::core::error::{ConfigError, SaveError};
use crate::core::rng::Rng;
use crate::domain::materials::MaterialId;
use crate::spatial::chunks::{ChunkMap, MergedDirtyRects};
use crate::spatial::grid::Grid;
use crate::systems::compiler::RuleBook;
use crate::systems::deferred::DeferredWrites;
use crate::systems::handlers::{HandlerRegistry, MaterialHandler};
use crate::systems::trace::MoveTrace;

#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "step/pass.rs"]
mod pass;
#[path = "step/step.rs"]
mod step;
#[path = "commands/commands.rs"]
mod commands;
#[path = "persistence/format.rs"]
pub mod format;
#[path = "persistence/persistence.rs"]
mod persistence;
#[path = "render/render.rs"]
mod render;
#[path = "init/init.rs"]
mod init;
#[path = "init/settings.rs"]
mod settings;
mod facade;

pub use facade::Sandbox;
pub use init::{SimulationConfig, MAX_DIMENSION};
pub use perf_stats::PerfStats;

use perf_timer::PerfTimer;

pub struct Simulation {
    book: Arc<RuleBook>,
    handlers: HandlerRegistry,
    grid: Grid,
    chunks: ChunkMap,
    deferred: DeferredWrites,
    rng: Rng,

    // State
    seed: u32,
    step_count: u32,

    // Debug / perf
    trace: Option<MoveTrace>,
    merged_rects: MergedDirtyRects,
    perf_enabled: bool,
    perf_stats: PerfStats,
}

impl Simulation {
    pub fn new(config: SimulationConfig, book: Arc<RuleBook>) -> Result<Self, ConfigError> {
        init::create(config, book)
    }

    pub fn width(&self) -> u32 { self.grid.width() }

    pub fn height(&self) -> u32 { self.grid.height() }

    pub fn seed(&self) -> u32 { self.seed }

    pub fn step_count(&self) -> u32 { self.step_count }

    pub fn rng_state(&self) -> u32 { self.rng.state() }

    pub fn book(&self) -> &Arc<RuleBook> { &self.book }

    /// Route every material whose handler key is `key` to `handler`.
    pub fn bind_handler(&mut self, key: &str, handler: Arc<dyn MaterialHandler>) -> usize {
        self.handlers.bind(&self.book, key, handler)
    }

    /// Advance one tick.
    pub fn step(&mut self) {
        step::step(self);
    }

    pub fn steps(&mut self, n: u32) {
        for _ in 0..n {
            step::step(self);
        }
    }

    // === Grid mutation ===

    /// `OUT_OF_BOUNDS` for coordinates outside the grid.
    pub fn get_cell(&self, x: i32, y: i32) -> MaterialId {
        self.grid.get(x, y)
    }

    /// Write one cell and wake its chunk. Off-grid coordinates and unknown
    /// ids are ignored.
    pub fn set_cell(&mut self, x: i32, y: i32, id: MaterialId) -> bool {
        commands::set_cell(self, x, y, id)
    }

    /// Paint a filled disc; returns the number of cells written.
    pub fn fill_disc(&mut self, cx: i32, cy: i32, radius: i32, id: MaterialId) -> usize {
        commands::fill_disc(self, cx, cy, radius, id)
    }

    pub fn clear(&mut self) {
        commands::clear(self);
    }

    // === Persistence ===

    pub fn save(&self) -> Vec<u8> {
        persistence::save(self)
    }

    /// Restore from `save()` output. On error nothing is modified.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), SaveError> {
        persistence::load(self, bytes)
    }

    pub fn reset(&mut self, seed: u32) {
        persistence::reset(self, seed);
    }

    // === Settings ===

    pub fn set_chunk_sleeping_enabled(&mut self, enabled: bool) {
        settings::set_chunk_sleeping_enabled(self, enabled);
    }

    /// Per-step timing and counters (adds timer overhead when enabled).
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        settings::enable_perf_metrics(self, enabled);
    }

    /// Last step's snapshot; zeros while perf metrics are off.
    pub fn perf_stats(&self) -> PerfStats {
        settings::perf_stats(self)
    }

    /// Record every move made by a rule so double moves can be detected.
    pub fn enable_move_trace(&mut self, enabled: bool) {
        settings::enable_move_trace(self, enabled);
    }

    pub fn move_trace(&self) -> Option<&MoveTrace> {
        self.trace.as_ref()
    }

    // === Chunks / render ===

    pub fn active_chunks(&self) -> usize { self.chunks.active_chunk_count() }

    pub fn total_chunks(&self) -> usize { self.chunks.total_chunks() }

    pub fn chunks_x(&self) -> u32 { self.chunks.dimensions().0 }

    pub fn chunks_y(&self) -> u32 { self.chunks.dimensions().1 }

    pub fn is_chunk_active(&self, cx: u32, cy: u32) -> bool {
        self.chunks.is_active(cx, cy)
    }

    pub fn cells(&self) -> &[MaterialId] { self.grid.as_slice() }

    /// Raw grid bytes for zero-copy upload.
    pub fn cells_ptr(&self) -> *const MaterialId { self.grid.types_ptr() }

    pub fn cells_len(&self) -> usize { self.grid.size() }

    /// Merge render-dirty chunks into rectangles and clear the dirty bits.
    pub fn collect_dirty_rects(&mut self) -> &MergedDirtyRects {
        render::collect_dirty_rects(self)
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
