use std::sync::Arc;

use wasm_bindgen::prelude::*;

use crate::domain::catalog::Catalog;
use crate::domain::materials::EMPTY;
use crate::systems::compiler::RuleBook;
use crate::systems::handlers::EmitterHandler;

use super::perf_stats::PerfStats;
use super::{Simulation, SimulationConfig};

/// Chance per tick that a tap emits.
const TAP_RATE: f32 = 0.5;

fn to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Host-facing wrapper around one simulation.
#[wasm_bindgen]
pub struct Sandbox {
    core: Simulation,
}

impl Sandbox {
    fn build(book: RuleBook, width: u32, height: u32, seed: u32) -> Result<Self, JsValue> {
        let water = book.catalog().id_by_name("water");
        let mut core = Simulation::new(SimulationConfig::new(width, height, seed), Arc::new(book)).map_err(to_js)?;
        if let Some(water) = water {
            core.bind_handler("tap", Arc::new(EmitterHandler::new(water, TAP_RATE)));
        }
        Ok(Self { core })
    }

    pub fn simulation(&self) -> &Simulation {
        &self.core
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.core
    }
}

#[wasm_bindgen]
impl Sandbox {
    /// Sandbox with the built-in material set.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, seed: u32) -> Result<Sandbox, JsValue> {
        let book = RuleBook::builtin().map_err(to_js)?;
        Self::build(book, width, height, seed)
    }

    /// Sandbox whose materials come from a JSON content bundle.
    #[wasm_bindgen(js_name = fromBundle)]
    pub fn from_bundle(json: &str, width: u32, height: u32, seed: u32) -> Result<Sandbox, JsValue> {
        let catalog = Catalog::from_bundle_json(json).map_err(to_js)?;
        let book = RuleBook::compile(catalog).map_err(to_js)?;
        Self::build(book, width, height, seed)
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 { self.core.width() }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 { self.core.height() }

    #[wasm_bindgen(getter)]
    pub fn seed(&self) -> u32 { self.core.seed() }

    #[wasm_bindgen(getter)]
    pub fn step_count(&self) -> u32 { self.core.step_count() }

    pub fn step(&mut self) {
        self.core.step();
    }

    pub fn steps(&mut self, n: u32) {
        self.core.steps(n);
    }

    pub fn get_cell(&self, x: i32, y: i32) -> u8 {
        self.core.get_cell(x, y)
    }

    pub fn set_cell(&mut self, x: i32, y: i32, id: u8) -> bool {
        self.core.set_cell(x, y, id)
    }

    /// Brush: paint a disc of `id`.
    pub fn fill_disc(&mut self, cx: i32, cy: i32, radius: i32, id: u8) -> u32 {
        self.core.fill_disc(cx, cy, radius, id) as u32
    }

    pub fn erase_disc(&mut self, cx: i32, cy: i32, radius: i32) -> u32 {
        self.core.fill_disc(cx, cy, radius, EMPTY) as u32
    }

    pub fn clear(&mut self) {
        self.core.clear();
    }

    pub fn save(&self) -> Vec<u8> {
        self.core.save()
    }

    pub fn load(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.core.load(bytes).map_err(to_js)
    }

    pub fn reset(&mut self, seed: u32) {
        self.core.reset(seed);
    }

    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.core.enable_perf_metrics(enabled);
    }

    pub fn get_perf_stats(&self) -> PerfStats {
        self.core.perf_stats()
    }

    pub fn set_chunk_sleeping_enabled(&mut self, enabled: bool) {
        self.core.set_chunk_sleeping_enabled(enabled);
    }

    /// Pointer to the grid bytes (one material id per cell) in wasm memory.
    pub fn cells_ptr(&self) -> *const u8 {
        self.core.cells_ptr()
    }

    pub fn cells_len(&self) -> usize {
        self.core.cells_len()
    }

    pub fn active_chunks(&self) -> usize {
        self.core.active_chunks()
    }

    pub fn total_chunks(&self) -> usize {
        self.core.total_chunks()
    }

    pub fn chunks_x(&self) -> u32 {
        self.core.chunks_x()
    }

    pub fn chunks_y(&self) -> u32 {
        self.core.chunks_y()
    }

    /// Dirty regions since the last call as `[cx, cy, cw, ch, ...]` in
    /// chunk units. Clears the dirty bits.
    pub fn dirty_rects(&mut self) -> Vec<u32> {
        self.core.collect_dirty_rects().to_flat()
    }

    pub fn manifest_json(&self) -> String {
        self.core.book().catalog().manifest_json()
    }
}
