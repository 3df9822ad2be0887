use wasm_bindgen::prelude::*;

#[wasm_bindgen]
#[derive(Clone, Debug)]
pub struct PerfStats {
    pub(super) step_ms: f64,
    pub(super) rising_ms: f64,
    pub(super) falling_ms: f64,
    pub(super) flush_ms: f64,
    pub(super) activity_ms: f64,
    pub(super) cells_visited: u32,
    pub(super) rules_attempted: u32,
    pub(super) rules_fired: u32,
    pub(super) handler_calls: u32,
    pub(super) deferred_writes: u32,
    pub(super) active_chunks: u32,
    pub(super) chunks_woken: u32,
    pub(super) chunks_slept: u32,
    pub(super) non_empty_cells: u32,
    pub(super) step_count: u32,
}

impl PerfStats {
    pub(crate) fn reset(&mut self) {
        *self = PerfStats::default();
    }
}

impl Default for PerfStats {
    fn default() -> Self {
        PerfStats {
            step_ms: 0.0,
            rising_ms: 0.0,
            falling_ms: 0.0,
            flush_ms: 0.0,
            activity_ms: 0.0,
            cells_visited: 0,
            rules_attempted: 0,
            rules_fired: 0,
            handler_calls: 0,
            deferred_writes: 0,
            active_chunks: 0,
            chunks_woken: 0,
            chunks_slept: 0,
            non_empty_cells: 0,
            step_count: 0,
        }
    }
}

#[wasm_bindgen]
impl PerfStats {
    #[wasm_bindgen(getter)]
    pub fn step_ms(&self) -> f64 { self.step_ms }
    #[wasm_bindgen(getter)]
    pub fn rising_ms(&self) -> f64 { self.rising_ms }
    #[wasm_bindgen(getter)]
    pub fn falling_ms(&self) -> f64 { self.falling_ms }
    #[wasm_bindgen(getter)]
    pub fn flush_ms(&self) -> f64 { self.flush_ms }
    #[wasm_bindgen(getter)]
    pub fn activity_ms(&self) -> f64 { self.activity_ms }
    #[wasm_bindgen(getter)]
    pub fn cells_visited(&self) -> u32 { self.cells_visited }
    #[wasm_bindgen(getter)]
    pub fn rules_attempted(&self) -> u32 { self.rules_attempted }
    #[wasm_bindgen(getter)]
    pub fn rules_fired(&self) -> u32 { self.rules_fired }
    #[wasm_bindgen(getter)]
    pub fn handler_calls(&self) -> u32 { self.handler_calls }
    #[wasm_bindgen(getter)]
    pub fn deferred_writes(&self) -> u32 { self.deferred_writes }
    #[wasm_bindgen(getter)]
    pub fn active_chunks(&self) -> u32 { self.active_chunks }
    #[wasm_bindgen(getter)]
    pub fn chunks_woken(&self) -> u32 { self.chunks_woken }
    #[wasm_bindgen(getter)]
    pub fn chunks_slept(&self) -> u32 { self.chunks_slept }
    #[wasm_bindgen(getter)]
    pub fn non_empty_cells(&self) -> u32 { self.non_empty_cells }
    #[wasm_bindgen(getter)]
    pub fn step_count(&self) -> u32 { self.step_count }
}
