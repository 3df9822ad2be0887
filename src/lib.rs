//! Sandrule Engine - compiled reaction-rule particle sandbox
//!
//! Materials and their rules are plain data. At startup the rule compiler
//! turns them into flat lookup tables; every tick the interpreter walks the
//! grid in a rising and a falling pass and executes those tables, skipping
//! chunks that have gone to sleep.
//!
//! Layout:
//! - core/        - macros, RNG, error types
//! - domain/      - materials, rule authoring model, catalog, content bundles
//! - spatial/     - grid and chunk activity tracking
//! - systems/     - compiler, interpreter, deferred writes, handlers
//! - simulation/  - orchestration, persistence and the wasm facade

#[macro_use]
pub mod core;
pub mod domain;
pub mod spatial;
pub mod systems;
pub mod simulation;

use wasm_bindgen::prelude::*;

// Thread pool initialisation for the parallel build in the browser.
#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
pub use wasm_bindgen_rayon::init_thread_pool;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    web_sys::console::log_1(&"Sandrule engine initialized".into());
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub use crate::core::error::{CatalogError, CompileError, ConfigError, SaveError};
pub use crate::core::rng::Rng;
pub use domain::catalog::{ids, Catalog};
pub use domain::materials::{Archetype, MaterialId, EMPTY, OUT_OF_BOUNDS};
pub use simulation::{PerfStats, Sandbox, Simulation, SimulationConfig};
pub use systems::compiler::RuleBook;
pub use systems::handlers::{EmitterHandler, HandlerContext, MaterialHandler};
