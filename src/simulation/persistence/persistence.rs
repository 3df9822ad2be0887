use tracing::{debug, info};

use crate::core::error::SaveError;
use crate::core::rng::Rng;
use crate::spatial::grid::Grid;

use super::format;
use super::Simulation;

pub(super) fn save(sim: &Simulation) -> Vec<u8> {
    let bytes = format::encode(
        sim.grid.width(),
        sim.grid.height(),
        sim.rng.state(),
        sim.step_count,
        sim.seed,
        sim.grid.as_slice(),
    );
    debug!(bytes = bytes.len(), step = sim.step_count, "simulation saved");
    bytes
}

/// Parse and validate everything before touching the simulation.
pub(super) fn load(sim: &mut Simulation, bytes: &[u8]) -> Result<(), SaveError> {
    let snapshot = format::decode(bytes)?;

    if let Some(index) = snapshot.cells.iter().position(|&id| !sim.book.is_known(id)) {
        return Err(SaveError::UnknownMaterial { index, id: snapshot.cells[index] });
    }

    if (snapshot.width, snapshot.height) != (sim.grid.width(), sim.grid.height()) {
        sim.grid = Grid::new(snapshot.width, snapshot.height);
        sim.chunks.resize(snapshot.width, snapshot.height);
    }
    sim.grid.copy_from(&snapshot.cells);

    sim.seed = snapshot.seed.unwrap_or(sim.seed);
    match snapshot.rng {
        Some(state) => sim.rng.set_state(state),
        None => sim.rng = Rng::new(sim.seed),
    }
    sim.step_count = snapshot.step.unwrap_or(0);

    settle_after_external_change(sim);

    info!(
        version = snapshot.version,
        width = snapshot.width,
        height = snapshot.height,
        step = sim.step_count,
        "simulation loaded"
    );
    Ok(())
}

pub(super) fn reset(sim: &mut Simulation, seed: u32) {
    sim.grid.clear();
    sim.rng = Rng::new(seed);
    sim.seed = seed;
    sim.step_count = 0;
    settle_after_external_change(sim);
    info!(seed, "simulation reset");
}

fn settle_after_external_change(sim: &mut Simulation) {
    sim.deferred.clear();
    sim.chunks.clear_stamps();
    sim.chunks.reset_checksums();
    sim.chunks.wake_all();
    if let Some(trace) = sim.trace.as_mut() {
        trace.clear();
    }
}
