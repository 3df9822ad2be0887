use crate::systems::trace::MoveTrace;

use super::perf_stats::PerfStats;
use super::Simulation;

pub(super) fn set_chunk_sleeping_enabled(sim: &mut Simulation, enabled: bool) {
    sim.chunks.set_sleeping_enabled(enabled);
}

pub(super) fn enable_perf_metrics(sim: &mut Simulation, enabled: bool) {
    sim.perf_enabled = enabled;
    if !enabled {
        sim.perf_stats.reset();
    }
}

pub(super) fn perf_stats(sim: &Simulation) -> PerfStats {
    sim.perf_stats.clone()
}

pub(super) fn enable_move_trace(sim: &mut Simulation, enabled: bool) {
    match (enabled, sim.trace.is_some()) {
        (true, false) => sim.trace = Some(MoveTrace::new()),
        (false, true) => sim.trace = None,
        _ => {}
    }
}
