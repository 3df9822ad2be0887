use crate::systems::compiler::Pass;

use super::pass::{run_pass, PassTotals};
use super::{PerfTimer, Simulation};

pub(super) fn step(sim: &mut Simulation) {
    let perf_on = sim.perf_enabled;
    if perf_on {
        sim.perf_stats.reset();
    }
    let step_start = if perf_on { Some(PerfTimer::start()) } else { None };

    sim.chunks.begin_tick();
    let mut totals = PassTotals::default();

    if perf_on {
        let t0 = PerfTimer::start();
        run_pass(sim, Pass::Rising, &mut totals);
        sim.perf_stats.rising_ms = t0.elapsed_ms();
    } else {
        run_pass(sim, Pass::Rising, &mut totals);
    }

    if perf_on {
        let t0 = PerfTimer::start();
        run_pass(sim, Pass::Falling, &mut totals);
        sim.perf_stats.falling_ms = t0.elapsed_ms();
    } else {
        run_pass(sim, Pass::Falling, &mut totals);
    }

    let flushed = if perf_on {
        let t0 = PerfTimer::start();
        let n = sim.deferred.flush_tick(&mut sim.grid, &mut sim.chunks);
        sim.perf_stats.flush_ms = t0.elapsed_ms();
        n
    } else {
        sim.deferred.flush_tick(&mut sim.grid, &mut sim.chunks)
    };
    totals.deferred_writes += flushed as u32;

    // Special materials pin their chunk so spawners never fall asleep.
    let book = &*sim.book;
    if perf_on {
        let t0 = PerfTimer::start();
        sim.chunks.update_activity(&sim.grid, |id| book.keeps_awake(id));
        sim.perf_stats.activity_ms = t0.elapsed_ms();
    } else {
        sim.chunks.update_activity(&sim.grid, |id| book.keeps_awake(id));
    }

    sim.step_count = sim.step_count.wrapping_add(1);

    if let Some(t) = step_start {
        let stats = &mut sim.perf_stats;
        stats.step_ms = t.elapsed_ms();
        stats.cells_visited = totals.rules.cells_visited;
        stats.rules_attempted = totals.rules.rules_attempted;
        stats.rules_fired = totals.rules.rules_fired;
        stats.handler_calls = totals.handler_calls;
        stats.deferred_writes = totals.deferred_writes;
        stats.active_chunks = sim.chunks.active_chunk_count() as u32;
        stats.chunks_woken = sim.chunks.woke_this_tick();
        stats.chunks_slept = sim.chunks.slept_this_tick();
        stats.non_empty_cells = sim.grid.non_empty_count() as u32;
        stats.step_count = sim.step_count;
    }
}
