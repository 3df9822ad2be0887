use std::sync::Arc;

use sandrule_engine::{ids, RuleBook, Simulation, SimulationConfig};

#[test]
fn perf_smoke_step() {
    let book = Arc::new(RuleBook::builtin().unwrap());
    let mut sim = Simulation::new(SimulationConfig::new(128, 64, 1), book).unwrap();
    sim.enable_perf_metrics(true);
    for x in 0..128 {
        for y in 0..32 {
            sim.set_cell(x, y, ids::SAND);
        }
    }
    sim.step();
    let stats = sim.perf_stats();
    assert!(stats.step_ms() >= 0.0);
    assert!(stats.cells_visited() >= 128 * 32);
    assert_eq!(stats.non_empty_cells(), 128 * 32);
    assert_eq!(stats.active_chunks() as usize, sim.active_chunks());
}

#[test]
fn perf_stats_reset_when_disabled() {
    let book = Arc::new(RuleBook::builtin().unwrap());
    let mut sim = Simulation::new(SimulationConfig::new(64, 64, 1), book).unwrap();
    sim.enable_perf_metrics(true);
    sim.fill_disc(32, 32, 10, ids::WATER);
    sim.steps(3);
    assert!(sim.perf_stats().rules_attempted() > 0);

    sim.enable_perf_metrics(false);
    assert_eq!(sim.perf_stats().rules_attempted(), 0);
    assert_eq!(sim.perf_stats().step_count(), 0);
}
