use super::*;
use crate::domain::catalog::{ids, Catalog};
use crate::domain::materials::{Archetype, EMPTY, OUT_OF_BOUNDS};
use crate::domain::rules::{Commit, Effect, PassRestriction, Predicate, Rule};
use crate::core::rng::Rng;
use crate::systems::handlers::EmitterHandler;

fn builtin(width: u32, height: u32, seed: u32) -> Simulation {
    let book = Arc::new(RuleBook::builtin().unwrap());
    Simulation::new(SimulationConfig::new(width, height, seed), book).unwrap()
}

fn custom(catalog: Catalog, width: u32, height: u32) -> Simulation {
    let book = Arc::new(RuleBook::compile(catalog).unwrap());
    Simulation::new(SimulationConfig::new(width, height, 1), book).unwrap()
}

fn count(sim: &Simulation, id: MaterialId) -> usize {
    sim.cells().iter().filter(|&&c| c == id).count()
}

const SEED: MaterialId = 1;

fn seeder(commit: Commit) -> Catalog {
    let mut c = Catalog::new();
    c.insert(
        SEED,
        Archetype::new("seed", 0).rule(
            Rule::offsets(&[(0, 1)])
                .in_pass(PassRestriction::Rising)
                .commit_at(commit)
                .when(Predicate::id(EMPTY), Effect::convert(SEED, 1.0)),
        ),
    )
    .unwrap();
    c
}

#[test]
fn rejects_bad_dimensions() {
    let book = Arc::new(RuleBook::builtin().unwrap());
    assert!(Simulation::new(SimulationConfig::new(0, 10, 1), Arc::clone(&book)).is_err());
    assert!(Simulation::new(SimulationConfig::new(10, 70_000, 1), Arc::clone(&book)).is_err());
    assert!(Simulation::new(SimulationConfig::new(MAX_DIMENSION, 1, 1), book).is_ok());
}

#[test]
fn out_of_range_access_is_a_no_op() {
    let mut sim = builtin(8, 8, 1);
    assert_eq!(sim.get_cell(-1, 0), OUT_OF_BOUNDS);
    assert_eq!(sim.get_cell(0, 8), OUT_OF_BOUNDS);
    assert!(!sim.set_cell(8, 0, ids::SAND));
    assert!(!sim.set_cell(0, 0, 200), "undefined id");
    assert!(sim.set_cell(0, 0, ids::SAND));
    assert_eq!(sim.get_cell(0, 0), ids::SAND);
}

#[test]
fn fill_disc_clips_to_grid() {
    let mut sim = builtin(10, 10, 1);
    assert_eq!(sim.fill_disc(0, 0, 2, ids::SAND), 6);
    assert_eq!(count(&sim, ids::SAND), 6);
    assert_eq!(sim.fill_disc(0, 0, 2, EMPTY), 6);
    assert_eq!(count(&sim, ids::SAND), 0);
    assert_eq!(sim.fill_disc(5, 5, -1, ids::SAND), 0);
}

#[test]
fn sand_reaches_the_floor() {
    let mut sim = builtin(16, 16, 9);
    sim.set_cell(8, 0, ids::SAND);
    sim.steps(100);
    assert_eq!(count(&sim, ids::SAND), 1);
    assert!((0..16).any(|x| sim.get_cell(x, 15) == ids::SAND));
}

#[test]
fn walls_never_move() {
    let mut sim = builtin(64, 48, 4);
    for x in 0..64 {
        sim.set_cell(x, 40, ids::WALL);
    }
    for x in (4..60).step_by(6) {
        sim.fill_disc(x, 20, 2, ids::SAND);
    }
    sim.fill_disc(10, 30, 3, ids::WATER);
    sim.fill_disc(30, 30, 3, ids::ACID);
    sim.fill_disc(50, 30, 3, ids::LAVA);
    sim.fill_disc(40, 10, 2, ids::GUNPOWDER);
    sim.set_cell(20, 5, ids::LIGHTNING);

    let walls: Vec<usize> = sim
        .cells()
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == ids::WALL)
        .map(|(i, _)| i)
        .collect();

    for _ in 0..300 {
        sim.step();
        for &i in &walls {
            assert_eq!(sim.cells()[i], ids::WALL);
        }
    }
    assert_eq!(count(&sim, ids::WALL), walls.len());
}

#[test]
fn immediate_writes_chain_within_a_pass() {
    let mut sim = custom(seeder(Commit::Immediate), 1, 8);
    sim.set_cell(0, 0, SEED);
    sim.step();
    assert_eq!(count(&sim, SEED), 8);
}

#[test]
fn end_of_pass_writes_do_not_chain() {
    let mut sim = custom(seeder(Commit::EndOfPass), 1, 8);
    sim.set_cell(0, 0, SEED);
    sim.step();
    assert_eq!(count(&sim, SEED), 2);
    sim.step();
    assert_eq!(count(&sim, SEED), 3);
}

#[test]
fn end_of_tick_writes_land_after_both_passes() {
    let mut sim = custom(seeder(Commit::EndOfTick), 1, 8);
    sim.set_cell(0, 0, SEED);
    sim.step();
    assert_eq!(count(&sim, SEED), 2);
}

#[test]
fn deferred_movers_racing_for_one_cell_keep_both_particles() {
    const GRAIN: MaterialId = 1;
    for commit in [Commit::EndOfPass, Commit::EndOfTick] {
        let mut c = Catalog::new();
        c.insert(
            GRAIN,
            Archetype::new("grain", 0).rule(
                Rule::offsets(&[(1, 0), (-1, 0)])
                    .with_samples(2)
                    .commit_at(commit)
                    .when(Predicate::id(EMPTY), Effect::swap()),
            ),
        )
        .unwrap();
        let book = Arc::new(RuleBook::compile(c).unwrap());

        for seed in 1..=40 {
            let mut sim = Simulation::new(SimulationConfig::new(8, 1, seed), Arc::clone(&book)).unwrap();
            sim.set_cell(0, 0, GRAIN);
            sim.set_cell(2, 0, GRAIN);
            sim.step();
            assert_eq!(count(&sim, GRAIN), 2, "{commit:?} seed {seed}");
        }
    }
}

#[test]
fn no_particle_moves_twice_in_a_pass() {
    let mut sim = builtin(64, 64, 77);
    sim.fill_disc(20, 10, 6, ids::SAND);
    sim.fill_disc(40, 12, 6, ids::WATER);
    sim.fill_disc(32, 50, 4, ids::STEAM);
    sim.set_cell(32, 32, ids::BLACK_HOLE);
    sim.enable_move_trace(true);

    for _ in 0..60 {
        sim.step();
    }

    let trace = sim.move_trace().unwrap();
    assert!(!trace.moves().is_empty());
    assert!(trace.repeated_moves().is_empty(), "{:?}", &trace.repeated_moves()[..1]);
}

#[test]
fn handlers_run_for_special_materials() {
    let mut sim = builtin(32, 32, 5);
    assert_eq!(sim.bind_handler("tap", Arc::new(EmitterHandler::new(ids::WATER, 1.0))), 1);
    sim.set_cell(16, 4, ids::TAP);
    sim.step();
    assert_eq!(sim.get_cell(16, 4), ids::TAP);
    assert_eq!(count(&sim, ids::WATER), 1);

    sim.steps(20);
    assert_eq!(sim.get_cell(16, 4), ids::TAP);
    assert!(count(&sim, ids::WATER) > 1);
}

#[test]
fn special_materials_keep_their_chunk_awake() {
    let mut c = Catalog::new();
    c.insert(1, Archetype::new("critter", 0).creature()).unwrap();
    let mut sim = custom(c, 96, 32);
    sim.set_cell(5, 5, 1);

    sim.steps(SLEEP_TICKS);
    assert!(sim.is_chunk_active(0, 0));
    assert!(!sim.is_chunk_active(2, 0));
    assert_eq!(sim.active_chunks(), 1);
}

const SLEEP_TICKS: u32 = crate::spatial::chunks::SLEEP_THRESHOLD as u32 + 5;

#[test]
fn idle_chunks_sleep_and_wake_with_neighbours() {
    let mut sim = builtin(128, 128, 3);
    sim.steps(SLEEP_TICKS);
    assert_eq!(sim.active_chunks(), 0);

    sim.set_cell(40, 40, ids::SAND);
    assert!(sim.is_chunk_active(1, 1));
    assert_eq!(sim.active_chunks(), 1);

    sim.step();
    for cy in 0..3 {
        for cx in 0..3 {
            assert!(sim.is_chunk_active(cx, cy), "chunk ({cx}, {cy})");
        }
    }
    assert!(!sim.is_chunk_active(3, 3));
}

#[test]
fn sleeping_can_be_disabled() {
    let mut sim = builtin(64, 64, 3);
    sim.set_chunk_sleeping_enabled(false);
    sim.steps(SLEEP_TICKS);
    assert_eq!(sim.active_chunks(), sim.total_chunks());
}

#[test]
fn reset_clears_everything() {
    let mut sim = builtin(40, 40, 1);
    sim.fill_disc(20, 20, 5, ids::WATER);
    sim.steps(SLEEP_TICKS);

    sim.reset(7);
    assert_eq!(count(&sim, EMPTY), 1600);
    assert_eq!(sim.step_count(), 0);
    assert_eq!(sim.seed(), 7);
    assert_eq!(sim.rng_state(), Rng::new(7).state());
    assert_eq!(sim.active_chunks(), sim.total_chunks());
}

#[test]
fn load_restores_dimensions_and_state() {
    let mut a = builtin(40, 30, 11);
    a.fill_disc(10, 10, 4, ids::SAND);
    a.steps(5);
    let bytes = a.save();

    let mut b = builtin(10, 10, 2);
    b.load(&bytes).unwrap();
    assert_eq!((b.width(), b.height()), (40, 30));
    assert_eq!(b.cells(), a.cells());
    assert_eq!(b.rng_state(), a.rng_state());
    assert_eq!(b.step_count(), 5);
    assert_eq!(b.seed(), 11);
    assert_eq!(b.save(), bytes);
}

#[test]
fn failed_load_leaves_simulation_untouched() {
    let mut sim = builtin(8, 8, 2);
    sim.set_cell(1, 1, ids::SAND);
    let before = sim.save();

    assert!(matches!(sim.load(b"NOPE\x04"), Err(SaveError::BadMagic { .. })));
    let mut cells = vec![EMPTY; 16];
    cells[3] = 200;
    let unknown = format::encode(4, 4, 1, 0, 1, &cells);
    assert_eq!(sim.load(&unknown), Err(SaveError::UnknownMaterial { index: 3, id: 200 }));

    assert_eq!(sim.save(), before);
}

#[test]
fn legacy_load_reseeds_from_current_seed() {
    let mut sim = builtin(4, 4, 99);
    sim.steps(3);
    let mut legacy = b"SAND".to_vec();
    legacy.extend_from_slice(&2u16.to_le_bytes());
    legacy.extend_from_slice(&2u16.to_le_bytes());
    legacy.extend_from_slice(&[ids::SAND, 0, 0, ids::WATER]);

    sim.load(&legacy).unwrap();
    assert_eq!((sim.width(), sim.height()), (2, 2));
    assert_eq!(sim.step_count(), 0);
    assert_eq!(sim.rng_state(), Rng::new(99).state());
    assert_eq!(sim.get_cell(1, 1), ids::WATER);
}

#[test]
fn perf_stats_only_when_enabled() {
    let mut sim = builtin(64, 64, 1);
    sim.fill_disc(32, 10, 5, ids::SAND);
    sim.step();
    assert_eq!(sim.perf_stats().cells_visited(), 0);

    sim.enable_perf_metrics(true);
    sim.step();
    let stats = sim.perf_stats();
    assert!(stats.cells_visited() > 0);
    assert!(stats.rules_attempted() >= stats.rules_fired());
    assert_eq!(stats.step_count(), 2);
    assert!(stats.step_ms() >= 0.0);
}

#[test]
fn dirty_rects_drain() {
    let mut sim = builtin(96, 64, 1);
    assert_eq!(sim.collect_dirty_rects().len(), 1);
    assert!(sim.collect_dirty_rects().is_empty());

    sim.set_cell(70, 5, ids::WALL);
    let rects = sim.collect_dirty_rects().as_slice().to_vec();
    assert_eq!(rects.len(), 1);
    assert_eq!((rects[0].cx, rects[0].cy), (2, 0));
}
