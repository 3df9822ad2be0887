use crate::domain::materials::EMPTY;
use crate::spatial::chunks::{CHUNK_SHIFT, CHUNK_SIZE};
use crate::systems::compiler::Pass;
use crate::systems::handlers::HandlerContext;
use crate::systems::interpreter::{run_cell, CellContext, PassStats};

use super::Simulation;

/// Per-pass counters that the interpreter does not track itself.
#[derive(Default)]
pub(super) struct PassTotals {
    pub(super) rules: PassStats,
    pub(super) handler_calls: u32,
    pub(super) deferred_writes: u32,
}

/// One full scan. Rising walks rows top to bottom, falling bottom to top;
/// each row picks its column direction with one RNG draw. Inactive chunks
/// are skipped whole.
pub(super) fn run_pass(sim: &mut Simulation, pass: Pass, totals: &mut PassTotals) {
    sim.chunks.begin_pass();
    if let Some(trace) = sim.trace.as_mut() {
        trace.begin_pass();
    }

    let (width, height) = (sim.grid.width(), sim.grid.height());
    let (chunks_x, _) = sim.chunks.dimensions();

    for row in 0..height {
        let y = match pass {
            Pass::Rising => row,
            Pass::Falling => height - 1 - row,
        };
        let cy = y >> CHUNK_SHIFT;
        let go_right = sim.rng.next_f32() < 0.5;

        for k in 0..chunks_x {
            let cx = if go_right { k } else { chunks_x - 1 - k };
            if !sim.chunks.is_active(cx, cy) {
                continue;
            }
            let x0 = cx * CHUNK_SIZE;
            let x1 = (x0 + CHUNK_SIZE).min(width);
            if go_right {
                for x in x0..x1 {
                    visit_cell(sim, pass, x, y, totals);
                }
            } else {
                for x in (x0..x1).rev() {
                    visit_cell(sim, pass, x, y, totals);
                }
            }
        }
    }

    let flushed = sim.deferred.flush_pass(&mut sim.grid, &mut sim.chunks);
    totals.deferred_writes += flushed as u32;
}

#[inline]
fn visit_cell(sim: &mut Simulation, pass: Pass, x: u32, y: u32, totals: &mut PassTotals) {
    let idx = sim.grid.index_unchecked(x, y);
    let id = sim.grid.get_idx(idx);
    if id == EMPTY || sim.chunks.is_stamped(idx) {
        return;
    }

    let book = &*sim.book;

    // Handler materials run once per tick, in the falling pass.
    if book.is_special(id) {
        if pass == Pass::Falling {
            if let Some(handler) = sim.handlers.get(id) {
                let mut ctx = HandlerContext {
                    grid: &mut sim.grid,
                    chunks: &mut sim.chunks,
                    rng: &mut sim.rng,
                    book,
                    x,
                    y,
                    material: id,
                };
                handler.update(&mut ctx);
                totals.handler_calls += 1;
            }
        }
        return;
    }

    let mut ctx = CellContext {
        grid: &mut sim.grid,
        chunks: &mut sim.chunks,
        rng: &mut sim.rng,
        deferred: &mut sim.deferred,
        book,
        trace: sim.trace.as_mut(),
        stats: &mut totals.rules,
    };
    run_cell(&mut ctx, pass, x, y);
}
