use crate::domain::materials::MaterialId;

use super::Simulation;

pub(super) fn set_cell(sim: &mut Simulation, x: i32, y: i32, id: MaterialId) -> bool {
    if !sim.grid.in_bounds(x, y) || !sim.book.is_known(id) {
        return false;
    }
    let idx = sim.grid.index_unchecked(x as u32, y as u32);
    sim.grid.set_idx(idx, id);
    sim.chunks.touch_cell(x as u32, y as u32);
    true
}

pub(super) fn fill_disc(sim: &mut Simulation, cx: i32, cy: i32, radius: i32, id: MaterialId) -> usize {
    if radius < 0 || !sim.book.is_known(id) {
        return 0;
    }

    let r2 = radius * radius;
    let mut written = 0;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let (x, y) = (cx + dx, cy + dy);
            if sim.grid.in_bounds(x, y) {
                let idx = sim.grid.index_unchecked(x as u32, y as u32);
                sim.grid.set_idx(idx, id);
                written += 1;
            }
        }
    }

    if written > 0 {
        sim.chunks.wake_disc(cx, cy, radius);
    }
    written
}

pub(super) fn clear(sim: &mut Simulation) {
    sim.grid.clear();
    sim.deferred.clear();
    sim.chunks.clear_stamps();
    sim.chunks.wake_all();
}
