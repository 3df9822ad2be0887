//! End-of-pass / end-of-tick write queues.
//!
//! Deferred writes are recorded in evaluation order and applied in that
//! order, so later writes to the same cell win. Moves are queued as swap
//! pairs carrying the ids both cells held when the move was decided; a pair
//! whose cells no longer hold those ids at flush time is dropped, so two
//! movers racing for one cell never destroy a particle.

use crate::domain::materials::MaterialId;
use crate::spatial::chunks::ChunkMap;
use crate::spatial::grid::Grid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Write {
    Set { idx: u32, id: MaterialId },
    Swap { from: u32, to: u32, moving: MaterialId, displaced: MaterialId },
}

#[derive(Default)]
pub struct DeferredWrites {
    pass: Vec<Write>,
    tick: Vec<Write>,
}

impl DeferredWrites {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push_pass(&mut self, idx: usize, id: MaterialId) {
        self.pass.push(Write::Set { idx: idx as u32, id });
    }

    #[inline]
    pub fn push_tick(&mut self, idx: usize, id: MaterialId) {
        self.tick.push(Write::Set { idx: idx as u32, id });
    }

    /// Queue moving `moving` from `from` into `to`, which held `displaced`.
    #[inline]
    pub fn swap_pass(&mut self, from: usize, to: usize, moving: MaterialId, displaced: MaterialId) {
        self.pass.push(Write::Swap { from: from as u32, to: to as u32, moving, displaced });
    }

    #[inline]
    pub fn swap_tick(&mut self, from: usize, to: usize, moving: MaterialId, displaced: MaterialId) {
        self.tick.push(Write::Swap { from: from as u32, to: to as u32, moving, displaced });
    }

    pub fn pending(&self) -> usize {
        self.pass.len() + self.tick.len()
    }

    /// Apply and drain the end-of-pass queue. Returns cells written.
    pub fn flush_pass(&mut self, grid: &mut Grid, chunks: &mut ChunkMap) -> usize {
        apply(&mut self.pass, grid, chunks)
    }

    pub fn flush_tick(&mut self, grid: &mut Grid, chunks: &mut ChunkMap) -> usize {
        apply(&mut self.tick, grid, chunks)
    }

    pub fn clear(&mut self) {
        self.pass.clear();
        self.tick.clear();
    }
}

#[inline]
fn set(grid: &mut Grid, chunks: &mut ChunkMap, idx: usize, id: MaterialId) {
    grid.set_idx(idx, id);
    let (x, y) = grid.coords(idx);
    chunks.touch_cell(x, y);
}

fn apply(queue: &mut Vec<Write>, grid: &mut Grid, chunks: &mut ChunkMap) -> usize {
    let mut written = 0;
    for write in queue.drain(..) {
        match write {
            Write::Set { idx, id } => {
                set(grid, chunks, idx as usize, id);
                written += 1;
            }
            Write::Swap { from, to, moving, displaced } => {
                let (from, to) = (from as usize, to as usize);
                if grid.get_idx(from) != moving || grid.get_idx(to) != displaced {
                    continue;
                }
                set(grid, chunks, to, moving);
                set(grid, chunks, from, displaced);
                written += 2;
            }
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queues_apply_in_order_and_wake() {
        let mut grid = Grid::new(64, 32);
        let mut chunks = ChunkMap::new(64, 32);
        for _ in 0..200 {
            chunks.update_activity(&grid, |_| false);
        }
        assert_eq!(chunks.active_chunk_count(), 0);

        let mut deferred = DeferredWrites::new();
        let idx = grid.index(40, 3);
        deferred.push_tick(idx, 5);
        deferred.push_tick(idx, 6);
        deferred.push_pass(0, 9);
        assert_eq!(deferred.pending(), 3);

        assert_eq!(deferred.flush_pass(&mut grid, &mut chunks), 1);
        assert_eq!(grid.get(0, 0), 9);
        assert_eq!(grid.get(40, 3), 0);

        assert_eq!(deferred.flush_tick(&mut grid, &mut chunks), 2);
        assert_eq!(grid.get(40, 3), 6);
        assert!(chunks.is_active(0, 0) && chunks.is_active(1, 0));
        assert_eq!(deferred.pending(), 0);
    }

    #[test]
    fn stale_swaps_are_dropped() {
        let mut grid = Grid::new(8, 1);
        let mut chunks = ChunkMap::new(8, 1);
        grid.set_idx(0, 2);
        grid.set_idx(2, 2);

        // Both particles decided to move into the empty cell 1.
        let mut deferred = DeferredWrites::new();
        deferred.swap_pass(0, 1, 2, 0);
        deferred.swap_pass(2, 1, 2, 0);

        assert_eq!(deferred.flush_pass(&mut grid, &mut chunks), 2);
        assert_eq!(&grid.as_slice()[..3], &[0, 2, 2]);
    }

    #[test]
    fn swap_sees_earlier_writes_in_the_queue() {
        let mut grid = Grid::new(4, 1);
        let mut chunks = ChunkMap::new(4, 1);
        grid.set_idx(0, 2);

        let mut deferred = DeferredWrites::new();
        deferred.push_tick(1, 7);
        deferred.swap_tick(0, 1, 2, 0);

        assert_eq!(deferred.flush_tick(&mut grid, &mut chunks), 1);
        assert_eq!(grid.as_slice(), &[2, 7, 0, 0]);
    }
}
