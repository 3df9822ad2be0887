use super::*;

use crate::domain::materials::MaterialId;
use crate::spatial::grid::Grid;

use super::bitset::set_bit;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const FNV_OFFSET: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;

/// FNV-1a over the chunk's cells in row-major order. Order-sensitive, so
/// moving a particle inside the chunk changes the sum.
pub(crate) fn chunk_checksum(types: &[MaterialId], width: u32, height: u32, cx: u32, cy: u32) -> u32 {
    let (x0, y0, x1, y1) = chunk_bounds(width, height, cx, cy);
    let w = width as usize;
    let mut hash = FNV_OFFSET;
    for y in y0..y1 {
        let row = y as usize * w;
        for &t in &types[row + x0 as usize..row + x1 as usize] {
            hash ^= t as u32;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

impl ChunkMap {
    // === Wake ===

    /// Wake a chunk by index. Clears its sleep counter.
    #[inline]
    pub fn wake_idx(&mut self, idx: usize) {
        if idx >= self.chunk_count {
            return;
        }
        self.sleep[idx] = 0;
        if !self.active[idx] {
            self.active[idx] = true;
            self.woke_this_tick = self.woke_this_tick.saturating_add(1);
        }
    }

    /// A cell was written: wake its chunk and mark it for redraw.
    #[inline]
    pub fn touch_cell(&mut self, x: u32, y: u32) {
        let idx = self.chunk_index(x, y);
        self.wake_idx(idx);
        set_bit(&mut self.render_dirty_bits, idx);
    }

    /// Wake (and mark render-dirty) every chunk intersecting the disc.
    pub fn wake_disc(&mut self, cx: i32, cy: i32, radius: i32) {
        let r = radius.max(0);
        let min_x = (cx - r).max(0);
        let min_y = (cy - r).max(0);
        let max_x = (cx + r).min(self.width as i32 - 1);
        let max_y = (cy + r).min(self.height as i32 - 1);
        if min_x > max_x || min_y > max_y {
            return;
        }

        let r2 = (r as i64) * (r as i64);
        for ky in (min_y >> CHUNK_SHIFT)..=(max_y >> CHUNK_SHIFT) {
            for kx in (min_x >> CHUNK_SHIFT)..=(max_x >> CHUNK_SHIFT) {
                let (x0, y0, x1, y1) = self.chunk_bounds(kx as u32, ky as u32);
                // Closest point of the chunk to the disc centre.
                let px = cx.clamp(x0 as i32, x1 as i32 - 1) as i64;
                let py = cy.clamp(y0 as i32, y1 as i32 - 1) as i64;
                let dx = px - cx as i64;
                let dy = py - cy as i64;
                if dx * dx + dy * dy > r2 {
                    continue;
                }
                let idx = self.chunk_idx_from_coords(kx as u32, ky as u32);
                self.wake_idx(idx);
                set_bit(&mut self.render_dirty_bits, idx);
            }
        }
    }

    pub fn wake_all(&mut self) {
        for idx in 0..self.chunk_count {
            self.wake_idx(idx);
        }
        self.mark_all_render_dirty();
    }

    fn wake_neighbours(&mut self, idx: usize) {
        let cx = (idx % self.chunks_x as usize) as i32;
        let cy = (idx / self.chunks_x as usize) as i32;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if (dx != 0 || dy != 0) && self.chunk_in_bounds(cx + dx, cy + dy) {
                    let n = self.chunk_idx_from_coords((cx + dx) as u32, (cy + dy) as u32);
                    self.wake_idx(n);
                }
            }
        }
    }

    // === Reconciliation ===

    /// Once per tick after both passes: checksum every active chunk; changed
    /// chunks wake their 8 neighbours, unchanged ones count toward sleep.
    /// A chunk reaching the threshold stays awake if `keep_awake` holds for
    /// any of its cells.
    pub fn update_activity<F>(&mut self, grid: &Grid, keep_awake: F)
    where
        F: Fn(MaterialId) -> bool,
    {
        let active = &self.active;
        self.scratch_active.clear();
        self.scratch_active
            .extend((0..self.chunk_count).filter(|&i| active[i]));

        let (width, height, chunks_x) = (self.width, self.height, self.chunks_x as usize);
        let types = grid.as_slice();
        let sum_of = |idx: usize| {
            chunk_checksum(types, width, height, (idx % chunks_x) as u32, (idx / chunks_x) as u32)
        };

        #[cfg(feature = "parallel")]
        {
            self.scratch_active
                .par_iter()
                .map(|&idx| sum_of(idx))
                .collect_into_vec(&mut self.scratch_sums);
        }

        #[cfg(not(feature = "parallel"))]
        {
            self.scratch_sums.clear();
            self.scratch_sums
                .extend(self.scratch_active.iter().map(|&idx| sum_of(idx)));
        }

        for k in 0..self.scratch_active.len() {
            let idx = self.scratch_active[k];
            let sum = self.scratch_sums[k];

            if sum != self.checksums[idx] {
                self.checksums[idx] = sum;
                self.sleep[idx] = 0;
                set_bit(&mut self.render_dirty_bits, idx);
                self.wake_neighbours(idx);
                continue;
            }

            self.sleep[idx] = self.sleep[idx].saturating_add(1);
            if !self.sleeping_enabled || self.sleep[idx] < SLEEP_THRESHOLD {
                continue;
            }

            let (x0, y0, x1, y1) = chunk_bounds(width, height, (idx % chunks_x) as u32, (idx / chunks_x) as u32);
            let pinned = (y0..y1).any(|y| {
                let row = y as usize * width as usize;
                types[row + x0 as usize..row + x1 as usize]
                    .iter()
                    .any(|&t| keep_awake(t))
            });

            if pinned {
                self.sleep[idx] = 0;
            } else {
                self.active[idx] = false;
                self.slept_this_tick = self.slept_this_tick.saturating_add(1);
            }
        }
    }
}
