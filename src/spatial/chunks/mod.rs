//! Chunk Activity Tracker
//!
//! The grid is tiled into 32x32 chunks. A chunk is simulated only while it is
//! active; it goes to sleep after `SLEEP_THRESHOLD` consecutive ticks in which
//! its content checksum did not change. Anything that writes into a chunk from
//! outside the step loop must wake it.
//!
//! Also owns the per-cell tick-parity stamps that stop a particle from being
//! moved twice in one pass, and the render-dirty bits the host drains.

mod activity;
mod bitset;
mod dirty_rects;
mod stamps;

pub use dirty_rects::{DirtyRect, MergedDirtyRects};

pub const CHUNK_SHIFT: u32 = 5;

/// Chunk edge in cells. Power of two so cell → chunk is a shift.
pub const CHUNK_SIZE: u32 = 1 << CHUNK_SHIFT;

/// Unchanged ticks before an active chunk is put to sleep.
pub const SLEEP_THRESHOLD: u8 = 60;

pub struct ChunkMap {
    width: u32,
    height: u32,
    chunks_x: u32,
    chunks_y: u32,
    chunk_count: usize,

    active: Vec<bool>,
    sleep: Vec<u8>,
    checksums: Vec<u32>,
    render_dirty_bits: Vec<u64>,

    // Per-cell stamps; only cells listed in `stamped` can be non-zero.
    stamps: Vec<u8>,
    parity: u8,
    stamped: Vec<u32>,

    sleeping_enabled: bool,
    woke_this_tick: u32,
    slept_this_tick: u32,

    scratch_active: Vec<usize>,
    scratch_sums: Vec<u32>,
}

impl ChunkMap {
    pub fn new(width: u32, height: u32) -> Self {
        let chunks_x = (width + CHUNK_SIZE - 1) >> CHUNK_SHIFT;
        let chunks_y = (height + CHUNK_SIZE - 1) >> CHUNK_SHIFT;
        let chunk_count = (chunks_x as usize) * (chunks_y as usize);
        let cells = (width as usize) * (height as usize);

        Self {
            width,
            height,
            chunks_x,
            chunks_y,
            chunk_count,
            active: vec![true; chunk_count],
            sleep: vec![0; chunk_count],
            checksums: vec![0; chunk_count],
            render_dirty_bits: vec![!0u64; (chunk_count + 63) / 64],
            stamps: vec![0; cells],
            parity: 1,
            stamped: Vec::new(),
            sleeping_enabled: true,
            woke_this_tick: 0,
            slept_this_tick: 0,
            scratch_active: Vec::with_capacity(chunk_count),
            scratch_sums: Vec::with_capacity(chunk_count),
        }
    }

    /// Reallocate for new grid dimensions, keeping settings.
    pub fn resize(&mut self, width: u32, height: u32) {
        let sleeping_enabled = self.sleeping_enabled;
        *self = Self::new(width, height);
        self.sleeping_enabled = sleeping_enabled;
    }

    // === Chunk indexing ===

    /// Get chunk index from cell coordinates
    #[inline]
    pub fn chunk_index(&self, x: u32, y: u32) -> usize {
        self.chunk_idx_from_coords(x >> CHUNK_SHIFT, y >> CHUNK_SHIFT)
    }

    #[inline]
    pub fn chunk_idx_from_coords(&self, cx: u32, cy: u32) -> usize {
        (cy as usize) * (self.chunks_x as usize) + cx as usize
    }

    #[inline]
    pub fn chunk_in_bounds(&self, cx: i32, cy: i32) -> bool {
        cx >= 0 && cx < self.chunks_x as i32 && cy >= 0 && cy < self.chunks_y as i32
    }

    /// Cell rectangle `[x0, x1) x [y0, y1)` covered by chunk (cx, cy).
    #[inline]
    pub fn chunk_bounds(&self, cx: u32, cy: u32) -> (u32, u32, u32, u32) {
        chunk_bounds(self.width, self.height, cx, cy)
    }

    // === State ===

    #[inline]
    pub fn is_active(&self, cx: u32, cy: u32) -> bool {
        self.active[self.chunk_idx_from_coords(cx, cy)]
    }

    pub fn set_sleeping_enabled(&mut self, enabled: bool) {
        self.sleeping_enabled = enabled;
        if !enabled {
            self.wake_all();
        }
    }

    /// Called once at the start of each tick.
    pub fn begin_tick(&mut self) {
        self.woke_this_tick = 0;
        self.slept_this_tick = 0;
    }

    /// Forget stored checksums so the next reconciliation treats every
    /// active chunk as changed.
    pub fn reset_checksums(&mut self) {
        self.checksums.fill(0);
    }

    // === Statistics ===

    pub fn active_chunk_count(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    pub fn total_chunks(&self) -> usize {
        self.chunk_count
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.chunks_x, self.chunks_y)
    }

    pub fn woke_this_tick(&self) -> u32 {
        self.woke_this_tick
    }

    pub fn slept_this_tick(&self) -> u32 {
        self.slept_this_tick
    }
}

#[inline]
pub(crate) fn chunk_bounds(width: u32, height: u32, cx: u32, cy: u32) -> (u32, u32, u32, u32) {
    let x0 = cx << CHUNK_SHIFT;
    let y0 = cy << CHUNK_SHIFT;
    (x0, y0, (x0 + CHUNK_SIZE).min(width), (y0 + CHUNK_SIZE).min(height))
}
