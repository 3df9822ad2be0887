use super::*;

use super::bitset::check_bit;

// Render-dirty chunks are merged into rectangles so the host can upload a
// few large regions instead of one region per chunk. Horizontal runs per
// chunk row first, then runs with equal x/width on consecutive rows fuse.

/// Rectangle of render-dirty chunks, in chunk units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirtyRect {
    pub cx: u32,
    pub cy: u32,
    pub cw: u32,
    pub ch: u32,
}

/// Reused output buffer for dirty rectangle collection.
#[derive(Default)]
pub struct MergedDirtyRects {
    rects: Vec<DirtyRect>,
}

impl MergedDirtyRects {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.rects.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn as_slice(&self) -> &[DirtyRect] {
        &self.rects
    }

    /// `[cx, cy, cw, ch, cx, cy, ...]` for hosts that want a flat array.
    pub fn to_flat(&self) -> Vec<u32> {
        self.rects
            .iter()
            .flat_map(|r| [r.cx, r.cy, r.cw, r.ch])
            .collect()
    }

    fn merge_vertical(&mut self) {
        let mut i = 0;
        while i < self.rects.len() {
            let mut j = i + 1;
            while j < self.rects.len() {
                let (a, b) = (self.rects[i], self.rects[j]);
                if b.cx == a.cx && b.cw == a.cw && b.cy == a.cy + a.ch {
                    self.rects[i].ch += b.ch;
                    // Order of the remaining rects is preserved for the host.
                    self.rects.remove(j);
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
    }
}

impl ChunkMap {
    /// Collect render-dirty chunks into merged rectangles. Does not clear the
    /// dirty bits; hosts call `clear_render_dirty` once the upload is done.
    pub fn collect_dirty_rects(&self, out: &mut MergedDirtyRects) -> usize {
        out.clear();

        for cy in 0..self.chunks_y {
            let mut run_start: Option<u32> = None;

            for cx in 0..self.chunks_x {
                let idx = self.chunk_idx_from_coords(cx, cy);
                if check_bit(&self.render_dirty_bits, idx) {
                    run_start.get_or_insert(cx);
                } else if let Some(start) = run_start.take() {
                    out.rects.push(DirtyRect { cx: start, cy, cw: cx - start, ch: 1 });
                }
            }

            if let Some(start) = run_start {
                out.rects.push(DirtyRect {
                    cx: start,
                    cy,
                    cw: self.chunks_x - start,
                    ch: 1,
                });
            }
        }

        out.merge_vertical();
        out.len()
    }
}
