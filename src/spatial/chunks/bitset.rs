use super::*;

// 1 bit = 1 chunk, u64 holds 64 chunks.

#[inline(always)]
pub(super) fn set_bit(bits: &mut [u64], idx: usize) {
    let word = idx >> 6;
    if word < bits.len() {
        bits[word] |= 1u64 << (idx & 63);
    }
}

#[inline(always)]
pub(super) fn check_bit(bits: &[u64], idx: usize) -> bool {
    let word = idx >> 6;
    word < bits.len() && (bits[word] & (1u64 << (idx & 63))) != 0
}

impl ChunkMap {
    #[inline]
    pub fn mark_render_dirty(&mut self, idx: usize) {
        if idx < self.chunk_count {
            set_bit(&mut self.render_dirty_bits, idx);
        }
    }

    #[inline]
    pub fn is_render_dirty(&self, cx: u32, cy: u32) -> bool {
        check_bit(&self.render_dirty_bits, self.chunk_idx_from_coords(cx, cy))
    }

    pub fn mark_all_render_dirty(&mut self) {
        self.render_dirty_bits.fill(!0u64);
    }

    pub fn clear_render_dirty(&mut self) {
        self.render_dirty_bits.fill(0);
    }

    /// Only the low `chunk_count` bits are meaningful.
    pub fn render_dirty_count(&self) -> usize {
        (0..self.chunk_count)
            .filter(|&i| check_bit(&self.render_dirty_bits, i))
            .count()
    }
}
