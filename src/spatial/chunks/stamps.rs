use super::*;

// Tick-parity stamps. `begin_pass` zeroes whatever the previous pass stamped
// and flips parity between 1 and 2, so a cell is "already moved" only if it
// was stamped during the current pass.

impl ChunkMap {
    pub fn begin_pass(&mut self) {
        for &idx in &self.stamped {
            self.stamps[idx as usize] = 0;
        }
        self.stamped.clear();
        self.parity = if self.parity == 1 { 2 } else { 1 };
    }

    #[inline]
    pub fn parity(&self) -> u8 {
        self.parity
    }

    #[inline(always)]
    pub fn is_stamped(&self, idx: usize) -> bool {
        *fast!(self.stamps, [idx]) == self.parity
    }

    #[inline]
    pub fn stamp(&mut self, idx: usize) {
        if *fast!(self.stamps, [idx]) != self.parity {
            fast!(self.stamps, [idx] = self.parity);
            self.stamped.push(idx as u32);
        }
    }

    pub fn clear_stamps(&mut self) {
        self.stamps.fill(0);
        self.stamped.clear();
    }

    pub fn stamped_count(&self) -> usize {
        self.stamped.len()
    }
}
