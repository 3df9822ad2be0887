//! Grid - flat row-major material-id storage
//!
//! One byte per cell, `0` = empty. Reads outside the grid return the
//! `OUT_OF_BOUNDS` sentinel instead of failing.

use crate::domain::materials::{MaterialId, EMPTY, OUT_OF_BOUNDS};

pub struct Grid {
    width: u32,
    height: u32,
    size: usize,

    pub types: Vec<MaterialId>,
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            width,
            height,
            size,
            types: vec![EMPTY; size],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Cell count.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + x as usize
    }

    #[inline]
    pub fn coords(&self, idx: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((idx % w) as u32, (idx / w) as u32)
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as u32) < self.width && y >= 0 && (y as u32) < self.height
    }

    /// Caller guarantees `x < width && y < height`.
    #[inline(always)]
    pub fn index_unchecked(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) outside {}x{}", self.width, self.height);
        self.index(x, y)
    }

    /// Bounds-checked read. Off-grid → `OUT_OF_BOUNDS`.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> MaterialId {
        if self.in_bounds(x, y) {
            let idx = self.index_unchecked(x as u32, y as u32);
            *fast!(self.types, [idx])
        } else {
            OUT_OF_BOUNDS
        }
    }

    #[inline(always)]
    pub fn get_idx(&self, idx: usize) -> MaterialId {
        *fast!(self.types, [idx])
    }

    #[inline(always)]
    pub fn set_idx(&mut self, idx: usize, id: MaterialId) {
        fast!(self.types, [idx] = id);
    }

    pub fn clear(&mut self) {
        self.types.fill(EMPTY);
    }

    /// Overwrite every cell. `cells.len()` must equal `size()`.
    pub fn copy_from(&mut self, cells: &[MaterialId]) {
        self.types.copy_from_slice(cells);
    }

    #[inline]
    pub fn as_slice(&self) -> &[MaterialId] {
        &self.types
    }

    /// Get pointer to types array (for JS rendering)
    pub fn types_ptr(&self) -> *const MaterialId {
        self.types.as_ptr()
    }

    pub fn non_empty_count(&self) -> usize {
        self.types.iter().filter(|&&t| t != EMPTY).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_outside_return_sentinel() {
        let mut grid = Grid::new(4, 3);
        let idx = grid.index(3, 2);
        grid.set_idx(idx, 7);
        assert_eq!(grid.get(3, 2), 7);
        assert_eq!(grid.get(-1, 0), OUT_OF_BOUNDS);
        assert_eq!(grid.get(4, 0), OUT_OF_BOUNDS);
        assert_eq!(grid.get(0, 3), OUT_OF_BOUNDS);
        assert_eq!(grid.non_empty_count(), 1);
    }

    #[test]
    fn index_and_coords_agree() {
        let grid = Grid::new(5, 7);
        for y in 0..7 {
            for x in 0..5 {
                assert_eq!(grid.coords(grid.index(x, y)), (x, y));
            }
        }
    }
}
