//! Special material handlers.
//!
//! Spawners, creatures and materials naming a handler key never reach the
//! rule interpreter. The falling pass routes them to the `MaterialHandler`
//! bound for their id; an id with nothing bound just sits still.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::rng::Rng;
use crate::domain::materials::{MaterialId, EMPTY, MAX_TYPE, OUT_OF_BOUNDS};
use crate::spatial::chunks::ChunkMap;
use crate::spatial::grid::Grid;

use super::compiler::RuleBook;

/// Neighbour directions: up, right, down, left.
const DIRECTIONS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

pub struct HandlerContext<'a> {
    pub(crate) grid: &'a mut Grid,
    pub(crate) chunks: &'a mut ChunkMap,
    pub(crate) rng: &'a mut Rng,
    pub(crate) book: &'a RuleBook,
    pub x: u32,
    pub y: u32,
    pub material: MaterialId,
}

impl<'a> HandlerContext<'a> {
    /// Out-of-range reads return `OUT_OF_BOUNDS`.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> MaterialId {
        self.grid.get(x, y)
    }

    #[inline]
    pub fn is_empty(&self, x: i32, y: i32) -> bool {
        self.grid.get(x, y) == EMPTY
    }

    /// Write and wake the chunk. Off-grid writes and unknown ids are ignored.
    pub fn set(&mut self, x: i32, y: i32, id: MaterialId) -> bool {
        if !self.grid.in_bounds(x, y) || !self.book.is_known(id) {
            return false;
        }
        let idx = self.grid.index_unchecked(x as u32, y as u32);
        self.grid.set_idx(idx, id);
        self.chunks.touch_cell(x as u32, y as u32);
        true
    }

    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.next_f32()
    }

    #[inline]
    pub fn below(&mut self, n: u32) -> u32 {
        self.rng.below(n)
    }

    pub fn book(&self) -> &RuleBook {
        self.book
    }
}

pub trait MaterialHandler: Send + Sync {
    fn update(&self, ctx: &mut HandlerContext);
}

/// Per-id handler table.
pub struct HandlerRegistry {
    slots: Vec<Option<Arc<dyn MaterialHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            slots: (0..MAX_TYPE).map(|_| None).collect(),
        }
    }

    /// Bind `handler` to every special material whose key is `key`.
    /// Returns the number of ids bound.
    pub fn bind(&mut self, book: &RuleBook, key: &str, handler: Arc<dyn MaterialHandler>) -> usize {
        let mut bound = 0;
        for id in 0..OUT_OF_BOUNDS {
            if book.handler_key(id) == Some(key) {
                self.slots[id as usize] = Some(Arc::clone(&handler));
                bound += 1;
            }
        }
        if bound == 0 {
            warn!(key, "handler key matches no material");
        } else {
            debug!(key, materials = bound, "handler bound");
        }
        bound
    }

    #[inline]
    pub fn get(&self, id: MaterialId) -> Option<&Arc<dyn MaterialHandler>> {
        fast!(self.slots, [id as usize]).as_ref()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Drops `material` into one empty 4-neighbour with probability `chance`.
/// The starting direction is random so output does not favour one side.
pub struct EmitterHandler {
    pub material: MaterialId,
    pub chance: f32,
}

impl EmitterHandler {
    pub fn new(material: MaterialId, chance: f32) -> Self {
        Self { material, chance }
    }
}

impl MaterialHandler for EmitterHandler {
    fn update(&self, ctx: &mut HandlerContext) {
        if ctx.random() >= self.chance {
            return;
        }
        let (x, y) = (ctx.x as i32, ctx.y as i32);
        let start = ctx.below(4) as usize;
        for i in 0..4 {
            let (dx, dy) = DIRECTIONS[(start + i) % 4];
            if ctx.is_empty(x + dx, y + dy) {
                ctx.set(x + dx, y + dy, self.material);
                return;
            }
        }
    }
}
