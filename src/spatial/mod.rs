//! Spatial storage: the cell grid and the chunk tracker laid over it.

pub mod chunks;
pub mod grid;
