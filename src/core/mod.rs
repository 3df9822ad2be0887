//! Core building blocks shared by every layer: hot-path macros, the
//! deterministic RNG and the error taxonomy.

#[macro_use]
pub mod utils;
pub mod error;
pub mod rng;
