//! Material data and the rule authoring model.

pub mod catalog;
pub mod content;
pub mod materials;
pub mod rules;
