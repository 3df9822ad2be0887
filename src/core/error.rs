use thiserror::Error;

use crate::domain::materials::{MaterialId, Property};

/// Authoring bugs caught while building the compiled rule tables.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("material {material} rule {rule}: matcher {matcher} points at outcome {outcome}, but only {outcomes} outcomes exist")]
    OutcomeOutOfRange {
        material: String,
        rule: usize,
        matcher: usize,
        outcome: usize,
        outcomes: usize,
    },

    #[error("material {material} rule {rule}: {outcomes} outcomes exceed the limit of {max}")]
    TooManyOutcomes {
        material: String,
        rule: usize,
        outcomes: usize,
        max: usize,
    },

    #[error("material {material} rule {rule}: property {property:?} is not defined on this material")]
    UndefinedProperty {
        material: String,
        rule: usize,
        property: Property,
    },

    #[error("material {material} rule {rule}: chance {chance} is outside [0, 1]")]
    ChanceOutOfRange {
        material: String,
        rule: usize,
        chance: f32,
    },

    #[error("material {material} rule {rule}: sampler yields no offsets")]
    EmptySampler { material: String, rule: usize },

    #[error("material {material} rule {rule}: too many offsets ({count})")]
    TooManyOffsets {
        material: String,
        rule: usize,
        count: usize,
    },

    #[error("material {material} rule {rule}: offset ({dx}, {dy}) does not fit in a byte")]
    OffsetOutOfRange {
        material: String,
        rule: usize,
        dx: i32,
        dy: i32,
    },

    #[error("material {material} rule {rule}: outcome references unknown material id {id}")]
    UnknownMaterial {
        material: String,
        rule: usize,
        id: MaterialId,
    },

    #[error("material {material} is immobile but rule {rule} would move it")]
    ImmobileMover { material: String, rule: usize },
}

/// Malformed or incompatible save data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    #[error("bad magic marker: {found:?}")]
    BadMagic { found: Vec<u8> },

    #[error("unsupported save version: {0}")]
    UnsupportedVersion(u8),

    #[error("save data truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("save data has trailing bytes: expected {expected} bytes, got {actual}")]
    TrailingBytes { expected: usize, actual: usize },

    #[error("invalid grid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("cell {index} holds unknown material id {id}")]
    UnknownMaterial { index: usize, id: MaterialId },
}

/// Problems assembling a material catalog (built-in or from a content bundle).
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("content bundle parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("material id {0} is reserved")]
    ReservedId(MaterialId),

    #[error("material id out of range: {0}")]
    IdOutOfRange(u16),

    #[error("duplicate material id: {0}")]
    DuplicateId(MaterialId),

    #[error("duplicate material name: {0}")]
    DuplicateName(String),
}

/// Invalid simulation construction parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid dimensions must be within 1..={max}: got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32, max: u32 },
}
