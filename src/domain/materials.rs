//! Material ids, tags, movement properties and archetypes.
//!
//! An `Archetype` is the static bundle for one material id: coefficients,
//! identity tags, dispatch flags and the authored rules. Archetypes are
//! immutable once the rule book has been compiled from them.

use serde::{Deserialize, Serialize};

use super::rules::Rule;

/// Material identifier stored per grid cell.
pub type MaterialId = u8;

/// Size of the material-id domain. Dense tables are allocated at this size so
/// any `MaterialId` indexes them without a bounds check.
pub const MAX_TYPE: usize = 256;

/// Empty cell. Has no archetype.
pub const EMPTY: MaterialId = 0;

/// Returned by bounds-checked reads outside the grid. Never a catalog id.
pub const OUT_OF_BOUNDS: MaterialId = u8::MAX;

pub type TagMask = u32;

/// Identity classification used by predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Solid,
    Powder,
    Liquid,
    Gas,
    Flammable,
    Hot,
    Cold,
    Conductive,
    Explosive,
    Organic,
    Corrosive,
}

impl Tag {
    #[inline]
    pub const fn bit(self) -> TagMask {
        1 << (self as u32)
    }
}

pub fn tag_mask(tags: &[Tag]) -> TagMask {
    tags.iter().fold(0, |mask, tag| mask | tag.bit())
}

/// Per-archetype coefficient a rule can read at compile time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Gravity,
    Buoyancy,
    Liquid,
    Density,
    RandomWalk,
}

/// Movement coefficients. Probabilities in [0, 1] except density, which is a
/// unitless weight.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    #[serde(default)]
    pub gravity: Option<f32>,
    #[serde(default)]
    pub buoyancy: Option<f32>,
    #[serde(default)]
    pub liquid: Option<f32>,
    #[serde(default)]
    pub density: Option<f32>,
    #[serde(default)]
    pub random_walk: Option<f32>,
}

impl Movement {
    pub fn get(&self, property: Property) -> Option<f32> {
        match property {
            Property::Gravity => self.gravity,
            Property::Buoyancy => self.buoyancy,
            Property::Liquid => self.liquid,
            Property::Density => self.density,
            Property::RandomWalk => self.random_walk,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Archetype {
    pub name: String,
    /// ABGR packed colour for the renderer.
    pub color: u32,
    pub movement: Movement,
    pub tags: TagMask,
    pub immobile: bool,
    /// Spawners, creatures and handler materials skip the interpreter and are
    /// routed to a registered `MaterialHandler`.
    pub spawner: bool,
    pub creature: bool,
    pub handler: Option<String>,
    pub rules: Vec<Rule>,
}

impl Archetype {
    pub fn new(name: &str, color: u32) -> Self {
        Self {
            name: name.to_string(),
            color,
            movement: Movement::default(),
            tags: 0,
            immobile: false,
            spawner: false,
            creature: false,
            handler: None,
            rules: Vec::new(),
        }
    }

    pub fn gravity(mut self, v: f32) -> Self {
        self.movement.gravity = Some(v);
        self
    }

    pub fn buoyancy(mut self, v: f32) -> Self {
        self.movement.buoyancy = Some(v);
        self
    }

    pub fn liquid(mut self, v: f32) -> Self {
        self.movement.liquid = Some(v);
        self
    }

    pub fn density(mut self, v: f32) -> Self {
        self.movement.density = Some(v);
        self
    }

    pub fn random_walk(mut self, v: f32) -> Self {
        self.movement.random_walk = Some(v);
        self
    }

    pub fn tags(mut self, tags: &[Tag]) -> Self {
        self.tags |= tag_mask(tags);
        self
    }

    pub fn immobile(mut self) -> Self {
        self.immobile = true;
        self
    }

    pub fn spawner(mut self) -> Self {
        self.spawner = true;
        self
    }

    pub fn creature(mut self) -> Self {
        self.creature = true;
        self
    }

    pub fn handler(mut self, key: &str) -> Self {
        self.handler = Some(key.to_string());
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    #[inline]
    pub fn property(&self, property: Property) -> Option<f32> {
        self.movement.get(property)
    }

    #[inline]
    pub fn has_any_tag(&self, mask: TagMask) -> bool {
        self.tags & mask != 0
    }

    /// Dispatched to an external handler instead of the rule interpreter.
    pub fn is_special(&self) -> bool {
        self.spawner || self.creature || self.handler.is_some()
    }

    /// Key a handler registers under: the explicit handler name, else the
    /// material name.
    pub fn handler_key(&self) -> &str {
        self.handler.as_deref().unwrap_or(&self.name)
    }
}

/// Fixed-size bitset over the whole material-id domain.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct MaterialMask([u64; MAX_TYPE / 64]);

impl MaterialMask {
    pub const fn none() -> Self {
        Self([0; MAX_TYPE / 64])
    }

    pub const fn all() -> Self {
        Self([!0; MAX_TYPE / 64])
    }

    pub fn from_fn(mut f: impl FnMut(MaterialId) -> bool) -> Self {
        let mut mask = Self::none();
        for id in 0..MAX_TYPE {
            if f(id as MaterialId) {
                mask.insert(id as MaterialId);
            }
        }
        mask
    }

    #[inline(always)]
    pub fn insert(&mut self, id: MaterialId) {
        let id = id as usize;
        self.0[id >> 6] |= 1u64 << (id & 63);
    }

    #[inline(always)]
    pub fn remove(&mut self, id: MaterialId) {
        let id = id as usize;
        self.0[id >> 6] &= !(1u64 << (id & 63));
    }

    #[inline(always)]
    pub fn contains(&self, id: MaterialId) -> bool {
        let id = id as usize;
        self.0[id >> 6] & (1u64 << (id & 63)) != 0
    }

    pub fn count(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }
}

impl std::fmt::Debug for MaterialMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries((0..MAX_TYPE).filter(|&id| self.contains(id as MaterialId)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_covers_whole_domain() {
        let mut mask = MaterialMask::none();
        mask.insert(0);
        mask.insert(63);
        mask.insert(64);
        mask.insert(255);
        assert!(mask.contains(0) && mask.contains(63) && mask.contains(64) && mask.contains(255));
        assert!(!mask.contains(1));
        assert_eq!(mask.count(), 4);
        mask.remove(64);
        assert!(!mask.contains(64));
        assert_eq!(MaterialMask::all().count(), MAX_TYPE);
    }

    #[test]
    fn handler_key_falls_back_to_name() {
        let tap = Archetype::new("tap", 0).spawner();
        assert!(tap.is_special());
        assert_eq!(tap.handler_key(), "tap");

        let bird = Archetype::new("bird", 0).creature().handler("flocking");
        assert_eq!(bird.handler_key(), "flocking");
    }
}
