//! Material Catalog
//!
//! Static per-material data indexed by material id. The built-in catalog
//! below is the default content; `content.rs` loads alternative catalogs from
//! JSON bundles.

use std::collections::HashMap;

use serde::Serialize;

use crate::core::error::CatalogError;

use super::materials::{
    Archetype, MaterialId, Property, Tag, TagMask, EMPTY, MAX_TYPE, OUT_OF_BOUNDS,
};
use super::rules::{Commit, Comparison, Effect, Operand, PassRestriction, Predicate, Rule, Sampler};

/// Built-in material ids.
pub mod ids {
    use crate::domain::materials::MaterialId;

    pub const EMPTY: MaterialId = 0;
    pub const WALL: MaterialId = 1;
    pub const SAND: MaterialId = 2;
    pub const WATER: MaterialId = 3;
    pub const OIL: MaterialId = 4;
    pub const FIRE: MaterialId = 5;
    pub const SMOKE: MaterialId = 6;
    pub const STEAM: MaterialId = 7;
    pub const WOOD: MaterialId = 8;
    pub const PLANT: MaterialId = 9;
    pub const LAVA: MaterialId = 10;
    pub const STONE: MaterialId = 11;
    pub const ACID: MaterialId = 12;
    pub const GUNPOWDER: MaterialId = 13;
    pub const EXPLOSION: MaterialId = 14;
    pub const LIGHTNING: MaterialId = 15;
    pub const BLACK_HOLE: MaterialId = 16;
    pub const TAP: MaterialId = 17;
    pub const METAL: MaterialId = 18;
    pub const ICE: MaterialId = 19;
}

#[derive(Clone, Debug)]
pub struct Catalog {
    archetypes: Vec<Option<Archetype>>,
    name_to_id: HashMap<String, MaterialId>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Catalog holding only the empty material.
    pub fn new() -> Self {
        let mut name_to_id = HashMap::new();
        name_to_id.insert("empty".to_string(), EMPTY);
        Self {
            archetypes: vec![None; MAX_TYPE],
            name_to_id,
        }
    }

    pub fn insert(&mut self, id: MaterialId, archetype: Archetype) -> Result<(), CatalogError> {
        if id == EMPTY || id == OUT_OF_BOUNDS {
            return Err(CatalogError::ReservedId(id));
        }
        if self.archetypes[id as usize].is_some() {
            return Err(CatalogError::DuplicateId(id));
        }
        if self.name_to_id.contains_key(&archetype.name) {
            return Err(CatalogError::DuplicateName(archetype.name));
        }
        self.define(id, archetype);
        Ok(())
    }

    fn define(&mut self, id: MaterialId, archetype: Archetype) {
        self.name_to_id.insert(archetype.name.clone(), id);
        self.archetypes[id as usize] = Some(archetype);
    }

    #[inline]
    pub fn get(&self, id: MaterialId) -> Option<&Archetype> {
        self.archetypes[id as usize].as_ref()
    }

    /// Empty, or an id with an archetype.
    #[inline]
    pub fn is_known(&self, id: MaterialId) -> bool {
        id == EMPTY || self.get(id).is_some()
    }

    #[inline]
    pub fn tags(&self, id: MaterialId) -> TagMask {
        self.get(id).map_or(0, |a| a.tags)
    }

    #[inline]
    pub fn property(&self, id: MaterialId, property: Property) -> Option<f32> {
        self.get(id).and_then(|a| a.property(property))
    }

    pub fn id_by_name(&self, name: &str) -> Option<MaterialId> {
        self.name_to_id.get(name).copied()
    }

    /// Defined materials in id order (empty excluded).
    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &Archetype)> + '_ {
        self.archetypes
            .iter()
            .enumerate()
            .filter_map(|(id, a)| a.as_ref().map(|a| (id as MaterialId, a)))
    }

    pub fn material_count(&self) -> usize {
        self.iter().count()
    }

    pub fn manifest_json(&self) -> String {
        let elements: Vec<ManifestMaterial<'_>> = self
            .iter()
            .map(|(id, a)| ManifestMaterial {
                id,
                name: &a.name,
                color: a.color,
                tags: a.tags,
                immobile: a.immobile,
                special: a.is_special(),
            })
            .collect();
        let out = Manifest {
            format_version: 1,
            materials: elements,
        };
        serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
    }

    /// Default sandbox content.
    pub fn builtin() -> Self {
        use ids::*;

        let mut c = Catalog::new();

        c.define(WALL, Archetype::new("wall", 0xFF80_8080).tags(&[Tag::Solid]).immobile());

        c.define(
            SAND,
            Archetype::new("sand", 0xFF6B_C2E6)
                .gravity(0.95)
                .density(1.5)
                .tags(&[Tag::Powder])
                .rule(fall())
                .rule(slide()),
        );

        c.define(
            WATER,
            Archetype::new("water", 0xFFE0_7A2A)
                .gravity(0.95)
                .liquid(0.9)
                .density(1.0)
                .tags(&[Tag::Liquid])
                .rule(fall())
                .rule(slide())
                .rule(flow()),
        );

        c.define(
            OIL,
            Archetype::new("oil", 0xFF1F_3A4A)
                .gravity(0.9)
                .liquid(0.7)
                .density(0.8)
                .tags(&[Tag::Liquid, Tag::Flammable])
                .rule(fall())
                .rule(slide())
                .rule(flow()),
        );

        c.define(
            FIRE,
            Archetype::new("fire", 0xFF20_60FF)
                .buoyancy(0.6)
                .tags(&[Tag::Hot])
                .rule(
                    Rule::new(Sampler::Radius { radius: 1, up_bias: 1 })
                        .with_samples(2)
                        .limit_hits(2)
                        .when(Predicate::tag(Tag::Flammable), Effect::convert(FIRE, 0.5))
                        .when(Predicate::id(WATER), Effect::react(SMOKE, 1.0, STEAM, 0.5))
                        .when(Predicate::id(ICE), Effect::convert(WATER, 0.3)),
                )
                .rule(Rule::own().with_chance(0.08).when(Predicate::Always, Effect::become_(SMOKE, 0.6)))
                .rule(rise()),
        );

        c.define(
            SMOKE,
            Archetype::new("smoke", 0xFF50_5050)
                .buoyancy(0.4)
                .random_walk(0.3)
                .density(0.05)
                .tags(&[Tag::Gas])
                .rule(Rule::own().with_chance(0.01).when(Predicate::Always, Effect::become_(EMPTY, 1.0)))
                .rule(rise())
                .rule(drift()),
        );

        c.define(
            STEAM,
            Archetype::new("steam", 0xFFD0_C8C0)
                .buoyancy(0.7)
                .random_walk(0.2)
                .density(0.03)
                .tags(&[Tag::Gas])
                .rule(Rule::own().with_chance(0.003).when(Predicate::Always, Effect::become_(WATER, 1.0)))
                .rule(rise())
                .rule(drift()),
        );

        c.define(
            WOOD,
            Archetype::new("wood", 0xFF21_4A7A)
                .tags(&[Tag::Solid, Tag::Flammable, Tag::Organic])
                .immobile(),
        );

        c.define(
            PLANT,
            Archetype::new("plant", 0xFF2E_A83A)
                .tags(&[Tag::Flammable, Tag::Organic])
                .immobile()
                .rule(
                    Rule::new(Sampler::Radius { radius: 1, up_bias: 2 })
                        .with_chance(0.05)
                        .limit_hits(1)
                        .when(Predicate::id(WATER), Effect::convert(PLANT, 1.0)),
                ),
        );

        c.define(
            LAVA,
            Archetype::new("lava", 0xFF10_40E0)
                .gravity(0.6)
                .liquid(0.3)
                .density(2.0)
                .tags(&[Tag::Liquid, Tag::Hot])
                .rule(
                    Rule::offsets(&[(0, -1), (0, 1), (-1, 0), (1, 0)])
                        .with_chance(0.5)
                        .when(Predicate::tag(Tag::Flammable), Effect::convert(FIRE, 0.5))
                        .when(Predicate::id(WATER), Effect::react(STONE, 0.5, STEAM, 1.0))
                        .when(Predicate::id(ICE), Effect::convert(WATER, 0.5)),
                )
                .rule(fall())
                .rule(slide())
                .rule(flow()),
        );

        c.define(
            STONE,
            Archetype::new("stone", 0xFF60_6870)
                .gravity(0.9)
                .density(2.5)
                .tags(&[Tag::Powder, Tag::Solid])
                .rule(fall())
                .rule(slide().with_chance(0.2)),
        );

        c.define(
            ACID,
            Archetype::new("acid", 0xFF30_F0A0)
                .gravity(0.9)
                .liquid(0.8)
                .density(1.1)
                .tags(&[Tag::Liquid, Tag::Corrosive])
                .rule(
                    Rule::offsets(&[(0, 1), (-1, 0), (1, 0), (0, -1)])
                        .with_chance(0.2)
                        .when(
                            Predicate::AnyTag(vec![Tag::Solid, Tag::Powder, Tag::Organic])
                                .and(Predicate::id(WALL).not()),
                            Effect::react(EMPTY, 0.3, EMPTY, 1.0),
                        ),
                )
                .rule(fall())
                .rule(slide())
                .rule(flow()),
        );

        c.define(
            GUNPOWDER,
            Archetype::new("gunpowder", 0xFF30_3038)
                .gravity(0.9)
                .density(1.3)
                .tags(&[Tag::Powder, Tag::Flammable, Tag::Explosive])
                .rule(
                    Rule::new(Sampler::Radius { radius: 1, up_bias: 0 })
                        .with_samples(2)
                        .when(Predicate::tag(Tag::Hot), Effect::become_(EXPLOSION, 1.0)),
                )
                .rule(fall())
                .rule(slide()),
        );

        // Blast radius writes are deferred so cells converted by this
        // detonation never feed back into the same tick's evaluation.
        c.define(
            EXPLOSION,
            Archetype::new("explosion", 0xFF00_C0FF)
                .tags(&[Tag::Hot])
                .immobile()
                .rule(
                    Rule::new(Sampler::Annulus { inner: 0, outer: 3 })
                        .with_samples(12)
                        .commit_at(Commit::EndOfTick)
                        .when(Predicate::tag(Tag::Explosive), Effect::convert(EXPLOSION, 1.0))
                        .when(Predicate::id(EMPTY), Effect::convert(FIRE, 0.3))
                        .when(
                            Predicate::ids(&[WALL, METAL, EXPLOSION]).not(),
                            Effect::convert(FIRE, 0.7),
                        ),
                )
                .rule(
                    Rule::own()
                        .commit_at(Commit::EndOfTick)
                        .when(Predicate::Always, Effect::become_(FIRE, 1.0)),
                ),
        );

        c.define(
            LIGHTNING,
            Archetype::new("lightning", 0xFFFF_FFA0)
                .tags(&[Tag::Hot])
                .rule(Rule::own().with_chance(0.25).when(Predicate::Always, Effect::become_(EMPTY, 1.0)))
                .rule(
                    Rule::new(Sampler::Ordered {
                        groups: vec![ray(0, 1, 12), ray(-1, 2, 6), ray(1, 2, 6)],
                    })
                    .limit_hits(1)
                    .when(Predicate::id(EMPTY), Effect::Noop)
                    .when(Predicate::tag(Tag::Flammable), Effect::convert(FIRE, 1.0))
                    .when(Predicate::id(WATER), Effect::convert(STEAM, 1.0))
                    .when(Predicate::Always, Effect::Stop),
                )
                .rule(
                    Rule::offsets(&[(0, 1)])
                        .in_pass(PassRestriction::Falling)
                        .stamped()
                        .when(
                            Predicate::Always,
                            Effect::DirectionSwap {
                                reach: 3,
                                destination: Some(Predicate::id(EMPTY)),
                            },
                        ),
                ),
        );

        c.define(
            BLACK_HOLE,
            Archetype::new("black_hole", 0xFF10_0010)
                .immobile()
                .rule(
                    Rule::new(Sampler::Annulus { inner: 1, outer: 8 })
                        .with_samples(4)
                        .stamped()
                        .when(
                            Predicate::id(EMPTY).not(),
                            Effect::DirectionSwap {
                                reach: -1,
                                destination: Some(Predicate::id(EMPTY)),
                            },
                        ),
                )
                .rule(
                    Rule::new(Sampler::Radius { radius: 1, up_bias: 0 })
                        .with_chance(0.3)
                        .when(Predicate::ids(&[EMPTY, BLACK_HOLE]).not(), Effect::convert(EMPTY, 1.0)),
                ),
        );

        c.define(
            TAP,
            Archetype::new("tap", 0xFFC0_A060)
                .tags(&[Tag::Solid])
                .immobile()
                .spawner(),
        );

        c.define(
            METAL,
            Archetype::new("metal", 0xFFB0_B0A8)
                .tags(&[Tag::Solid, Tag::Conductive])
                .immobile(),
        );

        c.define(
            ICE,
            Archetype::new("ice", 0xFFF0_E0B0)
                .tags(&[Tag::Solid, Tag::Cold])
                .immobile()
                .rule(
                    Rule::new(Sampler::Radius { radius: 1, up_bias: 0 })
                        .with_chance(0.1)
                        .when(Predicate::tag(Tag::Hot), Effect::become_(WATER, 0.5)),
                ),
        );

        c
    }
}

/// Empty cells and gases give way to anything falling into them.
fn passable() -> Predicate {
    Predicate::id(EMPTY).or(Predicate::tag(Tag::Gas))
}

fn lighter_liquid() -> Predicate {
    Predicate::tag(Tag::Liquid).and(Predicate::compare(
        Property::Density,
        Comparison::Lt,
        Operand::Own(Property::Density),
    ))
}

fn fall() -> Rule {
    Rule::offsets(&[(0, 1)])
        .chance_from(Property::Gravity)
        .in_pass(PassRestriction::Falling)
        .stamped()
        .when(passable(), Effect::swap())
        .when(lighter_liquid(), Effect::DensitySwap)
}

fn slide() -> Rule {
    Rule::offsets(&[(-1, 1), (1, 1)])
        .chance_from(Property::Gravity)
        .in_pass(PassRestriction::Falling)
        .stamped()
        .when(passable(), Effect::swap())
}

fn flow() -> Rule {
    Rule::offsets(&[(-1, 0), (1, 0)])
        .chance_from(Property::Liquid)
        .in_pass(PassRestriction::Falling)
        .stamped()
        .when(Predicate::id(EMPTY), Effect::swap())
}

fn rise() -> Rule {
    Rule::offsets(&[(0, -1), (-1, -1), (1, -1)])
        .chance_from(Property::Buoyancy)
        .in_pass(PassRestriction::Rising)
        .stamped()
        .when(Predicate::id(EMPTY), Effect::swap())
}

fn drift() -> Rule {
    Rule::new(Sampler::Radius { radius: 1, up_bias: 0 })
        .chance_from(Property::RandomWalk)
        .in_pass(PassRestriction::Rising)
        .stamped()
        .when(Predicate::id(EMPTY), Effect::swap())
}

/// Straight probe of `len` cells stepping (dx, 1) per `every` rows.
fn ray(dx: i8, every: i8, len: i8) -> Vec<(i8, i8)> {
    (1..=len).map(|i| (dx * ((i + every - 1) / every), i)).collect()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest<'a> {
    format_version: u32,
    materials: Vec<ManifestMaterial<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestMaterial<'a> {
    id: MaterialId,
    name: &'a str,
    color: u32,
    tags: TagMask,
    immobile: bool,
    special: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_core_invariants() {
        let c = Catalog::builtin();
        assert!(c.get(EMPTY).is_none());
        assert!(c.is_known(EMPTY));
        assert_eq!(c.id_by_name("sand"), Some(ids::SAND));
        assert_eq!(c.id_by_name("empty"), Some(EMPTY));
        assert!(c.get(ids::TAP).is_some_and(|a| a.is_special()));
        assert!(c.get(ids::WALL).is_some_and(|a| a.immobile && a.rules.is_empty()));
        assert_eq!(c.material_count(), 19);
    }

    #[test]
    fn insert_rejects_reserved_and_duplicates() {
        let mut c = Catalog::new();
        assert!(matches!(
            c.insert(EMPTY, Archetype::new("nothing", 0)),
            Err(CatalogError::ReservedId(0))
        ));
        assert!(matches!(
            c.insert(OUT_OF_BOUNDS, Archetype::new("edge", 0)),
            Err(CatalogError::ReservedId(255))
        ));
        c.insert(5, Archetype::new("goo", 0)).unwrap();
        assert!(matches!(c.insert(5, Archetype::new("goo2", 0)), Err(CatalogError::DuplicateId(5))));
        assert!(matches!(
            c.insert(6, Archetype::new("goo", 0)),
            Err(CatalogError::DuplicateName(_))
        ));
    }

    #[test]
    fn rays_step_sideways_every_n_rows() {
        assert_eq!(ray(0, 1, 3), vec![(0, 1), (0, 2), (0, 3)]);
        assert_eq!(ray(1, 2, 4), vec![(1, 1), (1, 2), (2, 3), (2, 4)]);
    }

    #[test]
    fn manifest_lists_materials() {
        let json = Catalog::builtin().manifest_json();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["formatVersion"], 1);
        assert_eq!(v["materials"].as_array().map(|a| a.len()), Some(19));
        assert_eq!(v["materials"][0]["name"], "wall");
    }
}
