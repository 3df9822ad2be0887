//! Rule Compiler
//!
//! Authored rules are compiled once into flat, fixed-shape tables:
//! interleaved offset arrays, a dense id → outcome table per rule and a
//! closed `Outcome` enum. Predicate trees are only walked here; the
//! interpreter never sees them.
//!
//! The resulting `RuleBook` is immutable and shared by `Arc` with every
//! simulation built from it.

mod predicate;
mod sampler;

use std::ops::Range;

use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::error::CompileError;
use crate::domain::catalog::Catalog;
use crate::domain::materials::{
    Archetype, MaterialId, MaterialMask, Property, MAX_TYPE, OUT_OF_BOUNDS,
};
use crate::domain::rules::{Chance, Commit, Effect, PassRestriction, Rule};

/// Match-table slot for ids no matcher accepts.
pub const NO_MATCH: u8 = u8::MAX;

/// Outcome indices must stay below `NO_MATCH`.
pub const MAX_OUTCOMES: usize = 254;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    Rising,
    Falling,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    Noop,
    Stop,
    Transform {
        this: Option<MaterialId>,
        other: Option<MaterialId>,
        this_chance: f32,
        other_chance: f32,
    },
    Swap {
        chance: f32,
    },
    DensitySwap,
    /// `allow` already excludes immobile ids.
    DirectionSwap {
        reach: i8,
        allow: MaterialMask,
    },
}

impl Outcome {
    /// Outcomes that relocate the candidate particle.
    #[inline]
    pub fn moves_candidate(&self) -> bool {
        match self {
            Outcome::Swap { .. } | Outcome::DensitySwap => true,
            Outcome::DirectionSwap { reach, .. } => *reach < 0,
            _ => false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CompiledRule {
    pub chance: f32,
    /// `[dx0, dy0, dx1, dy1, ...]`
    pub offsets: Box<[i8]>,
    pub offset_count: u16,
    pub samples: u16,
    /// Group start indices with one trailing end index; ordered samplers only.
    pub groups: Option<Box<[u16]>>,
    pub matches: Box<[u8; MAX_TYPE]>,
    pub outcomes: Box<[Outcome]>,
    /// Spread hits before the candidate loop ends. 0 = unlimited.
    pub limit: u32,
    pub commit: Commit,
    pub stamp: bool,
}

impl CompiledRule {
    #[inline(always)]
    pub fn offset(&self, k: usize) -> (i32, i32) {
        (
            *fast!(self.offsets, [2 * k]) as i32,
            *fast!(self.offsets, [2 * k + 1]) as i32,
        )
    }

    pub fn group_count(&self) -> usize {
        self.groups.as_ref().map_or(0, |g| g.len() - 1)
    }

    pub fn group(&self, g: usize) -> Range<usize> {
        match &self.groups {
            Some(starts) => starts[g] as usize..starts[g + 1] as usize,
            None => 0..self.offset_count as usize,
        }
    }
}

/// Compiled rule lists for both passes plus per-id flags the step loop needs.
pub struct RuleBook {
    catalog: Catalog,
    rising: Vec<Box<[CompiledRule]>>,
    falling: Vec<Box<[CompiledRule]>>,
    known: MaterialMask,
    special: MaterialMask,
    keep_awake: MaterialMask,
    immobile: MaterialMask,
    density: Vec<f32>,
}

impl RuleBook {
    /// Compile with the built-in material set.
    pub fn builtin() -> Result<Self, CompileError> {
        Self::compile(Catalog::builtin())
    }

    pub fn compile(catalog: Catalog) -> Result<Self, CompileError> {
        let mut rising: Vec<Vec<CompiledRule>> = (0..MAX_TYPE).map(|_| Vec::new()).collect();
        let mut falling: Vec<Vec<CompiledRule>> = (0..MAX_TYPE).map(|_| Vec::new()).collect();

        let immobile = MaterialMask::from_fn(|id| catalog.get(id).is_some_and(|a| a.immobile));

        let mut authored = 0usize;
        for (id, actor) in catalog.iter() {
            for (r, rule) in actor.rules.iter().enumerate() {
                let compiled = compile_rule(&catalog, &immobile, actor, r, rule)?;
                authored += 1;

                let slot = id as usize;
                match rule.pass {
                    PassRestriction::Rising => rising[slot].push(compiled),
                    PassRestriction::Falling => falling[slot].push(compiled),
                    PassRestriction::Either => {
                        rising[slot].push(compiled.clone());
                        falling[slot].push(compiled);
                    }
                }
            }
        }

        let known = MaterialMask::from_fn(|id| catalog.is_known(id));
        let special = MaterialMask::from_fn(|id| catalog.get(id).is_some_and(|a| a.is_special()));
        let density = (0..MAX_TYPE)
            .map(|id| catalog.property(id as MaterialId, Property::Density).unwrap_or(0.0))
            .collect();

        let book = Self {
            rising: rising.into_iter().map(Vec::into_boxed_slice).collect(),
            falling: falling.into_iter().map(Vec::into_boxed_slice).collect(),
            known,
            special,
            keep_awake: special,
            immobile,
            density,
            catalog,
        };

        debug!(
            materials = book.catalog.material_count(),
            rules = authored,
            rising = book.rising.iter().map(|l| l.len()).sum::<usize>(),
            falling = book.falling.iter().map(|l| l.len()).sum::<usize>(),
            special = book.special.count(),
            "rule book compiled"
        );

        Ok(book)
    }

    #[inline(always)]
    pub fn rules(&self, pass: Pass, id: MaterialId) -> &[CompiledRule] {
        match pass {
            Pass::Rising => fast!(self.rising, [id as usize]),
            Pass::Falling => fast!(self.falling, [id as usize]),
        }
    }

    #[inline]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Empty or defined in the catalog.
    #[inline]
    pub fn is_known(&self, id: MaterialId) -> bool {
        self.known.contains(id)
    }

    /// Routed to a handler instead of the interpreter.
    #[inline]
    pub fn is_special(&self, id: MaterialId) -> bool {
        self.special.contains(id)
    }

    /// Holds its chunk awake.
    #[inline]
    pub fn keeps_awake(&self, id: MaterialId) -> bool {
        self.keep_awake.contains(id)
    }

    #[inline]
    pub fn is_immobile(&self, id: MaterialId) -> bool {
        self.immobile.contains(id)
    }

    /// Density, 0 when undefined.
    #[inline(always)]
    pub fn density(&self, id: MaterialId) -> f32 {
        *fast!(self.density, [id as usize])
    }

    pub fn handler_key(&self, id: MaterialId) -> Option<&str> {
        if !self.is_special(id) {
            return None;
        }
        self.catalog.get(id).map(|a| a.handler_key())
    }

    pub fn rule_count(&self, pass: Pass) -> usize {
        let lists = match pass {
            Pass::Rising => &self.rising,
            Pass::Falling => &self.falling,
        };
        lists.iter().map(|l| l.len()).sum()
    }
}

fn compile_rule(
    catalog: &Catalog,
    immobile: &MaterialMask,
    actor: &Archetype,
    r: usize,
    rule: &Rule,
) -> Result<CompiledRule, CompileError> {
    let material = || actor.name.clone();

    if rule.outcomes.len() > MAX_OUTCOMES {
        return Err(CompileError::TooManyOutcomes {
            material: material(),
            rule: r,
            outcomes: rule.outcomes.len(),
            max: MAX_OUTCOMES,
        });
    }

    for (m, matcher) in rule.matchers.iter().enumerate() {
        if matcher.outcome >= rule.outcomes.len() {
            return Err(CompileError::OutcomeOutOfRange {
                material: material(),
                rule: r,
                matcher: m,
                outcome: matcher.outcome,
                outcomes: rule.outcomes.len(),
            });
        }
        if let Some(property) = predicate::missing_property(&matcher.when, actor) {
            return Err(CompileError::UndefinedProperty { material: material(), rule: r, property });
        }
    }

    let chance = match &rule.chance {
        Chance::Literal(v) => *v,
        Chance::Property(p) => actor.property(*p).ok_or_else(|| CompileError::UndefinedProperty {
            material: material(),
            rule: r,
            property: *p,
        })?,
    };
    check_chance(chance, actor, r)?;

    let outcomes = rule
        .outcomes
        .iter()
        .map(|effect| compile_effect(catalog, immobile, actor, r, effect))
        .collect::<Result<Vec<_>, _>>()?;

    let expanded = sampler::expand(&rule.sampler);
    let empty_group = expanded
        .groups
        .as_ref()
        .is_some_and(|g| g.windows(2).any(|w| w[0] == w[1]));
    // Unordered samplers draw `samples` candidates; zero would never sample.
    let no_draws = expanded.groups.is_none() && rule.samples == 0;
    if expanded.offsets.is_empty() || empty_group || no_draws {
        return Err(CompileError::EmptySampler { material: material(), rule: r });
    }
    if expanded.offsets.len() > u16::MAX as usize {
        return Err(CompileError::TooManyOffsets {
            material: material(),
            rule: r,
            count: expanded.offsets.len(),
        });
    }

    let mut offsets = Vec::with_capacity(expanded.offsets.len() * 2);
    for &(dx, dy) in &expanded.offsets {
        match (i8::try_from(dx), i8::try_from(dy)) {
            (Ok(x), Ok(y)) => {
                offsets.push(x);
                offsets.push(y);
            }
            _ => {
                return Err(CompileError::OffsetOutOfRange { material: material(), rule: r, dx, dy });
            }
        }
    }

    let matches = build_match_table(catalog, immobile, actor, rule, &outcomes);

    Ok(CompiledRule {
        chance,
        offset_count: expanded.offsets.len() as u16,
        offsets: offsets.into_boxed_slice(),
        samples: rule.samples as u16,
        groups: expanded
            .groups
            .map(|g| g.into_iter().map(|s| s as u16).collect()),
        matches,
        outcomes: outcomes.into_boxed_slice(),
        limit: rule.limit.unwrap_or(0),
        commit: rule.commit,
        stamp: rule.stamp,
    })
}

fn check_chance(chance: f32, actor: &Archetype, r: usize) -> Result<(), CompileError> {
    if (0.0..=1.0).contains(&chance) {
        Ok(())
    } else {
        Err(CompileError::ChanceOutOfRange { material: actor.name.clone(), rule: r, chance })
    }
}

fn compile_effect(
    catalog: &Catalog,
    immobile: &MaterialMask,
    actor: &Archetype,
    r: usize,
    effect: &Effect,
) -> Result<Outcome, CompileError> {
    let mover = || CompileError::ImmobileMover { material: actor.name.clone(), rule: r };

    let outcome = match effect {
        Effect::Noop => Outcome::Noop,
        Effect::Stop => Outcome::Stop,

        Effect::Transform { this, other, this_chance, other_chance } => {
            for id in this.iter().chain(other.iter()) {
                if !catalog.is_known(*id) {
                    return Err(CompileError::UnknownMaterial { material: actor.name.clone(), rule: r, id: *id });
                }
            }
            check_chance(*this_chance, actor, r)?;
            check_chance(*other_chance, actor, r)?;
            Outcome::Transform {
                this: *this,
                other: *other,
                this_chance: *this_chance,
                other_chance: *other_chance,
            }
        }

        Effect::Swap { chance } => {
            if actor.immobile {
                return Err(mover());
            }
            check_chance(*chance, actor, r)?;
            Outcome::Swap { chance: *chance }
        }

        Effect::DensitySwap => {
            if actor.immobile {
                return Err(mover());
            }
            if actor.property(Property::Density).is_none() {
                return Err(CompileError::UndefinedProperty {
                    material: actor.name.clone(),
                    rule: r,
                    property: Property::Density,
                });
            }
            Outcome::DensitySwap
        }

        Effect::DirectionSwap { reach: 0, .. } => Outcome::Noop,

        Effect::DirectionSwap { reach, destination } => {
            if *reach > 0 && actor.immobile {
                return Err(mover());
            }
            if let Some(property) = destination.as_ref().and_then(|d| predicate::missing_property(d, actor)) {
                return Err(CompileError::UndefinedProperty { material: actor.name.clone(), rule: r, property });
            }
            let mut allow = MaterialMask::from_fn(|id| {
                !immobile.contains(id)
                    && destination
                        .as_ref()
                        .map_or(true, |d| predicate::eval(d, id, actor, catalog))
            });
            allow.remove(OUT_OF_BOUNDS);
            Outcome::DirectionSwap { reach: *reach, allow }
        }
    };

    Ok(outcome)
}

fn classify(
    catalog: &Catalog,
    immobile: &MaterialMask,
    actor: &Archetype,
    rule: &Rule,
    outcomes: &[Outcome],
    id: MaterialId,
) -> u8 {
    if id == OUT_OF_BOUNDS {
        return NO_MATCH;
    }
    for matcher in &rule.matchers {
        // An immobile candidate never reaches an outcome that would move it;
        // later matchers still get a chance.
        if outcomes[matcher.outcome].moves_candidate() && immobile.contains(id) {
            continue;
        }
        if predicate::eval(&matcher.when, id, actor, catalog) {
            return matcher.outcome as u8;
        }
    }
    NO_MATCH
}

fn build_match_table(
    catalog: &Catalog,
    immobile: &MaterialMask,
    actor: &Archetype,
    rule: &Rule,
    outcomes: &[Outcome],
) -> Box<[u8; MAX_TYPE]> {
    let mut table = Box::new([NO_MATCH; MAX_TYPE]);

    #[cfg(feature = "parallel")]
    {
        let slots: Vec<u8> = (0..MAX_TYPE)
            .into_par_iter()
            .map(|id| classify(catalog, immobile, actor, rule, outcomes, id as MaterialId))
            .collect();
        table.copy_from_slice(&slots);
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (id, slot) in table.iter_mut().enumerate() {
            *slot = classify(catalog, immobile, actor, rule, outcomes, id as MaterialId);
        }
    }

    table
}
