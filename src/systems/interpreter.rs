//! Rule Interpreter
//!
//! Runs one cell's compiled rule list for one pass. Everything it touches is
//! borrowed through `CellContext`; the only state it owns is the hit counter
//! of the rule being executed.

use crate::domain::materials::MaterialId;
use crate::domain::rules::Commit;
use crate::core::rng::Rng;
use crate::spatial::chunks::ChunkMap;
use crate::spatial::grid::Grid;

use super::compiler::{CompiledRule, Outcome, Pass, RuleBook, NO_MATCH};
use super::deferred::DeferredWrites;
use super::trace::MoveTrace;

/// Density-swap probability per unit of density difference.
pub const DENSITY_SWAP_RATE: f32 = 2.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    pub cells_visited: u32,
    pub rules_attempted: u32,
    pub rules_fired: u32,
}

pub struct CellContext<'a> {
    pub grid: &'a mut Grid,
    pub chunks: &'a mut ChunkMap,
    pub rng: &'a mut Rng,
    pub deferred: &'a mut DeferredWrites,
    pub book: &'a RuleBook,
    pub trace: Option<&'a mut MoveTrace>,
    pub stats: &'a mut PassStats,
}

/// How processing continues after one candidate.
enum Flow {
    NextCandidate,
    NextRule,
    /// `stop`: abandon the rest of the rule list.
    Halt,
    /// The acting particle changed id or left its cell.
    Changed,
}

/// Run the rule list of the particle at (x, y). Returns true when the
/// particle changed or moved, in which case the caller does nothing more
/// with this cell this pass.
pub fn run_cell(ctx: &mut CellContext<'_>, pass: Pass, x: u32, y: u32) -> bool {
    let idx = ctx.grid.index_unchecked(x, y);
    let id = ctx.grid.get_idx(idx);
    let book = ctx.book;
    let rules = book.rules(pass, id);
    if rules.is_empty() {
        return false;
    }

    ctx.stats.cells_visited += 1;
    for rule in rules.iter() {
        ctx.stats.rules_attempted += 1;
        if ctx.rng.next_f32() >= rule.chance {
            continue;
        }
        ctx.stats.rules_fired += 1;

        match run_rule(ctx, rule, id, x, y, idx) {
            Flow::NextCandidate | Flow::NextRule => {}
            Flow::Halt => return false,
            Flow::Changed => return true,
        }
    }
    false
}

fn run_rule(ctx: &mut CellContext<'_>, rule: &CompiledRule, id: MaterialId, x: u32, y: u32, idx: usize) -> Flow {
    let mut hits = 0u32;

    if rule.groups.is_some() {
        let g = ctx.rng.below(rule.group_count() as u32) as usize;
        for k in rule.group(g) {
            match visit(ctx, rule, id, x, y, idx, k, &mut hits) {
                Flow::NextCandidate => {}
                flow => return flow,
            }
        }
    } else {
        for _ in 0..rule.samples {
            let k = ctx.rng.below(rule.offset_count as u32) as usize;
            match visit(ctx, rule, id, x, y, idx, k, &mut hits) {
                Flow::NextCandidate => {}
                flow => return flow,
            }
        }
    }

    Flow::NextRule
}

#[allow(clippy::too_many_arguments)]
fn visit(
    ctx: &mut CellContext<'_>,
    rule: &CompiledRule,
    id: MaterialId,
    x: u32,
    y: u32,
    idx: usize,
    k: usize,
    hits: &mut u32,
) -> Flow {
    let (dx, dy) = rule.offset(k);
    let (nx, ny) = (x as i32 + dx, y as i32 + dy);
    if !ctx.grid.in_bounds(nx, ny) {
        return Flow::NextCandidate;
    }
    let nidx = ctx.grid.index_unchecked(nx as u32, ny as u32);
    let other = ctx.grid.get_idx(nidx);

    let slot = *fast!(rule.matches, [other as usize]);
    if slot == NO_MATCH {
        return Flow::NextCandidate;
    }

    match *fast!(rule.outcomes, [slot as usize]) {
        Outcome::Noop => Flow::NextCandidate,

        Outcome::Stop => Flow::Halt,

        Outcome::Transform { this, other: into, this_chance, other_chance } => {
            if let Some(into) = into {
                if ctx.rng.chance(other_chance) && into != other {
                    write(ctx, rule.commit, nidx, into);
                    // An own-cell candidate is the actor: rewriting it ends the cell.
                    if nidx == idx {
                        return Flow::Changed;
                    }
                    *hits += 1;
                }
            }
            if let Some(this) = this {
                if ctx.rng.chance(this_chance) && this != id {
                    write(ctx, rule.commit, idx, this);
                    return Flow::Changed;
                }
            }
            if rule.limit > 0 && *hits >= rule.limit {
                Flow::NextRule
            } else {
                Flow::NextCandidate
            }
        }

        Outcome::Swap { chance } => {
            if nidx == idx || ctx.chunks.is_stamped(nidx) || !ctx.rng.chance(chance) {
                return Flow::NextCandidate;
            }
            move_particle(ctx, rule, idx, nidx);
            Flow::Changed
        }

        Outcome::DensitySwap => {
            if ctx.chunks.is_stamped(nidx) {
                return Flow::NextCandidate;
            }
            let p = (ctx.book.density(id) - ctx.book.density(other)) * DENSITY_SWAP_RATE;
            if p <= 0.0 || !ctx.rng.chance(p) {
                return Flow::NextCandidate;
            }
            move_particle(ctx, rule, idx, nidx);
            Flow::Changed
        }

        Outcome::DirectionSwap { reach, allow } => {
            let (sx, sy) = (dx.signum(), dy.signum());
            if sx == 0 && sy == 0 {
                return Flow::NextCandidate;
            }

            if reach > 0 {
                // Jump the acting particle `reach` cells toward the candidate.
                let (tx, ty) = (x as i32 + sx * reach as i32, y as i32 + sy * reach as i32);
                if !ctx.grid.in_bounds(tx, ty) {
                    return Flow::NextCandidate;
                }
                let tidx = ctx.grid.index_unchecked(tx as u32, ty as u32);
                if !allow.contains(ctx.grid.get_idx(tidx)) || ctx.chunks.is_stamped(tidx) {
                    return Flow::NextCandidate;
                }
                move_particle(ctx, rule, idx, tidx);
                Flow::Changed
            } else {
                // Pull the candidate `|reach|` cells back toward the actor.
                let back = -(reach as i32);
                let (tx, ty) = (nx - sx * back, ny - sy * back);
                if !ctx.grid.in_bounds(tx, ty) {
                    return Flow::NextCandidate;
                }
                let tidx = ctx.grid.index_unchecked(tx as u32, ty as u32);
                if tidx == idx
                    || tidx == nidx
                    || ctx.chunks.is_stamped(nidx)
                    || ctx.chunks.is_stamped(tidx)
                    || !allow.contains(ctx.grid.get_idx(tidx))
                {
                    return Flow::NextCandidate;
                }
                move_particle(ctx, rule, nidx, tidx);
                Flow::NextCandidate
            }
        }
    }
}

/// Exchange `from` and `to`; the particle at `from` is the one moving.
///
/// A deferred move always stamps both cells: until the flush the grid still
/// shows the old ids, and nothing else may claim either cell this pass.
#[inline]
fn move_particle(ctx: &mut CellContext<'_>, rule: &CompiledRule, from: usize, to: usize) {
    let a = ctx.grid.get_idx(from);
    let b = ctx.grid.get_idx(to);
    let deferred = match rule.commit {
        Commit::Immediate => {
            set_now(ctx, to, a);
            set_now(ctx, from, b);
            false
        }
        Commit::EndOfPass => {
            ctx.deferred.swap_pass(from, to, a, b);
            true
        }
        Commit::EndOfTick => {
            ctx.deferred.swap_tick(from, to, a, b);
            true
        }
    };
    if rule.stamp || deferred {
        ctx.chunks.stamp(to);
    }
    if deferred {
        ctx.chunks.stamp(from);
    }
    if let Some(trace) = ctx.trace.as_deref_mut() {
        trace.record(from, to);
    }
}

#[inline]
fn set_now(ctx: &mut CellContext<'_>, idx: usize, id: MaterialId) {
    ctx.grid.set_idx(idx, id);
    let (x, y) = ctx.grid.coords(idx);
    ctx.chunks.touch_cell(x, y);
}

#[inline]
fn write(ctx: &mut CellContext<'_>, commit: Commit, idx: usize, id: MaterialId) {
    match commit {
        Commit::Immediate => set_now(ctx, idx, id),
        Commit::EndOfPass => ctx.deferred.push_pass(idx, id),
        Commit::EndOfTick => ctx.deferred.push_tick(idx, id),
    }
}
