use crate::domain::catalog::Catalog;
use crate::domain::materials::{tag_mask, Archetype, MaterialId, Property};
use crate::domain::rules::{Operand, Predicate};

/// First `Own` operand naming a property the acting material lacks.
pub(super) fn missing_property(pred: &Predicate, actor: &Archetype) -> Option<Property> {
    match pred {
        Predicate::Compare { rhs: Operand::Own(p), .. } if actor.property(*p).is_none() => Some(*p),
        Predicate::Not(inner) => missing_property(inner, actor),
        Predicate::All(list) | Predicate::Any(list) => {
            list.iter().find_map(|p| missing_property(p, actor))
        }
        _ => None,
    }
}

/// Evaluate `pred` for `candidate`. Only called while building tables.
pub(super) fn eval(pred: &Predicate, candidate: MaterialId, actor: &Archetype, catalog: &Catalog) -> bool {
    match pred {
        Predicate::Always => true,
        Predicate::Ids(ids) => ids.contains(&candidate),
        Predicate::AnyTag(tags) => catalog.tags(candidate) & tag_mask(tags) != 0,
        Predicate::AllTags(tags) => {
            let mask = tag_mask(tags);
            catalog.tags(candidate) & mask == mask
        }
        Predicate::Compare { property, op, rhs } => {
            let Some(lhs) = catalog.property(candidate, *property) else {
                return false;
            };
            let rhs = match rhs {
                Operand::Literal(v) => *v,
                Operand::Own(p) => match actor.property(*p) {
                    Some(v) => v,
                    None => return false,
                },
            };
            op.apply(lhs, rhs)
        }
        Predicate::Not(inner) => !eval(inner, candidate, actor, catalog),
        Predicate::All(list) => list.iter().all(|p| eval(p, candidate, actor, catalog)),
        Predicate::Any(list) => list.iter().any(|p| eval(p, candidate, actor, catalog)),
    }
}
