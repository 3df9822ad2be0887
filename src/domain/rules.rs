//! Rule authoring model.
//!
//! Rules are data, not code. A rule samples neighbour offsets, classifies the
//! material found there with an ordered list of matchers and applies the
//! matched effect. Predicates only look at material identity, which is what
//! lets the compiler resolve them into dense tables ahead of time.

use serde::{Deserialize, Serialize};

use super::materials::{MaterialId, Property, Tag};

/// (dx, dy) with +y pointing down.
pub type Offset = (i8, i8);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chance {
    Literal(f32),
    /// Read this property from the acting material when compiling.
    Property(Property),
}

impl Default for Chance {
    fn default() -> Self {
        Chance::Literal(1.0)
    }
}

/// Which neighbour offsets a rule considers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Sampler {
    /// The acting cell itself, (0, 0).
    #[serde(rename = "self")]
    Own,
    Offsets { offsets: Vec<Offset> },
    /// Every offset with |dx|,|dy| <= radius except (0, 0). Upward offsets are
    /// listed `1 + up_bias` times so random draws favour growth upwards.
    Radius {
        radius: u8,
        #[serde(default)]
        up_bias: u8,
    },
    /// Offsets whose euclidean distance d satisfies inner < d <= outer.
    Annulus { inner: u8, outer: u8 },
    /// Asymmetric rectangle around the cell, (0, 0) excluded.
    Rect { left: u8, right: u8, up: u8, down: u8 },
    /// One group is picked per attempt and walked strictly in order.
    Ordered { groups: Vec<Vec<Offset>> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Comparison {
    pub fn apply(self, lhs: f32, rhs: f32) -> bool {
        match self {
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::Eq => lhs == rhs,
            Comparison::Ne => lhs != rhs,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Literal(f32),
    /// The acting material's own property.
    Own(Property),
}

/// Boolean expression over a candidate material's identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Always,
    Ids(Vec<MaterialId>),
    AnyTag(Vec<Tag>),
    AllTags(Vec<Tag>),
    /// A candidate without the property never matches.
    Compare {
        property: Property,
        op: Comparison,
        rhs: Operand,
    },
    Not(Box<Predicate>),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn id(id: MaterialId) -> Self {
        Predicate::Ids(vec![id])
    }

    pub fn ids(ids: &[MaterialId]) -> Self {
        Predicate::Ids(ids.to_vec())
    }

    pub fn tag(tag: Tag) -> Self {
        Predicate::AnyTag(vec![tag])
    }

    pub fn compare(property: Property, op: Comparison, rhs: Operand) -> Self {
        Predicate::Compare { property, op, rhs }
    }

    pub fn not(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    pub fn and(self, other: Predicate) -> Self {
        Predicate::All(vec![self, other])
    }

    pub fn or(self, other: Predicate) -> Self {
        Predicate::Any(vec![self, other])
    }
}

/// First matcher whose predicate holds selects `outcomes[outcome]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matcher {
    pub when: Predicate,
    pub outcome: usize,
}

fn one() -> f32 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Effect {
    Transform {
        #[serde(default)]
        this: Option<MaterialId>,
        #[serde(default)]
        other: Option<MaterialId>,
        #[serde(default = "one")]
        this_chance: f32,
        #[serde(default = "one")]
        other_chance: f32,
    },
    Swap {
        #[serde(default = "one")]
        chance: f32,
    },
    DensitySwap,
    /// Positive reach moves the acting cell along the self→candidate
    /// direction; negative reach pulls the candidate toward the acting cell.
    DirectionSwap {
        reach: i8,
        #[serde(default)]
        destination: Option<Predicate>,
    },
    Stop,
    Noop,
}

impl Effect {
    /// Acting cell becomes `id`.
    pub fn become_(id: MaterialId, chance: f32) -> Self {
        Effect::Transform {
            this: Some(id),
            other: None,
            this_chance: chance,
            other_chance: 1.0,
        }
    }

    /// Candidate becomes `id`.
    pub fn convert(id: MaterialId, chance: f32) -> Self {
        Effect::Transform {
            this: None,
            other: Some(id),
            this_chance: 1.0,
            other_chance: chance,
        }
    }

    /// Both sides transform, each behind its own gate.
    pub fn react(this: MaterialId, this_chance: f32, other: MaterialId, other_chance: f32) -> Self {
        Effect::Transform {
            this: Some(this),
            other: Some(other),
            this_chance,
            other_chance,
        }
    }

    pub fn swap() -> Self {
        Effect::Swap { chance: 1.0 }
    }
}

/// When a rule's writes land in the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Commit {
    #[default]
    Immediate,
    EndOfPass,
    EndOfTick,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassRestriction {
    Rising,
    Falling,
    #[default]
    Either,
}

fn one_sample() -> u8 {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub chance: Chance,
    pub sampler: Sampler,
    /// Random draws per attempt for non-ordered samplers.
    #[serde(default = "one_sample")]
    pub samples: u8,
    pub matchers: Vec<Matcher>,
    pub outcomes: Vec<Effect>,
    /// Successful spreading transforms before the candidate loop ends.
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub commit: Commit,
    #[serde(default)]
    pub pass: PassRestriction,
    /// Stamp the destination of a successful move.
    #[serde(default)]
    pub stamp: bool,
}

impl Rule {
    pub fn new(sampler: Sampler) -> Self {
        Self {
            chance: Chance::default(),
            sampler,
            samples: 1,
            matchers: Vec::new(),
            outcomes: Vec::new(),
            limit: None,
            commit: Commit::Immediate,
            pass: PassRestriction::Either,
            stamp: false,
        }
    }

    pub fn own() -> Self {
        Self::new(Sampler::Own)
    }

    pub fn offsets(offsets: &[Offset]) -> Self {
        Self::new(Sampler::Offsets {
            offsets: offsets.to_vec(),
        })
    }

    pub fn with_chance(mut self, chance: f32) -> Self {
        self.chance = Chance::Literal(chance);
        self
    }

    pub fn chance_from(mut self, property: Property) -> Self {
        self.chance = Chance::Property(property);
        self
    }

    pub fn with_samples(mut self, samples: u8) -> Self {
        self.samples = samples;
        self
    }

    /// Append an outcome and a matcher selecting it.
    pub fn when(mut self, when: Predicate, effect: Effect) -> Self {
        self.outcomes.push(effect);
        self.matchers.push(Matcher {
            when,
            outcome: self.outcomes.len() - 1,
        });
        self
    }

    /// Append a matcher that reuses an existing outcome.
    pub fn when_outcome(mut self, when: Predicate, outcome: usize) -> Self {
        self.matchers.push(Matcher { when, outcome });
        self
    }

    pub fn limit_hits(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn commit_at(mut self, commit: Commit) -> Self {
        self.commit = commit;
        self
    }

    pub fn in_pass(mut self, pass: PassRestriction) -> Self {
        self.pass = pass;
        self
    }

    pub fn stamped(mut self) -> Self {
        self.stamp = true;
        self
    }
}
