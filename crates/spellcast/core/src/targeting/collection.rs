//! Heterogeneous, insertion-ordered target storage.

use crate::config::EngineConfig;
use crate::error::TargetingViolation;
use crate::types::{ActorId, TargetableId, Vec3};

/// Whether a spell resolves against one target or many.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TargetForm {
    /// At most one target; projectiles are collected on their first valid hit.
    #[default]
    Singular,
    /// Up to [`EngineConfig::MAX_TARGETS`] targets; projectiles pass through
    /// incidental hits until they reach their assigned target.
    Plural,
}

/// One acquired target.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Target {
    Point(Vec3),
    Targetable(TargetableId),
    Actor(ActorId),
}

impl Target {
    pub fn as_actor(&self) -> Option<ActorId> {
        match *self {
            Target::Actor(actor) => Some(actor),
            _ => None,
        }
    }
}

/// Points, targetable objects and actors, each kept in insertion order.
///
/// Iteration yields one stream: all points, then all targetables, then all actors.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetCollection {
    form: TargetForm,
    points: Vec<Vec3>,
    targetables: Vec<TargetableId>,
    actors: Vec<ActorId>,
}

impl TargetCollection {
    pub fn new(form: TargetForm) -> Self {
        Self {
            form,
            points: Vec::new(),
            targetables: Vec::new(),
            actors: Vec::new(),
        }
    }

    pub fn form(&self) -> TargetForm {
        self.form
    }

    /// Adds a target, enforcing the form's cap.
    pub fn push(&mut self, target: Target) -> Result<(), TargetingViolation> {
        if self.form == TargetForm::Singular && !self.is_empty() {
            return Err(TargetingViolation::SingularCapExceeded);
        }
        if self.len() >= EngineConfig::MAX_TARGETS {
            return Err(TargetingViolation::CapacityExceeded {
                limit: EngineConfig::MAX_TARGETS,
            });
        }
        match target {
            Target::Point(point) => self.points.push(point),
            Target::Targetable(id) => self.targetables.push(id),
            Target::Actor(actor) => self.actors.push(actor),
        }
        Ok(())
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn targetables(&self) -> &[TargetableId] {
        &self.targetables
    }

    pub fn actors(&self) -> &[ActorId] {
        &self.actors
    }

    pub fn iter(&self) -> impl Iterator<Item = Target> + '_ {
        self.points
            .iter()
            .map(|&p| Target::Point(p))
            .chain(self.targetables.iter().map(|&t| Target::Targetable(t)))
            .chain(self.actors.iter().map(|&a| Target::Actor(a)))
    }

    pub fn contains(&self, target: &Target) -> bool {
        match *target {
            Target::Point(point) => self.points.contains(&point),
            Target::Targetable(id) => self.targetables.contains(&id),
            Target::Actor(actor) => self.actors.contains(&actor),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len() + self.targetables.len() + self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
