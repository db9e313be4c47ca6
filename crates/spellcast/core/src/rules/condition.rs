//! Context-typed predicates and their short-circuiting composite.

use std::fmt;
use std::sync::Arc;

use crate::targeting::{Target, TargetCollection};
use crate::types::{ActorId, TargetableId, Vec3};
use crate::world::World;

/// A predicate evaluated in a context of shape `T`.
///
/// Leaves override the target kinds they care about; every overload defaults
/// to `true` so a leaf that only inspects, say, actor targets never vetoes a
/// point-target evaluation.
pub trait Condition<T>: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn check(&self, _world: &World, _ctx: &T) -> bool {
        true
    }

    fn check_point(&self, _world: &World, _ctx: &T, _point: Vec3) -> bool {
        true
    }

    fn check_actor(&self, _world: &World, _ctx: &T, _actor: ActorId) -> bool {
        true
    }

    fn check_targetable(&self, _world: &World, _ctx: &T, _target: TargetableId) -> bool {
        true
    }

    /// Dispatches to the overload matching `target`'s kind.
    fn check_target(&self, world: &World, ctx: &T, target: &Target) -> bool {
        match *target {
            Target::Point(point) => self.check_point(world, ctx, point),
            Target::Targetable(id) => self.check_targetable(world, ctx, id),
            Target::Actor(actor) => self.check_actor(world, ctx, actor),
        }
    }
}

/// Ordered logical AND over member conditions.
///
/// Cloning produces an independent list that shares the same leaf instances,
/// so one library of conditions can back any number of simultaneous casts.
pub struct ConditionCollection<T> {
    members: Vec<Arc<dyn Condition<T>>>,
}

impl<T> ConditionCollection<T> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// Builder-style append.
    pub fn with(mut self, condition: impl Condition<T> + 'static) -> Self {
        self.push(condition);
        self
    }

    pub fn push(&mut self, condition: impl Condition<T> + 'static) {
        self.members.push(Arc::new(condition));
    }

    pub fn push_shared(&mut self, condition: Arc<dyn Condition<T>>) {
        self.members.push(condition);
    }

    /// Appends every member of `other`, sharing the leaf instances.
    pub fn extend_from(&mut self, other: &ConditionCollection<T>) {
        self.members.extend(other.members.iter().cloned());
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Condition<T>>> {
        self.members.iter()
    }

    /// True when every member holds. Stops at the first failing member; an
    /// empty collection holds.
    pub fn check(&self, world: &World, ctx: &T) -> bool {
        self.members.iter().all(|c| c.check(world, ctx))
    }

    pub fn check_point(&self, world: &World, ctx: &T, point: Vec3) -> bool {
        self.members.iter().all(|c| c.check_point(world, ctx, point))
    }

    pub fn check_actor(&self, world: &World, ctx: &T, actor: ActorId) -> bool {
        self.members.iter().all(|c| c.check_actor(world, ctx, actor))
    }

    pub fn check_targetable(&self, world: &World, ctx: &T, target: TargetableId) -> bool {
        self.members
            .iter()
            .all(|c| c.check_targetable(world, ctx, target))
    }

    pub fn check_target(&self, world: &World, ctx: &T, target: &Target) -> bool {
        self.members
            .iter()
            .all(|c| c.check_target(world, ctx, target))
    }

    /// True when the no-target check and every target check hold.
    pub fn check_targets(&self, world: &World, ctx: &T, targets: &TargetCollection) -> bool {
        self.check(world, ctx) && targets.iter().all(|t| self.check_target(world, ctx, &t))
    }

    /// True as soon as one member holds. Used for interrupt sets, where any
    /// single condition is enough to stop a cast.
    pub fn any(&self, world: &World, ctx: &T) -> bool {
        self.members.iter().any(|c| c.check(world, ctx))
    }

    /// Pairs the collection with a world and context for one evaluation pass.
    pub fn bind<'a>(&'a self, world: &'a World, ctx: &'a T) -> BoundConditions<'a, T> {
        BoundConditions {
            conditions: self,
            world,
            ctx,
        }
    }
}

impl<T> Clone for ConditionCollection<T> {
    fn clone(&self) -> Self {
        Self {
            members: self.members.clone(),
        }
    }
}

impl<T> Default for ConditionCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ConditionCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.members.iter().map(|c| c.name()))
            .finish()
    }
}

impl<T> Condition<T> for ConditionCollection<T> {
    fn name(&self) -> &str {
        "ConditionCollection"
    }

    fn check(&self, world: &World, ctx: &T) -> bool {
        ConditionCollection::check(self, world, ctx)
    }

    fn check_point(&self, world: &World, ctx: &T, point: Vec3) -> bool {
        ConditionCollection::check_point(self, world, ctx, point)
    }

    fn check_actor(&self, world: &World, ctx: &T, actor: ActorId) -> bool {
        ConditionCollection::check_actor(self, world, ctx, actor)
    }

    fn check_targetable(&self, world: &World, ctx: &T, target: TargetableId) -> bool {
        ConditionCollection::check_targetable(self, world, ctx, target)
    }
}

/// A collection bound to one context for the duration of a borrow.
///
/// The binding ends with the borrow, so members can never observe a stale
/// context from a previous evaluation.
pub struct BoundConditions<'a, T> {
    conditions: &'a ConditionCollection<T>,
    world: &'a World,
    ctx: &'a T,
}

impl<T> BoundConditions<'_, T> {
    pub fn check(&self) -> bool {
        self.conditions.check(self.world, self.ctx)
    }

    pub fn check_target(&self, target: &Target) -> bool {
        self.conditions.check_target(self.world, self.ctx, target)
    }

    pub fn check_targets(&self, targets: &TargetCollection) -> bool {
        self.conditions.check_targets(self.world, self.ctx, targets)
    }

    pub fn any(&self) -> bool {
        self.conditions.any(self.world, self.ctx)
    }
}

// ============================================================================
// Closure adapter
// ============================================================================

/// Wraps a closure as a no-target condition.
pub struct FnCondition<F> {
    name: &'static str,
    predicate: F,
}

impl<F> FnCondition<F> {
    pub fn new(name: &'static str, predicate: F) -> Self {
        Self { name, predicate }
    }
}

impl<T, F> Condition<T> for FnCondition<F>
where
    F: Fn(&World, &T) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        self.name
    }

    fn check(&self, world: &World, ctx: &T) -> bool {
        (self.predicate)(world, ctx)
    }
}
