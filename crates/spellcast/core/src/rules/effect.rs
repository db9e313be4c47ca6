//! Context-typed side effects and their ordered composite.

use std::fmt;
use std::sync::Arc;

use crate::targeting::{Target, TargetCollection};
use crate::types::{ActorId, TargetableId, Vec3};
use crate::world::World;

/// A side effect applied in a context of shape `T`.
///
/// Leaves override the target kinds they act on; every overload defaults to
/// doing nothing.
pub trait Effect<T>: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn apply(&self, _world: &mut World, _ctx: &T) {}

    fn apply_point(&self, _world: &mut World, _ctx: &T, _point: Vec3) {}

    fn apply_actor(&self, _world: &mut World, _ctx: &T, _actor: ActorId) {}

    fn apply_targetable(&self, _world: &mut World, _ctx: &T, _target: TargetableId) {}

    /// Dispatches to the overload matching `target`'s kind.
    fn apply_target(&self, world: &mut World, ctx: &T, target: &Target) {
        match *target {
            Target::Point(point) => self.apply_point(world, ctx, point),
            Target::Targetable(id) => self.apply_targetable(world, ctx, id),
            Target::Actor(actor) => self.apply_actor(world, ctx, actor),
        }
    }
}

/// Ordered list of effects. Every `run*` call applies each member exactly
/// once, in insertion order, and returns the collection for chaining across
/// target kinds.
pub struct EffectCollection<T> {
    members: Vec<Arc<dyn Effect<T>>>,
}

impl<T> EffectCollection<T> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// Builder-style append.
    pub fn with(mut self, effect: impl Effect<T> + 'static) -> Self {
        self.push(effect);
        self
    }

    pub fn push(&mut self, effect: impl Effect<T> + 'static) {
        self.members.push(Arc::new(effect));
    }

    pub fn push_shared(&mut self, effect: Arc<dyn Effect<T>>) {
        self.members.push(effect);
    }

    pub fn extend_from(&mut self, other: &EffectCollection<T>) {
        self.members.extend(other.members.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Effect<T>>> {
        self.members.iter()
    }

    pub fn run(&self, world: &mut World, ctx: &T) -> &Self {
        for effect in &self.members {
            effect.apply(world, ctx);
        }
        self
    }

    pub fn run_point(&self, world: &mut World, ctx: &T, point: Vec3) -> &Self {
        for effect in &self.members {
            effect.apply_point(world, ctx, point);
        }
        self
    }

    pub fn run_actor(&self, world: &mut World, ctx: &T, actor: ActorId) -> &Self {
        for effect in &self.members {
            effect.apply_actor(world, ctx, actor);
        }
        self
    }

    pub fn run_targetable(&self, world: &mut World, ctx: &T, target: TargetableId) -> &Self {
        for effect in &self.members {
            effect.apply_targetable(world, ctx, target);
        }
        self
    }

    pub fn run_target(&self, world: &mut World, ctx: &T, target: &Target) -> &Self {
        for effect in &self.members {
            effect.apply_target(world, ctx, target);
        }
        self
    }

    /// Runs the collection once per target, in points, targetables, actors order.
    pub fn run_targets(&self, world: &mut World, ctx: &T, targets: &TargetCollection) -> &Self {
        for target in targets.iter() {
            self.run_target(world, ctx, &target);
        }
        self
    }

    /// Pairs the collection with a world and context for one application pass.
    pub fn bind<'a>(&'a self, world: &'a mut World, ctx: &'a T) -> BoundEffects<'a, T> {
        BoundEffects {
            effects: self,
            world,
            ctx,
        }
    }
}

impl<T> Clone for EffectCollection<T> {
    fn clone(&self) -> Self {
        Self {
            members: self.members.clone(),
        }
    }
}

impl<T> Default for EffectCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EffectCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.members.iter().map(|e| e.name()))
            .finish()
    }
}

impl<T> Effect<T> for EffectCollection<T> {
    fn name(&self) -> &str {
        "EffectCollection"
    }

    fn apply(&self, world: &mut World, ctx: &T) {
        self.run(world, ctx);
    }

    fn apply_point(&self, world: &mut World, ctx: &T, point: Vec3) {
        self.run_point(world, ctx, point);
    }

    fn apply_actor(&self, world: &mut World, ctx: &T, actor: ActorId) {
        self.run_actor(world, ctx, actor);
    }

    fn apply_targetable(&self, world: &mut World, ctx: &T, target: TargetableId) {
        self.run_targetable(world, ctx, target);
    }
}

/// An effect collection bound to one world and context.
pub struct BoundEffects<'a, T> {
    effects: &'a EffectCollection<T>,
    world: &'a mut World,
    ctx: &'a T,
}

impl<T> BoundEffects<'_, T> {
    pub fn run(&mut self) -> &mut Self {
        self.effects.run(self.world, self.ctx);
        self
    }

    pub fn run_point(&mut self, point: Vec3) -> &mut Self {
        self.effects.run_point(self.world, self.ctx, point);
        self
    }

    pub fn run_actor(&mut self, actor: ActorId) -> &mut Self {
        self.effects.run_actor(self.world, self.ctx, actor);
        self
    }

    pub fn run_targetable(&mut self, target: TargetableId) -> &mut Self {
        self.effects.run_targetable(self.world, self.ctx, target);
        self
    }

    pub fn run_target(&mut self, target: &Target) -> &mut Self {
        self.effects.run_target(self.world, self.ctx, target);
        self
    }

    pub fn run_targets(&mut self, targets: &TargetCollection) -> &mut Self {
        self.effects.run_targets(self.world, self.ctx, targets);
        self
    }
}

// ============================================================================
// Closure adapter
// ============================================================================

/// Wraps a closure as a no-target effect.
pub struct FnEffect<F> {
    name: &'static str,
    action: F,
}

impl<F> FnEffect<F> {
    pub fn new(name: &'static str, action: F) -> Self {
        Self { name, action }
    }
}

impl<T, F> Effect<T> for FnEffect<F>
where
    F: Fn(&mut World, &T) + Send + Sync,
{
    fn name(&self) -> &str {
        self.name
    }

    fn apply(&self, world: &mut World, ctx: &T) {
        (self.action)(world, ctx)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::config::EngineConfig;
    use crate::context::ContextRef;
    use crate::targeting::TargetForm;
    use crate::types::{ActorId, ContextId, TargetableId};

    type Journal = Arc<Mutex<Vec<String>>>;

    struct Record {
        tag: &'static str,
        journal: Journal,
    }

    impl Record {
        fn log(&self, what: String) {
            self.journal.lock().unwrap().push(format!("{}:{what}", self.tag));
        }
    }

    impl<T> Effect<T> for Record {
        fn apply(&self, _world: &mut World, _ctx: &T) {
            self.log("none".into());
        }

        fn apply_point(&self, _world: &mut World, _ctx: &T, point: Vec3) {
            self.log(format!("point({})", point.x));
        }

        fn apply_actor(&self, _world: &mut World, _ctx: &T, actor: ActorId) {
            self.log(format!("actor({})", actor.0));
        }

        fn apply_targetable(&self, _world: &mut World, _ctx: &T, target: TargetableId) {
            self.log(format!("object({})", target.0));
        }
    }

    fn ctx() -> ContextRef {
        ContextRef {
            id: ContextId(0),
            source: ActorId(0),
        }
    }

    fn record(tag: &'static str, journal: &Journal) -> Record {
        Record {
            tag,
            journal: Arc::clone(journal),
        }
    }

    #[test]
    fn run_applies_each_member_once_in_insertion_order() {
        let mut world = World::new(EngineConfig::default());
        let journal: Journal = Arc::default();
        let effects = EffectCollection::<ContextRef>::new()
            .with(record("a", &journal))
            .with(record("b", &journal))
            .with(record("c", &journal));

        effects.run(&mut world, &ctx());
        assert_eq!(*journal.lock().unwrap(), vec!["a:none", "b:none", "c:none"]);
    }

    #[test]
    fn chained_overloads_keep_member_order_per_call() {
        let mut world = World::new(EngineConfig::default());
        let journal: Journal = Arc::default();
        let effects = EffectCollection::<ContextRef>::new()
            .with(record("a", &journal))
            .with(record("b", &journal));

        effects
            .bind(&mut world, &ctx())
            .run()
            .run_point(Vec3::new(2.0, 0.0, 0.0))
            .run_actor(ActorId(9));

        assert_eq!(
            *journal.lock().unwrap(),
            vec![
                "a:none",
                "b:none",
                "a:point(2)",
                "b:point(2)",
                "a:actor(9)",
                "b:actor(9)"
            ]
        );
    }

    #[test]
    fn run_targets_walks_points_then_objects_then_actors() {
        let mut world = World::new(EngineConfig::default());
        let journal: Journal = Arc::default();
        let effects = EffectCollection::<ContextRef>::new().with(record("a", &journal));

        let mut targets = TargetCollection::new(TargetForm::Plural);
        targets.push(Target::Actor(ActorId(1))).unwrap();
        targets.push(Target::Targetable(TargetableId(5))).unwrap();
        targets.push(Target::Point(Vec3::new(3.0, 0.0, 0.0))).unwrap();

        effects.run_targets(&mut world, &ctx(), &targets);
        assert_eq!(
            *journal.lock().unwrap(),
            vec!["a:point(3)", "a:object(5)", "a:actor(1)"]
        );
    }

    #[test]
    fn fn_effect_mutates_world() {
        let mut world = World::new(EngineConfig::default());
        let effects = EffectCollection::<ContextRef>::new().with(FnEffect::new(
            "advance",
            |world: &mut World, _: &ContextRef| {
                world.advance_clock(1.0);
            },
        ));
        effects.run(&mut world, &ctx()).run(&mut world, &ctx());
        assert_eq!(world.now().seconds(), 2.0);
    }
}
