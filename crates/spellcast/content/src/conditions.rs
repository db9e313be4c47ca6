//! Stock condition leaves.

use std::sync::Arc;

use spellcast_core::{
    ActorId, AsCast, AttributeKind, CastRef, Condition, TargetableId, Vec3, World,
};

use crate::subject::Subject;

/// Holds while an actor's attribute is at least `value`.
///
/// Without a target it inspects the context's subject; with an actor target
/// it inspects that actor. Point and object targets always pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttributeAtLeast {
    pub attribute: AttributeKind,
    pub value: f64,
}

impl AttributeAtLeast {
    pub fn new(attribute: AttributeKind, value: f64) -> Self {
        Self { attribute, value }
    }

    fn holds(&self, world: &World, actor: ActorId) -> bool {
        world
            .actor(actor)
            .is_some_and(|a| a.attribute(self.attribute) >= self.value)
    }
}

impl<T: Subject> Condition<T> for AttributeAtLeast {
    fn name(&self) -> &str {
        "attribute_at_least"
    }

    fn check(&self, world: &World, ctx: &T) -> bool {
        self.holds(world, ctx.subject())
    }

    fn check_actor(&self, world: &World, _ctx: &T, actor: ActorId) -> bool {
        self.holds(world, actor)
    }
}

/// Holds while the actor exists and is alive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IsAlive;

impl<T: Subject> Condition<T> for IsAlive {
    fn name(&self) -> &str {
        "is_alive"
    }

    fn check(&self, world: &World, ctx: &T) -> bool {
        world.actor(ctx.subject()).is_some_and(|a| a.alive)
    }

    fn check_actor(&self, world: &World, _ctx: &T, actor: ActorId) -> bool {
        world.actor(actor).is_some_and(|a| a.alive)
    }
}

/// Holds while the actor carries a buff with this name in either container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HasBuff {
    pub buff: String,
}

impl HasBuff {
    pub fn new(buff: impl Into<String>) -> Self {
        Self { buff: buff.into() }
    }
}

impl<T: Subject> Condition<T> for HasBuff {
    fn name(&self) -> &str {
        "has_buff"
    }

    fn check(&self, world: &World, ctx: &T) -> bool {
        world
            .actor(ctx.subject())
            .is_some_and(|a| a.has_buff_named(&self.buff))
    }

    fn check_actor(&self, world: &World, _ctx: &T, actor: ActorId) -> bool {
        world
            .actor(actor)
            .is_some_and(|a| a.has_buff_named(&self.buff))
    }
}

/// Holds once the caster has moved more than `tolerance` away from where the
/// wind-up began. Meant for interrupt sets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovedSinceCastBegan {
    pub tolerance: f32,
}

impl MovedSinceCastBegan {
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }

    fn moved(&self, world: &World, ctx: &CastRef) -> Option<bool> {
        let began_at: Vec3 = world.cast(ctx.cast())?.begin_position()?;
        let now_at = world.actor(ctx.caster())?.position;
        Some(began_at.distance(now_at) > self.tolerance)
    }
}

impl Condition<CastRef> for MovedSinceCastBegan {
    fn name(&self) -> &str {
        "moved_since_cast_began"
    }

    fn check(&self, world: &World, ctx: &CastRef) -> bool {
        self.moved(world, ctx).unwrap_or(false)
    }
}

/// Inverts every overload of the wrapped condition.
pub struct Not<T> {
    inner: Arc<dyn Condition<T>>,
}

impl<T> Not<T> {
    pub fn new(inner: impl Condition<T> + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn shared(inner: Arc<dyn Condition<T>>) -> Self {
        Self { inner }
    }
}

impl<T> Condition<T> for Not<T> {
    fn name(&self) -> &str {
        "not"
    }

    fn check(&self, world: &World, ctx: &T) -> bool {
        !self.inner.check(world, ctx)
    }

    fn check_point(&self, world: &World, ctx: &T, point: Vec3) -> bool {
        !self.inner.check_point(world, ctx, point)
    }

    fn check_actor(&self, world: &World, ctx: &T, actor: ActorId) -> bool {
        !self.inner.check_actor(world, ctx, actor)
    }

    fn check_targetable(&self, world: &World, ctx: &T, target: TargetableId) -> bool {
        !self.inner.check_targetable(world, ctx, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spellcast_core::{
        AttributeCollection, CharacterSpec, ConditionCollection, ContextRef, EngineConfig,
    };

    fn world_with_mage() -> (World, ActorId) {
        let mut world = World::new(EngineConfig::default());
        let mage = world.spawn_actor(
            CharacterSpec::new("mage")
                .with_attributes(AttributeCollection::new().with(AttributeKind::Mana, 30.0)),
        );
        (world, mage)
    }

    fn ctx(world: &World, actor: ActorId) -> ContextRef {
        ContextRef {
            id: world.actor(actor).unwrap().root_context(),
            source: actor,
        }
    }

    #[test]
    fn attribute_threshold_reads_the_subject() {
        let (world, mage) = world_with_mage();
        let ctx = ctx(&world, mage);

        assert!(Condition::<ContextRef>::check(
            &AttributeAtLeast::new(AttributeKind::Mana, 30.0),
            &world,
            &ctx
        ));
        assert!(!Condition::<ContextRef>::check(
            &AttributeAtLeast::new(AttributeKind::Mana, 30.5),
            &world,
            &ctx
        ));
    }

    #[test]
    fn not_inverts_inside_a_collection() {
        let (mut world, mage) = world_with_mage();
        let ctx = ctx(&world, mage);
        let conditions = ConditionCollection::<ContextRef>::new()
            .with(IsAlive)
            .with(Not::new(HasBuff::new("silence")));

        assert!(conditions.check(&world, &ctx));
        world.actor_mut(mage).unwrap().alive = false;
        assert!(!conditions.check(&world, &ctx));
    }

    #[test]
    fn unknown_actor_fails_actor_checks() {
        let (world, mage) = world_with_mage();
        let ctx = ctx(&world, mage);
        let alive: &dyn Condition<ContextRef> = &IsAlive;
        assert!(!alive.check_actor(&world, &ctx, ActorId(99)));
        assert!(alive.check_point(&world, &ctx, Vec3::ZERO));
    }
}
