//! Stock effect leaves.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use spellcast_core::{
    ActorId, AsContext, AttributeKind, BuffDefinition, BuffRef, BuffVisibility, Effect,
    TargetableId, Vec3, World,
};

use crate::subject::Subject;

/// Which actors a target-agnostic effect acts on.
///
/// Effect collections run a no-target pass followed by one pass per target.
/// `Subject` effects act once, in the no-target pass, on the context's
/// subject; `Targets` effects act in the per-target passes only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scope {
    Subject,
    #[default]
    Targets,
}

/// Adds `amount` to the base value of an attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModifyAttribute {
    pub attribute: AttributeKind,
    pub amount: f64,
    pub scope: Scope,
}

impl ModifyAttribute {
    pub fn on_targets(attribute: AttributeKind, amount: f64) -> Self {
        Self {
            attribute,
            amount,
            scope: Scope::Targets,
        }
    }

    pub fn on_subject(attribute: AttributeKind, amount: f64) -> Self {
        Self {
            attribute,
            amount,
            scope: Scope::Subject,
        }
    }

    fn modify(&self, world: &mut World, actor: ActorId) {
        let Some(character) = world.actor_mut(actor) else {
            return;
        };
        let attribute = character.attributes.get_mut(self.attribute);
        attribute.adjust_base(self.amount);
        trace!(
            actor = %actor,
            attribute = %self.attribute,
            value = attribute.value(),
            "attribute modified"
        );
    }
}

impl<T: Subject> Effect<T> for ModifyAttribute {
    fn name(&self) -> &str {
        "modify_attribute"
    }

    fn apply(&self, world: &mut World, ctx: &T) {
        if self.scope == Scope::Subject {
            self.modify(world, ctx.subject());
        }
    }

    fn apply_actor(&self, world: &mut World, _ctx: &T, actor: ActorId) {
        if self.scope == Scope::Targets {
            self.modify(world, actor);
        }
    }
}

/// Installs a weighted component on the buff owner's attribute, named after
/// the buff identity so that two buffs never overwrite each other.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttributeModifier {
    pub attribute: AttributeKind,
    pub weight: f64,
    pub value: f64,
}

impl Effect<BuffRef> for AttributeModifier {
    fn name(&self) -> &str {
        "attribute_modifier"
    }

    fn apply(&self, world: &mut World, ctx: &BuffRef) {
        if let Some(owner) = world.actor_mut(ctx.owner()) {
            owner
                .attributes
                .get_mut(self.attribute)
                .set_component(&ctx.key.identity, self.weight, self.value);
        }
    }
}

/// Removes the component installed by [`AttributeModifier`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClearModifier {
    pub attribute: AttributeKind,
}

impl Effect<BuffRef> for ClearModifier {
    fn name(&self) -> &str {
        "clear_modifier"
    }

    fn apply(&self, world: &mut World, ctx: &BuffRef) {
        if let Some(owner) = world.actor_mut(ctx.owner()) {
            owner
                .attributes
                .get_mut(self.attribute)
                .remove_component(&ctx.key.identity);
        }
    }
}

/// Attaches a buff, attributed to the evaluating context's [`Subject::origin`].
pub struct ApplyBuff {
    pub definition: Arc<dyn BuffDefinition>,
    pub visibility: BuffVisibility,
    pub scope: Scope,
}

impl ApplyBuff {
    pub fn new(definition: Arc<dyn BuffDefinition>) -> Self {
        Self {
            definition,
            visibility: BuffVisibility::Visible,
            scope: Scope::Targets,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visibility = BuffVisibility::Hidden;
        self
    }

    pub fn on_subject(mut self) -> Self {
        self.scope = Scope::Subject;
        self
    }

    fn attach(&self, world: &mut World, origin: &impl AsContext, owner: ActorId) {
        match world.attach_buff(
            owner,
            self.visibility,
            Arc::clone(&self.definition),
            origin,
        ) {
            Ok(outcome) => debug!(owner = %owner, ?outcome, "buff applied"),
            Err(error) => warn!(owner = %owner, %error, "buff application failed"),
        }
    }
}

impl<T: Subject> Effect<T> for ApplyBuff {
    fn name(&self) -> &str {
        "apply_buff"
    }

    fn apply(&self, world: &mut World, ctx: &T) {
        if self.scope == Scope::Subject {
            self.attach(world, &ctx.origin(), ctx.subject());
        }
    }

    fn apply_actor(&self, world: &mut World, ctx: &T, actor: ActorId) {
        if self.scope == Scope::Targets {
            self.attach(world, &ctx.origin(), actor);
        }
    }
}

/// Interrupts every active cast of the target actor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InterruptCasts;

impl<T> Effect<T> for InterruptCasts {
    fn name(&self) -> &str {
        "interrupt_casts"
    }

    fn apply_actor(&self, world: &mut World, _ctx: &T, actor: ActorId) {
        let casts = world
            .actor(actor)
            .map(|a| a.active_casts().to_vec())
            .unwrap_or_default();
        for cast in casts {
            if let Err(error) = world.interrupt_cast(cast) {
                warn!(cast = %cast, %error, "interrupt failed");
            }
        }
    }
}

/// Logs every application. Handy while authoring content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trace {
    pub label: String,
}

impl Trace {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl<T: AsContext> Effect<T> for Trace {
    fn name(&self) -> &str {
        "trace"
    }

    fn apply(&self, _world: &mut World, ctx: &T) {
        debug!(label = %self.label, context = %ctx.context_id(), "effect");
    }

    fn apply_point(&self, _world: &mut World, ctx: &T, point: Vec3) {
        debug!(label = %self.label, context = %ctx.context_id(), %point, "effect on point");
    }

    fn apply_actor(&self, _world: &mut World, ctx: &T, actor: ActorId) {
        debug!(label = %self.label, context = %ctx.context_id(), %actor, "effect on actor");
    }

    fn apply_targetable(&self, _world: &mut World, ctx: &T, target: TargetableId) {
        debug!(label = %self.label, context = %ctx.context_id(), %target, "effect on object");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spellcast_core::{
        AttributeCollection, BuffEffects, CharacterSpec, ConditionCollection, ContextRef,
        EffectCollection, EngineConfig,
    };

    struct Ward {
        effects: BuffEffects,
        none: ConditionCollection<BuffRef>,
    }

    impl BuffDefinition for Ward {
        fn name(&self) -> &str {
            "ward"
        }

        fn duration(&self) -> f64 {
            2.0
        }

        fn effects(&self) -> &BuffEffects {
            &self.effects
        }

        fn done_conditions(&self) -> &ConditionCollection<BuffRef> {
            &self.none
        }

        fn terminate_conditions(&self) -> &ConditionCollection<BuffRef> {
            &self.none
        }
    }

    fn setup() -> (World, ActorId, ActorId) {
        let mut world = World::new(EngineConfig::default());
        let a = world.spawn_actor(
            CharacterSpec::new("a")
                .with_attributes(AttributeCollection::new().with(AttributeKind::Health, 100.0)),
        );
        let b = world.spawn_actor(
            CharacterSpec::new("b")
                .with_attributes(AttributeCollection::new().with(AttributeKind::Health, 100.0)),
        );
        (world, a, b)
    }

    #[test]
    fn scope_decides_which_pass_acts() {
        let (mut world, a, b) = setup();
        let ctx = ContextRef {
            id: world.actor(a).unwrap().root_context(),
            source: a,
        };
        let effects = EffectCollection::<ContextRef>::new()
            .with(ModifyAttribute::on_subject(AttributeKind::Health, -10.0))
            .with(ModifyAttribute::on_targets(AttributeKind::Health, -25.0));

        effects.run(&mut world, &ctx).run_actor(&mut world, &ctx, b);

        assert_eq!(world.actor(a).unwrap().attribute(AttributeKind::Health), 90.0);
        assert_eq!(world.actor(b).unwrap().attribute(AttributeKind::Health), 75.0);
    }

    #[test]
    fn modifier_lives_as_long_as_the_buff() {
        let (mut world, a, _) = setup();
        let mut effects = BuffEffects::default();
        effects.possess.push(AttributeModifier {
            attribute: AttributeKind::Armor,
            weight: 1.0,
            value: 5.0,
        });
        effects.done.push(ClearModifier {
            attribute: AttributeKind::Armor,
        });
        let ward = Arc::new(Ward {
            effects,
            none: ConditionCollection::new(),
        });
        let ctx = ContextRef {
            id: world.actor(a).unwrap().root_context(),
            source: a,
        };

        let applied = EffectCollection::<ContextRef>::new().with(ApplyBuff::new(ward).on_subject());
        applied.run(&mut world, &ctx);
        assert_eq!(world.actor(a).unwrap().attribute(AttributeKind::Armor), 5.0);

        for _ in 0..3 {
            world.tick(1.0).unwrap();
        }
        assert_eq!(world.actor(a).unwrap().attribute(AttributeKind::Armor), 0.0);
        assert!(!world.actor(a).unwrap().has_buff_named("ward"));
    }
}
