//! Spells and buffs built from data definitions.
//!
//! Definitions are compiled once into [`DataSpell`] and [`DataBuff`], which
//! implement the core content traits. Compiled collections share their leaf
//! conditions and effects with every cast or buff instance that uses them.

mod defs;

pub use defs::{
    BuffDef, BuffEffectsDef, ConditionDef, EffectDef, ProjectileDef, SpellDef, SpellEffectsDef,
    TargetingDef,
};

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, bail};
use tracing::debug;

use spellcast_core::{
    BuffDefinition, BuffEffects, BuffRef, CastRef, Condition, ConditionCollection, Effect,
    EffectCollection, HitRef, ProjectileDelivery, Spell, SpellEffects, StackBehavior,
    StraightLine, TargetForm, TargetMacro,
};

use crate::conditions::{AttributeAtLeast, HasBuff, IsAlive, MovedSinceCastBegan, Not};
use crate::effects::{
    ApplyBuff, AttributeModifier, ClearModifier, InterruptCasts, ModifyAttribute, Trace,
};
use crate::subject::Subject;
use crate::targeting::{ActorSelect, NearestActors, PointSelect, SelfTarget};

// ============================================================================
// Compilation
// ============================================================================

/// Context shapes data definitions can be compiled for.
///
/// Some definitions only make sense in one shape (movement checks need a
/// cast, attribute modifiers need a buff); those are supplied here.
pub trait Shape: Subject + Sized + 'static {
    fn shape_condition(_def: &ConditionDef) -> Option<Arc<dyn Condition<Self>>> {
        None
    }

    fn shape_effect(_def: &EffectDef) -> Option<Arc<dyn Effect<Self>>> {
        None
    }
}

impl Shape for CastRef {
    fn shape_condition(def: &ConditionDef) -> Option<Arc<dyn Condition<Self>>> {
        match *def {
            ConditionDef::Moved { tolerance } => Some(Arc::new(MovedSinceCastBegan::new(tolerance))),
            _ => None,
        }
    }
}

impl Shape for BuffRef {
    fn shape_effect(def: &EffectDef) -> Option<Arc<dyn Effect<Self>>> {
        match *def {
            EffectDef::Modifier {
                attribute,
                weight,
                value,
            } => Some(Arc::new(AttributeModifier {
                attribute,
                weight,
                value,
            })),
            EffectDef::ClearModifier { attribute } => Some(Arc::new(ClearModifier { attribute })),
            _ => None,
        }
    }
}

impl Shape for HitRef {}

fn compile_condition<T: Shape>(def: &ConditionDef) -> anyhow::Result<Arc<dyn Condition<T>>> {
    if let Some(condition) = T::shape_condition(def) {
        return Ok(condition);
    }
    let condition: Arc<dyn Condition<T>> = match def {
        ConditionDef::AttributeAtLeast { attribute, value } => {
            Arc::new(AttributeAtLeast::new(*attribute, *value))
        }
        ConditionDef::Alive => Arc::new(IsAlive),
        ConditionDef::HasBuff(name) => Arc::new(HasBuff::new(name.clone())),
        ConditionDef::Not(inner) => Arc::new(Not::shared(compile_condition::<T>(inner)?)),
        ConditionDef::Moved { .. } => bail!("`Moved` is only valid as a cast condition"),
    };
    Ok(condition)
}

fn compile_conditions<T: Shape>(defs: &[ConditionDef]) -> anyhow::Result<ConditionCollection<T>> {
    let mut conditions = ConditionCollection::new();
    for def in defs {
        conditions.push_shared(compile_condition::<T>(def)?);
    }
    Ok(conditions)
}

fn compile_effect<T: Shape>(
    def: &EffectDef,
    buffs: &BTreeMap<String, Arc<dyn BuffDefinition>>,
) -> anyhow::Result<Arc<dyn Effect<T>>> {
    if let Some(effect) = T::shape_effect(def) {
        return Ok(effect);
    }
    let effect: Arc<dyn Effect<T>> = match def {
        EffectDef::ModifyAttribute {
            attribute,
            amount,
            scope,
        } => Arc::new(ModifyAttribute {
            attribute: *attribute,
            amount: *amount,
            scope: *scope,
        }),
        EffectDef::ApplyBuff {
            buff,
            visibility,
            scope,
        } => {
            let definition = buffs
                .get(buff)
                .ok_or_else(|| anyhow!("unknown buff `{buff}`"))?;
            Arc::new(ApplyBuff {
                definition: Arc::clone(definition),
                visibility: *visibility,
                scope: *scope,
            })
        }
        EffectDef::InterruptCasts => Arc::new(InterruptCasts),
        EffectDef::Trace(label) => Arc::new(Trace::new(label.clone())),
        EffectDef::Modifier { .. } | EffectDef::ClearModifier { .. } => {
            bail!("attribute modifiers are only valid as buff effects")
        }
    };
    Ok(effect)
}

fn compile_effects<T: Shape>(
    defs: &[EffectDef],
    buffs: &BTreeMap<String, Arc<dyn BuffDefinition>>,
) -> anyhow::Result<EffectCollection<T>> {
    let mut effects = EffectCollection::new();
    for def in defs {
        effects.push_shared(compile_effect::<T>(def, buffs)?);
    }
    Ok(effects)
}

// ============================================================================
// DataSpell
// ============================================================================

/// A spell compiled from a [`SpellDef`].
pub struct DataSpell {
    name: String,
    cast_duration: f64,
    target_form: TargetForm,
    range: Option<f32>,
    casting_interval: Option<f64>,
    targeting: TargetingDef,
    invoke_conditions: ConditionCollection<CastRef>,
    interrupt_conditions: ConditionCollection<CastRef>,
    effects: SpellEffects,
    projectile: Option<StraightLine>,
}

impl DataSpell {
    pub fn compile(
        def: &SpellDef,
        buffs: &BTreeMap<String, Arc<dyn BuffDefinition>>,
    ) -> anyhow::Result<Self> {
        let effects = SpellEffects {
            invoke: compile_effects(&def.effects.invoke, buffs)?,
            cast_began: compile_effects(&def.effects.cast_began, buffs)?,
            casting: compile_effects(&def.effects.casting, buffs)?,
            cast_failed: compile_effects(&def.effects.cast_failed, buffs)?,
            cast_done: compile_effects(&def.effects.cast_done, buffs)?,
            hit: compile_effects(&def.effects.hit, buffs)?,
        };
        if def.projectile.is_none() && !effects.hit.is_empty() {
            bail!("spell `{}` has hit effects but no projectile", def.name);
        }

        Ok(Self {
            name: def.name.clone(),
            cast_duration: def.cast_duration.max(0.0),
            target_form: def.target_form,
            range: def.range,
            casting_interval: def.casting_interval,
            targeting: def.targeting,
            invoke_conditions: compile_conditions(&def.invoke)?,
            interrupt_conditions: compile_conditions(&def.interrupts)?,
            effects,
            projectile: def.projectile.map(|p| StraightLine::new(p.speed)),
        })
    }
}

impl Spell for DataSpell {
    fn name(&self) -> &str {
        &self.name
    }

    fn cast_duration(&self) -> f64 {
        self.cast_duration
    }

    fn target_form(&self) -> TargetForm {
        self.target_form
    }

    fn range(&self) -> Option<f32> {
        self.range
    }

    fn casting_interval(&self) -> Option<f64> {
        self.casting_interval
    }

    fn target_macro(&self, _cast: &CastRef) -> Box<dyn TargetMacro> {
        match self.targeting {
            TargetingDef::Caster => Box::new(SelfTarget),
            TargetingDef::Nearest { count } => Box::new(NearestActors::new(count)),
            TargetingDef::Point => Box::new(PointSelect),
            TargetingDef::Actor => Box::new(ActorSelect),
        }
    }

    fn invoke_conditions(&self) -> &ConditionCollection<CastRef> {
        &self.invoke_conditions
    }

    fn interrupt_conditions(&self) -> &ConditionCollection<CastRef> {
        &self.interrupt_conditions
    }

    fn effects(&self) -> &SpellEffects {
        &self.effects
    }

    fn projectile(&self) -> Option<&dyn ProjectileDelivery> {
        self.projectile.as_ref().map(|p| p as &dyn ProjectileDelivery)
    }
}

// ============================================================================
// DataBuff
// ============================================================================

/// A buff compiled from a [`BuffDef`].
pub struct DataBuff {
    name: String,
    duration: f64,
    interval: f64,
    continuous: bool,
    max_stacks: u32,
    stacking: StackBehavior,
    effects: BuffEffects,
    done_conditions: ConditionCollection<BuffRef>,
    terminate_conditions: ConditionCollection<BuffRef>,
}

impl DataBuff {
    pub fn compile(
        def: &BuffDef,
        buffs: &BTreeMap<String, Arc<dyn BuffDefinition>>,
    ) -> anyhow::Result<Self> {
        if def.interval <= 0.0 && !def.continuous {
            bail!("buff `{}` needs a positive interval or `continuous`", def.name);
        }
        Ok(Self {
            name: def.name.clone(),
            duration: def.duration,
            interval: def.interval,
            continuous: def.continuous,
            max_stacks: def.max_stacks.max(1),
            stacking: def.stacking,
            effects: BuffEffects {
                possess: compile_effects(&def.effects.possess, buffs)?,
                tick: compile_effects(&def.effects.tick, buffs)?,
                done: compile_effects(&def.effects.done, buffs)?,
                terminate: compile_effects(&def.effects.terminate, buffs)?,
                stack: compile_effects(&def.effects.stack, buffs)?,
            },
            done_conditions: compile_conditions(&def.done)?,
            terminate_conditions: compile_conditions(&def.terminate)?,
        })
    }
}

impl BuffDefinition for DataBuff {
    fn name(&self) -> &str {
        &self.name
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn interval(&self) -> f64 {
        self.interval
    }

    fn continuous(&self) -> bool {
        self.continuous
    }

    fn max_stacks(&self) -> u32 {
        self.max_stacks
    }

    fn stack_behavior(&self) -> StackBehavior {
        self.stacking
    }

    fn effects(&self) -> &BuffEffects {
        &self.effects
    }

    fn done_conditions(&self) -> &ConditionCollection<BuffRef> {
        &self.done_conditions
    }

    fn terminate_conditions(&self) -> &ConditionCollection<BuffRef> {
        &self.terminate_conditions
    }
}

// ============================================================================
// ContentLibrary
// ============================================================================

/// Compiled spells and buffs, looked up by name.
#[derive(Default)]
pub struct ContentLibrary {
    spells: BTreeMap<String, Arc<dyn Spell>>,
    buffs: BTreeMap<String, Arc<dyn BuffDefinition>>,
}

impl ContentLibrary {
    /// Compiles buffs first, in order, then spells. A buff may apply buffs
    /// defined before it; spells may apply any buff.
    pub fn compile(buffs: &[BuffDef], spells: &[SpellDef]) -> anyhow::Result<Self> {
        let mut library = Self::default();

        for def in buffs {
            if library.buffs.contains_key(&def.name) {
                bail!("duplicate buff `{}`", def.name);
            }
            let buff = DataBuff::compile(def, &library.buffs)
                .map_err(|e| e.context(format!("in buff `{}`", def.name)))?;
            library.buffs.insert(def.name.clone(), Arc::new(buff));
        }

        for def in spells {
            if library.spells.contains_key(&def.name) {
                bail!("duplicate spell `{}`", def.name);
            }
            let spell = DataSpell::compile(def, &library.buffs)
                .map_err(|e| e.context(format!("in spell `{}`", def.name)))?;
            library.spells.insert(def.name.clone(), Arc::new(spell));
        }

        debug!(
            spells = library.spells.len(),
            buffs = library.buffs.len(),
            "content compiled"
        );
        Ok(library)
    }

    pub fn spell(&self, name: &str) -> Option<Arc<dyn Spell>> {
        self.spells.get(name).cloned()
    }

    pub fn buff(&self, name: &str) -> Option<Arc<dyn BuffDefinition>> {
        self.buffs.get(name).cloned()
    }

    pub fn spell_names(&self) -> impl Iterator<Item = &str> {
        self.spells.keys().map(String::as_str)
    }

    pub fn buff_names(&self) -> impl Iterator<Item = &str> {
        self.buffs.keys().map(String::as_str)
    }
}
