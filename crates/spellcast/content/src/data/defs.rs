//! Serializable spell and buff definitions (RON).

use serde::{Deserialize, Serialize};

use spellcast_core::{AttributeKind, BuffVisibility, StackBehavior, TargetForm};

use crate::effects::Scope;

/// How a data spell acquires its targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetingDef {
    /// The caster itself.
    #[default]
    Caster,
    /// The closest targetable actors in range.
    Nearest { count: usize },
    /// Interactive point selection.
    Point,
    /// Interactive actor selection.
    Actor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConditionDef {
    AttributeAtLeast { attribute: AttributeKind, value: f64 },
    Alive,
    HasBuff(String),
    /// Cast conditions only.
    Moved { tolerance: f32 },
    Not(Box<ConditionDef>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EffectDef {
    ModifyAttribute {
        attribute: AttributeKind,
        amount: f64,
        #[serde(default)]
        scope: Scope,
    },
    /// Buff effects only.
    Modifier {
        attribute: AttributeKind,
        #[serde(default = "default_weight")]
        weight: f64,
        value: f64,
    },
    /// Buff effects only.
    ClearModifier { attribute: AttributeKind },
    /// Refers to a buff defined earlier in the catalog.
    ApplyBuff {
        buff: String,
        #[serde(default)]
        visibility: BuffVisibility,
        #[serde(default)]
        scope: Scope,
    },
    InterruptCasts,
    Trace(String),
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellEffectsDef {
    pub invoke: Vec<EffectDef>,
    pub cast_began: Vec<EffectDef>,
    pub casting: Vec<EffectDef>,
    pub cast_failed: Vec<EffectDef>,
    pub cast_done: Vec<EffectDef>,
    pub hit: Vec<EffectDef>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileDef {
    pub speed: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpellDef {
    pub name: String,
    #[serde(default)]
    pub cast_duration: f64,
    #[serde(default)]
    pub target_form: TargetForm,
    #[serde(default)]
    pub range: Option<f32>,
    #[serde(default)]
    pub casting_interval: Option<f64>,
    #[serde(default)]
    pub targeting: TargetingDef,
    #[serde(default)]
    pub invoke: Vec<ConditionDef>,
    #[serde(default)]
    pub interrupts: Vec<ConditionDef>,
    #[serde(default)]
    pub effects: SpellEffectsDef,
    #[serde(default)]
    pub projectile: Option<ProjectileDef>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuffEffectsDef {
    pub possess: Vec<EffectDef>,
    pub tick: Vec<EffectDef>,
    pub done: Vec<EffectDef>,
    pub terminate: Vec<EffectDef>,
    pub stack: Vec<EffectDef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuffDef {
    pub name: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default = "default_interval")]
    pub interval: f64,
    #[serde(default)]
    pub continuous: bool,
    #[serde(default = "default_max_stacks")]
    pub max_stacks: u32,
    #[serde(default = "default_stacking")]
    pub stacking: StackBehavior,
    #[serde(default)]
    pub effects: BuffEffectsDef,
    #[serde(default)]
    pub done: Vec<ConditionDef>,
    #[serde(default)]
    pub terminate: Vec<ConditionDef>,
}

fn default_interval() -> f64 {
    1.0
}

fn default_max_stacks() -> u32 {
    1
}

fn default_stacking() -> StackBehavior {
    StackBehavior::RESET_BEGINNING
}
