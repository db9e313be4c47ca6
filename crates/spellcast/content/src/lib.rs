//! Stock content for the spellcast engine and loaders for data-driven content.
//!
//! This crate provides the pieces a game plugs into `spellcast-core`:
//! - Condition leaves (attribute thresholds, liveness, buff presence, movement)
//! - Effect leaves (attribute changes, buff application, interrupts)
//! - Target macros (self, nearest actors, point and actor selection)
//! - Spells and buffs compiled from RON definitions
//! - Engine configuration and scenario loaders (TOML/RON)
//!
//! The engine never sees these concrete types; everything is handed over
//! through the core traits.

pub mod conditions;
pub mod effects;
pub mod subject;
pub mod targeting;

#[cfg(feature = "loaders")]
pub mod data;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use conditions::{AttributeAtLeast, HasBuff, IsAlive, MovedSinceCastBegan, Not};
pub use effects::{
    ApplyBuff, AttributeModifier, ClearModifier, InterruptCasts, ModifyAttribute, Scope, Trace,
};
pub use subject::Subject;
pub use targeting::{ActorSelect, NearestActors, PointSelect, SelfTarget};

#[cfg(feature = "loaders")]
pub use data::{
    BuffDef, ConditionDef, ContentLibrary, DataBuff, DataSpell, EffectDef, SpellDef,
    TargetingDef,
};

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, ContentLoader, ScenarioAction, ScenarioActor, ScenarioDef,
    ScenarioLoader, ScenarioStep,
};
