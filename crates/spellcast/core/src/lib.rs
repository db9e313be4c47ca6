//! Tick-driven ability execution: casts, buffs and projectiles.
//!
//! `spellcast-core` runs a spell cast from invocation through target
//! acquisition, optional wind-up, resolution and cleanup, alongside two
//! satellite state machines: timed stacking buffs and in-flight projectiles.
//! Content (spells, buffs, conditions, effects, target macros) plugs in through
//! the traits re-exported here; the engine never sees concrete content types.
//! All state lives in [`world::World`] and every transition happens inside
//! [`World::tick`] or one of its public entry points.

pub mod actor;
pub mod buff;
pub mod bus;
pub mod cast;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod projectile;
pub mod rules;
pub mod targeting;
pub mod types;
pub mod world;

pub use actor::{
    Attribute, AttributeCollection, AttributeKind, Character, CharacterSpec, HitFilter,
    SceneObject,
};
pub use buff::{
    Buff, BuffContainer, BuffDefinition, BuffEffects, BuffKey, BuffVisibility, StackBehavior,
    StackOutcome, buff_identity,
};
pub use bus::{SubscriptionId, TICK, TickBus, TopicPattern};
pub use cast::{Cast, CastHooks, CastStage, Spell, SpellEffects};
pub use config::EngineConfig;
pub use context::{
    AsCast, AsContext, BuffRef, CastRef, ContextKind, ContextNode, ContextRef, ContextTree,
    HitRef, ProjectileRef,
};
pub use error::{
    CastRefusal, EngineError, EngineResult, ErrorSeverity, SpellcastError, TargetingFailure,
    TargetingViolation,
};
pub use events::{EngineEvent, EventLog, Topic};
pub use projectile::{
    HitValidity, Projectile, ProjectileController, ProjectileDelivery, StraightLine,
};
pub use rules::{
    BoundConditions, BoundEffects, Condition, ConditionCollection, Effect, EffectCollection,
    FnCondition, FnEffect,
};
pub use targeting::{
    Target, TargetCollection, TargetForm, TargetMacro, TargetingInput, TargetingNotice,
    TargetingSession,
};
pub use types::{ActorId, CastId, ContextId, GameTime, ProjectileId, TargetableId, Vec3};
pub use world::{BuffAttach, TickHandle, World};
