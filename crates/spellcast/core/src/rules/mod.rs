//! Composable conditions and effects.
//!
//! Both are generic over the context shape they need (see [`crate::context`]).
//! A collection of either is itself a condition/effect, so libraries of
//! content can be nested and shared between spells and buffs freely.

mod condition;
mod effect;

pub use condition::{BoundConditions, Condition, ConditionCollection, FnCondition};
pub use effect::{BoundEffects, Effect, EffectCollection, FnEffect};
