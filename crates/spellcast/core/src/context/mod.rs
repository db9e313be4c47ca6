//! Context hierarchy.
//!
//! Every stateful operation in the engine is evaluated "in" a context: a node
//! carrying an identifier, the actor it acts on behalf of, and a position in an
//! ownership tree rooted at an actor. A projectile's hit context reaches its
//! cast (and through it the spell) by walking up that tree.

mod scope;
mod tree;

pub use scope::{AsCast, AsContext, BuffRef, CastRef, ContextRef, HitRef, ProjectileRef};
pub use tree::{Ancestors, ContextKind, ContextNode, ContextTree};
