//! Capability shapes that conditions and effects are evaluated against.
//!
//! Each shape is a small, copyable description of "where we are": the context
//! node plus whatever the kind of context adds (the cast, the buff, the hit).
//! Conditions and effects are generic over the shape they need; a leaf written
//! against [`AsContext`] works in every collection, one written against
//! [`CastRef`] only where a cast is available.

use crate::buff::BuffKey;
use crate::targeting::Target;
use crate::types::{ActorId, CastId, ContextId, ProjectileId, Vec3};

/// Base shape shared by every context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextRef {
    pub id: ContextId,
    pub source: ActorId,
}

/// Anything that carries a context.
pub trait AsContext {
    fn context(&self) -> &ContextRef;

    fn context_id(&self) -> ContextId {
        self.context().id
    }

    /// The actor this context is evaluated on behalf of.
    fn source(&self) -> ActorId {
        self.context().source
    }
}

/// Anything that can reach up to the cast it belongs to.
pub trait AsCast: AsContext {
    fn cast_ref(&self) -> &CastRef;

    fn cast(&self) -> CastId {
        self.cast_ref().cast
    }

    fn caster(&self) -> ActorId {
        self.cast_ref().context.source
    }
}

impl AsContext for ContextRef {
    fn context(&self) -> &ContextRef {
        self
    }
}

// ============================================================================
// Cast
// ============================================================================

/// Shape of a cast context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CastRef {
    pub context: ContextRef,
    pub cast: CastId,
}

impl AsContext for CastRef {
    fn context(&self) -> &ContextRef {
        &self.context
    }
}

impl AsCast for CastRef {
    fn cast_ref(&self) -> &CastRef {
        self
    }
}

// ============================================================================
// Buff
// ============================================================================

/// Shape of a buff context. `source` is whoever applied the buff, `owner`
/// is the actor carrying it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BuffRef {
    pub context: ContextRef,
    pub key: BuffKey,
}

impl BuffRef {
    pub fn owner(&self) -> ActorId {
        self.key.owner
    }
}

impl AsContext for BuffRef {
    fn context(&self) -> &ContextRef {
        &self.context
    }
}

// ============================================================================
// Projectile / hit
// ============================================================================

/// Shape of a projectile context, chained under its cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileRef {
    pub context: ContextRef,
    pub cast: CastRef,
    pub projectile: ProjectileId,
}

impl AsContext for ProjectileRef {
    fn context(&self) -> &ContextRef {
        &self.context
    }
}

impl AsCast for ProjectileRef {
    fn cast_ref(&self) -> &CastRef {
        &self.cast
    }
}

/// Shape of a hit evaluation, chained under its projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRef {
    pub context: ContextRef,
    pub projectile: ProjectileRef,
    pub target: Target,
    pub position: Vec3,
}

impl AsContext for HitRef {
    fn context(&self) -> &ContextRef {
        &self.context
    }
}

impl AsCast for HitRef {
    fn cast_ref(&self) -> &CastRef {
        &self.projectile.cast
    }
}
