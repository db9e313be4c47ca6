//! Who a no-target condition or effect is about.

use spellcast_core::{
    ActorId, AsCast, AsContext, BuffRef, CastRef, ContextRef, HitRef, ProjectileRef,
};

/// The actor a context-only evaluation refers to.
///
/// For casts, projectiles and hits that is the caster. For buffs it is the
/// actor carrying the buff, not the one who applied it.
pub trait Subject: AsContext {
    fn subject(&self) -> ActorId {
        self.source()
    }

    /// Context that buffs applied from here are attributed to.
    fn origin(&self) -> ContextRef {
        *self.context()
    }
}

impl Subject for ContextRef {}

impl Subject for CastRef {}

// Projectiles and hits attribute to their cast, so buffs from separate
// projectiles of one spell stack on each other.
impl Subject for ProjectileRef {
    fn origin(&self) -> ContextRef {
        self.cast_ref().context
    }
}

impl Subject for HitRef {
    fn origin(&self) -> ContextRef {
        self.cast_ref().context
    }
}

impl Subject for BuffRef {
    fn subject(&self) -> ActorId {
        self.owner()
    }
}
