//! In-flight hit-resolution objects spawned by projectile spells.
//!
//! One projectile is launched per acquired target when a projectile spell's
//! cast succeeds. Each has its own context chained under the cast's, so a hit
//! evaluated on it can reach the cast and the spell by walking up the tree.
//! Motion is delegated to a [`ProjectileController`]; the engine only decides
//! when the projectile has arrived and what a hit means.

mod controller;

pub use controller::{ProjectileController, ProjectileDelivery, StraightLine};

use crate::bus::SubscriptionId;
use crate::context::{CastRef, ContextRef, ProjectileRef};
use crate::targeting::Target;
use crate::types::{CastId, ContextId, GameTime, ProjectileId, Vec3};

/// Outcome of validating a candidate hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum HitValidity {
    Valid,
    /// The hit target no longer exists.
    TargetMissing,
    /// The target exists but cannot currently be hit.
    NotTargetable,
    RejectedByProjectile,
    RejectedByActor,
}

impl HitValidity {
    pub fn is_valid(self) -> bool {
        self == HitValidity::Valid
    }
}

/// One in-flight projectile.
pub struct Projectile {
    id: ProjectileId,
    cast: CastRef,
    context: ContextId,
    target: Target,
    position: Vec3,
    last_target_position: Vec3,
    travel_begin_time: GameTime,
    travel_begin_position: Vec3,
    travel_begin_heading: Vec3,
    hit_count: u32,
    pub(crate) controller: Box<dyn ProjectileController>,
    pub(crate) subscription: Option<SubscriptionId>,
}

impl Projectile {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: ProjectileId,
        cast: CastRef,
        context: ContextId,
        target: Target,
        origin: Vec3,
        target_position: Vec3,
        now: GameTime,
        controller: Box<dyn ProjectileController>,
    ) -> Self {
        Self {
            id,
            cast,
            context,
            target,
            position: origin,
            last_target_position: target_position,
            travel_begin_time: now,
            travel_begin_position: origin,
            travel_begin_heading: (target_position - origin).normalize_or_zero(),
            hit_count: 0,
            controller,
            subscription: None,
        }
    }

    pub fn id(&self) -> ProjectileId {
        self.id
    }

    pub fn cast(&self) -> CastId {
        self.cast.cast
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn projectile_ref(&self) -> ProjectileRef {
        ProjectileRef {
            context: ContextRef {
                id: self.context,
                source: self.cast.context.source,
            },
            cast: self.cast,
            projectile: self.id,
        }
    }

    /// The target this projectile was launched at.
    pub fn target(&self) -> Target {
        self.target
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn travel_begin_time(&self) -> GameTime {
        self.travel_begin_time
    }

    pub fn travel_begin_position(&self) -> Vec3 {
        self.travel_begin_position
    }

    /// Unit direction from the launch point to the target at launch.
    pub fn travel_begin_heading(&self) -> Vec3 {
        self.travel_begin_heading
    }

    pub fn hit_count(&self) -> u32 {
        self.hit_count
    }

    pub(crate) fn record_hit(&mut self) {
        self.hit_count += 1;
    }

    /// Moves toward `target_position` (or the last known one) and returns
    /// the distance left.
    pub(crate) fn advance(&mut self, target_position: Option<Vec3>, dt: f64) -> f32 {
        if let Some(target_position) = target_position {
            self.last_target_position = target_position;
        }
        self.position = self
            .controller
            .advance(self.position, self.last_target_position, dt);
        self.position.distance(self.last_target_position)
    }
}

impl std::fmt::Debug for Projectile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Projectile")
            .field("id", &self.id)
            .field("cast", &self.cast.cast)
            .field("target", &self.target)
            .field("position", &self.position)
            .field("hit_count", &self.hit_count)
            .finish()
    }
}
