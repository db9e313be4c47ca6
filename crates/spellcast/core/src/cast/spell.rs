//! Content-author interfaces for spells.

use crate::context::{CastRef, HitRef, ProjectileRef};
use crate::projectile::ProjectileDelivery;
use crate::rules::{ConditionCollection, EffectCollection};
use crate::targeting::{TargetForm, TargetMacro};
use crate::world::World;

/// The six effect collections a spell contributes to its casts.
#[derive(Clone, Debug, Default)]
pub struct SpellEffects {
    /// Runs once the cast has been accepted, before targeting.
    pub invoke: EffectCollection<CastRef>,
    /// Runs when the wind-up begins.
    pub cast_began: EffectCollection<CastRef>,
    /// Runs during the wind-up at the spell's casting interval.
    pub casting: EffectCollection<CastRef>,
    pub cast_failed: EffectCollection<CastRef>,
    /// Runs on success: once with no target, then once per acquired target
    /// for direct spells. Projectile spells only get the no-target pass.
    pub cast_done: EffectCollection<CastRef>,
    /// Runs on every valid projectile hit, with the hit target.
    pub hit: EffectCollection<HitRef>,
}

/// Per-stage callbacks for spells that need more than effect collections.
///
/// Every hook runs after the stage's effects and defaults to doing nothing.
#[allow(unused_variables)]
pub trait CastHooks: Send + Sync {
    fn on_invoke(&self, world: &mut World, cast: &CastRef) {}

    fn on_targeting_done(&self, world: &mut World, cast: &CastRef) {}

    fn on_cast_began(&self, world: &mut World, cast: &CastRef) {}

    /// Throttled wind-up hook. `progress` is the completion percentage.
    fn on_casting(&self, world: &mut World, cast: &CastRef, progress: f64) {}

    fn on_cast_failed(&self, world: &mut World, cast: &CastRef) {}

    fn on_cast_done(&self, world: &mut World, cast: &CastRef) {}

    fn on_hit(&self, world: &mut World, hit: &HitRef) {}

    /// A projectile arrived without ever validly hitting anything.
    fn on_miss(&self, world: &mut World, projectile: &ProjectileRef) {}

    /// Runs once, after the last projectile of the cast is collected.
    fn on_cleanup(&self, world: &mut World, cast: &CastRef) {}
}

/// A castable ability.
///
/// The engine only ever holds spells as `Arc<dyn Spell>`; a spell is shared
/// between every cast of it and must not keep per-cast state.
pub trait Spell: Send + Sync {
    fn name(&self) -> &str;

    /// Wind-up in seconds. Zero makes the spell instant.
    fn cast_duration(&self) -> f64 {
        0.0
    }

    fn target_form(&self) -> TargetForm {
        TargetForm::Singular
    }

    /// Maximum distance for point selection, measured from the caster.
    fn range(&self) -> Option<f32> {
        None
    }

    /// Minimum seconds between casting hooks. Falls back to the engine default.
    fn casting_interval(&self) -> Option<f64> {
        None
    }

    /// Creates the acquisition unit for one cast.
    fn target_macro(&self, cast: &CastRef) -> Box<dyn TargetMacro>;

    fn invoke_conditions(&self) -> &ConditionCollection<CastRef>;

    /// Appended to the caster's interrupt set when the wind-up begins.
    fn interrupt_conditions(&self) -> &ConditionCollection<CastRef>;

    fn effects(&self) -> &SpellEffects;

    fn hooks(&self) -> Option<&dyn CastHooks> {
        None
    }

    /// Present for projectile-based spells.
    fn projectile(&self) -> Option<&dyn ProjectileDelivery> {
        None
    }

    fn is_instant(&self) -> bool {
        self.cast_duration() <= 0.0
    }
}
