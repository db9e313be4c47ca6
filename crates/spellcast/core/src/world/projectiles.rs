//! Projectile travel, hit validation and collection.

use tracing::{debug, trace};

use super::{TickHandle, World};
use crate::bus::TICK;
use crate::context::{ContextKind, ContextRef, HitRef, ProjectileRef};
use crate::error::{EngineError, EngineResult};
use crate::events::EngineEvent;
use crate::projectile::{HitValidity, Projectile, ProjectileDelivery};
use crate::targeting::{Target, TargetCollection, TargetForm};
use crate::types::{CastId, ProjectileId, Vec3};

impl World {
    /// Launches one projectile per target and returns how many were launched.
    pub(super) fn launch_projectiles(
        &mut self,
        cast: CastId,
        delivery: &dyn ProjectileDelivery,
        targets: &TargetCollection,
    ) -> EngineResult<usize> {
        let (_, cast_ref) = self.cast_parts(cast)?;
        let caster = cast_ref.context.source;
        let (origin, identifier) = self
            .actors
            .get(&caster)
            .map(|a| (a.position, a.identifier().to_owned()))
            .ok_or(EngineError::UnknownActor(caster))?;

        let mut launched = 0;
        for target in targets.iter() {
            let id = ProjectileId(self.next_projectile);
            self.next_projectile += 1;

            let context =
                self.contexts
                    .create(&id.to_string(), caster, &identifier, ContextKind::Projectile(id));
            self.contexts.add_child(cast_ref.context.id, context);
            let projectile_ref = ProjectileRef {
                context: ContextRef {
                    id: context,
                    source: caster,
                },
                cast: cast_ref,
                projectile: id,
            };

            let controller = delivery.launch(self, &projectile_ref, &target);
            let target_position = self.target_position(&target).unwrap_or(origin);
            let mut projectile = Projectile::new(
                id,
                cast_ref,
                context,
                target,
                origin,
                target_position,
                self.now(),
                controller,
            );
            projectile.subscription = Some(self.bus.subscribe(TICK, TickHandle::Projectile(id)));
            self.projectiles.insert(id, projectile);
            self.publish(EngineEvent::ProjectileLaunched {
                cast,
                projectile: id,
            });
            launched += 1;
        }

        if let Some(record) = self.casts.get_mut(&cast) {
            record.set_outstanding_projectiles(launched);
        }
        debug!(%cast, launched, "projectiles launched");
        Ok(launched)
    }

    /// Reports a candidate hit of `projectile` on `target` at `position`.
    ///
    /// The hit is evaluated in a transient hit context under the projectile's.
    /// Only a valid hit runs the spell's hit effects and hook. A valid hit on
    /// the projectile's own target, or any valid hit for a singular-form
    /// spell, collects the projectile.
    pub fn report_projectile_hit(
        &mut self,
        projectile: ProjectileId,
        target: Target,
        position: Vec3,
    ) -> EngineResult<HitValidity> {
        let record = self
            .projectiles
            .get(&projectile)
            .ok_or(EngineError::UnknownProjectile(projectile))?;
        let projectile_ref = record.projectile_ref();
        let assigned = record.target();
        let caster = projectile_ref.context.source;
        let (spell, _) = self.cast_parts(record.cast())?;

        let identifier = self
            .contexts
            .identifier(projectile_ref.context.id)
            .unwrap_or_default()
            .to_owned();
        let context = self
            .contexts
            .create("hit", caster, &identifier, ContextKind::Hit);
        self.contexts.add_child(projectile_ref.context.id, context);
        let hit = HitRef {
            context: ContextRef {
                id: context,
                source: caster,
            },
            projectile: projectile_ref,
            target,
            position,
        };

        let validity = self.validate_hit(projectile, &hit);
        trace!(%projectile, ?target, %validity, "hit candidate");
        self.publish(EngineEvent::ProjectileHit {
            projectile,
            validity,
        });

        if validity.is_valid() {
            if let Some(record) = self.projectiles.get_mut(&projectile) {
                record.record_hit();
            }
            spell
                .effects()
                .hit
                .run(self, &hit)
                .run_target(self, &hit, &target);
            if let Some(hooks) = spell.hooks() {
                hooks.on_hit(self, &hit);
            }
        }
        self.contexts.remove(context);

        let collects = target == assigned || spell.target_form() == TargetForm::Singular;
        if validity.is_valid() && collects && self.projectiles.contains_key(&projectile) {
            self.collect_projectile(projectile)?;
        }
        Ok(validity)
    }

    fn validate_hit(&self, projectile: ProjectileId, hit: &HitRef) -> HitValidity {
        match hit.target {
            Target::Point(_) => {}
            Target::Targetable(id) => match self.objects.get(&id) {
                None => return HitValidity::TargetMissing,
                Some(object) if !object.targetable => return HitValidity::NotTargetable,
                Some(_) => {}
            },
            Target::Actor(id) => match self.actors.get(&id) {
                None => return HitValidity::TargetMissing,
                Some(actor) if !(actor.alive && actor.targetable) => {
                    return HitValidity::NotTargetable;
                }
                Some(_) => {}
            },
        }

        let accepted = self
            .projectiles
            .get(&projectile)
            .is_some_and(|p| p.controller.accepts_hit(self, hit));
        if !accepted {
            return HitValidity::RejectedByProjectile;
        }

        if let Target::Actor(id) = hit.target {
            let filter = self.actors.get(&id).and_then(|a| a.hit_filter().cloned());
            if filter.is_some_and(|f| !f.accepts_hit(self, hit)) {
                return HitValidity::RejectedByActor;
            }
        }
        HitValidity::Valid
    }

    pub(super) fn tick_projectile(&mut self, id: ProjectileId) -> EngineResult<()> {
        let Some(record) = self.projectiles.get(&id) else {
            return Ok(());
        };
        let target = record.target();
        let target_position = self.target_position(&target);
        let dt = self.last_delta;
        let radius = self.config.projectile_arrival_radius;

        let Some(record) = self.projectiles.get_mut(&id) else {
            return Ok(());
        };
        let remaining = record.advance(target_position, dt);
        if remaining > radius {
            return Ok(());
        }
        let position = record.position();
        let hit_count = record.hit_count();

        match target {
            Target::Point(_) => {
                if hit_count == 0 {
                    self.projectile_missed(id)?;
                }
            }
            Target::Actor(_) | Target::Targetable(_) => {
                let validity = self.report_projectile_hit(id, target, position)?;
                if !validity.is_valid() {
                    self.projectile_missed(id)?;
                }
            }
        }
        if self.projectiles.contains_key(&id) {
            self.collect_projectile(id)?;
        }
        Ok(())
    }

    fn projectile_missed(&mut self, id: ProjectileId) -> EngineResult<()> {
        let record = self
            .projectiles
            .get(&id)
            .ok_or(EngineError::UnknownProjectile(id))?;
        let projectile_ref = record.projectile_ref();
        let (spell, _) = self.cast_parts(record.cast())?;
        self.publish(EngineEvent::ProjectileMissed { projectile: id });
        if let Some(hooks) = spell.hooks() {
            hooks.on_miss(self, &projectile_ref);
        }
        Ok(())
    }

    /// Destroys a projectile and counts it down on its cast. The last one
    /// runs the spell's cleanup hook.
    pub(super) fn collect_projectile(&mut self, id: ProjectileId) -> EngineResult<()> {
        let record = self
            .projectiles
            .remove(&id)
            .ok_or(EngineError::UnknownProjectile(id))?;
        if let Some(subscription) = record.subscription {
            self.bus.unsubscribe(subscription);
        }
        self.contexts.remove(record.context());

        let cast = record.cast();
        let remaining = self
            .casts
            .get_mut(&cast)
            .map(|c| c.projectile_collected())
            .ok_or(EngineError::UnknownCast(cast))?;
        self.publish(EngineEvent::ProjectileCollected {
            projectile: id,
            remaining,
        });
        if remaining == 0 {
            self.finish_projectile_cast(cast)?;
        }
        Ok(())
    }

    /// Final cleanup of a projectile cast once nothing is in flight.
    pub(super) fn finish_projectile_cast(&mut self, cast: CastId) -> EngineResult<()> {
        let (spell, cast_ref) = self.cast_parts(cast)?;
        debug!(%cast, "projectile cast cleanup");
        if let Some(hooks) = spell.hooks() {
            hooks.on_cleanup(self, &cast_ref);
        }
        self.release_cast(cast);
        Ok(())
    }
}
