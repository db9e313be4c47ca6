//! Cast state machine transitions.

use std::sync::Arc;

use tracing::{debug, info, info_span, trace, warn};

use super::{TickHandle, World};
use crate::bus::TICK;
use crate::cast::{Cast, CastStage, PendingTargeting, Spell};
use crate::context::{CastRef, ContextKind};
use crate::error::{CastRefusal, EngineError, EngineResult, TargetingFailure, TargetingViolation};
use crate::events::EngineEvent;
use crate::targeting::{
    Target, TargetCollection, TargetMacro, TargetingInput, TargetingNotice, TargetingSession,
};
use crate::types::{ActorId, CastId};

impl World {
    // ========================================================================
    // Public API
    // ========================================================================

    /// Starts a cast of `spell` by `caster`.
    ///
    /// The cast is constructed in Initialization. A busy caster or failing
    /// invoke conditions refuse it there: the refusal is published to the UI
    /// topic and returned as [`EngineError::Refused`], and no tick
    /// subscription is created. Otherwise the cast joins the caster's root
    /// context and proceeds straight into Targeting.
    pub fn begin_cast(&mut self, caster: ActorId, spell: Arc<dyn Spell>) -> EngineResult<CastId> {
        let Some(actor) = self.actors.get(&caster) else {
            return Err(CastRefusal::UnknownCaster(caster).into());
        };
        let root = actor.root_context();
        let identifier = actor.identifier().to_owned();

        let id = CastId(self.next_cast);
        self.next_cast += 1;
        let _span = info_span!("cast", cast = %id, spell = spell.name()).entered();

        let context = self
            .contexts
            .create(spell.name(), caster, &identifier, ContextKind::Cast(id));
        let cast = Cast::new(id, Arc::clone(&spell), caster, context);
        let cast_ref = cast.cast_ref();
        self.casts.insert(id, cast);
        self.publish(EngineEvent::StageEntered {
            cast: id,
            stage: CastStage::Initialization,
        });

        let refusal = if !self.actors.get(&caster).is_some_and(|a| a.alive) {
            Some(CastRefusal::CannotCast)
        } else if !self.actors.get(&caster).is_some_and(|a| a.can_cast()) {
            Some(CastRefusal::CasterBusy)
        } else if !spell.invoke_conditions().check(self, &cast_ref) {
            Some(CastRefusal::CannotCast)
        } else {
            None
        };
        if let Some(reason) = refusal {
            self.casts.remove(&id);
            self.contexts.remove(context);
            warn!(%caster, %reason, "cast refused");
            self.publish(EngineEvent::CastRefused {
                caster,
                spell: spell.name().to_owned(),
                reason,
            });
            return Err(reason.into());
        }

        self.contexts.add_child(root, context);
        if let Some(actor) = self.actors.get_mut(&caster) {
            actor.add_cast(id);
        }

        spell.effects().invoke.run(self, &cast_ref);
        if let Some(hooks) = spell.hooks() {
            hooks.on_invoke(self, &cast_ref);
        }
        if self.casts.contains_key(&id) {
            self.start_targeting(id)?;
        }
        Ok(id)
    }

    /// Flags a cast as interrupted. A pending targeting handshake fails as
    /// `Interrupted` and a wind-up goes to CastFail on the cast's next tick.
    pub fn interrupt_cast(&mut self, id: CastId) -> EngineResult<()> {
        let cast = self.casts.get_mut(&id).ok_or(EngineError::UnknownCast(id))?;
        trace!(cast = %id, stage = %cast.stage(), "interrupt requested");
        cast.interrupt();
        Ok(())
    }

    /// Routes selection input to a cast's pending target macro.
    ///
    /// Returns false when the cast has no pending macro. `Cancel` resolves the
    /// handshake as `Cancelled` without consulting the macro.
    pub fn submit_targeting_input(&mut self, id: CastId, input: TargetingInput) -> EngineResult<bool> {
        let cast = self.casts.get_mut(&id).ok_or(EngineError::UnknownCast(id))?;
        let Some(PendingTargeting {
            mut target_macro,
            mut session,
        }) = cast.targeting.take()
        else {
            return Ok(false);
        };

        let resolved = match input {
            TargetingInput::Cancel => session.targeting_failed(TargetingFailure::Cancelled),
            input => target_macro.on_input(self, &mut session, input),
        };
        if let Err(violation) = resolved {
            return Err(self.abort_targeting(id, violation));
        }

        self.settle_targeting(id, target_macro, session)?;
        Ok(true)
    }

    /// Appends a target to a cast directly.
    ///
    /// Fails with a protocol violation unless the cast is in Targeting and
    /// the spell's target form has room.
    pub fn add_cast_target(&mut self, id: CastId, target: Target) -> EngineResult<()> {
        let cast = self.casts.get_mut(&id).ok_or(EngineError::UnknownCast(id))?;
        cast.add_target(target)
            .map_err(|violation| EngineError::targeting(id, violation))
    }

    // ========================================================================
    // Targeting
    // ========================================================================

    fn start_targeting(&mut self, id: CastId) -> EngineResult<()> {
        self.enter_stage(id, CastStage::Targeting)?;
        let (spell, cast_ref) = self.cast_parts(id)?;
        let origin = self
            .actors
            .get(&cast_ref.context.source)
            .map(|a| a.position)
            .unwrap_or_default();

        let mut target_macro = spell.target_macro(&cast_ref);
        let mut session =
            TargetingSession::new(cast_ref, spell.target_form(), origin, spell.range());
        trace!(cast = %id, target_macro = target_macro.name(), "targeting");
        if let Err(violation) = target_macro.run(self, &mut session) {
            return Err(self.abort_targeting(id, violation));
        }
        self.settle_targeting(id, target_macro, session)
    }

    /// Per-tick poll of a pending macro.
    fn poll_targeting(&mut self, id: CastId) -> EngineResult<()> {
        let Some(cast) = self.casts.get_mut(&id) else {
            return Ok(());
        };
        let interrupted = cast.is_interrupted();
        let Some(PendingTargeting {
            mut target_macro,
            mut session,
        }) = cast.targeting.take()
        else {
            return Ok(());
        };

        let resolved = if interrupted {
            session.targeting_failed(TargetingFailure::Interrupted)
        } else {
            target_macro.poll(self, &mut session)
        };
        if let Err(violation) = resolved {
            return Err(self.abort_targeting(id, violation));
        }

        self.settle_targeting(id, target_macro, session)
    }

    /// Resolves a pending handshake as `Cancelled`.
    pub(super) fn cancel_targeting(&mut self, id: CastId) -> EngineResult<()> {
        let pending = self.casts.get_mut(&id).and_then(|c| c.targeting.take());
        match pending {
            Some(PendingTargeting {
                target_macro,
                mut session,
            }) => {
                if let Err(violation) = session.targeting_failed(TargetingFailure::Cancelled) {
                    return Err(self.abort_targeting(id, violation));
                }
                self.settle_targeting(id, target_macro, session)
            }
            None => self.targeting_failed(id, TargetingFailure::Cancelled),
        }
    }

    /// Acts on the session's outcome. A pending session is parked on the
    /// cast and polled every tick; a resolved one drops its macro.
    fn settle_targeting(
        &mut self,
        id: CastId,
        target_macro: Box<dyn TargetMacro>,
        mut session: TargetingSession,
    ) -> EngineResult<()> {
        for notice in session.take_notices() {
            match notice {
                TargetingNotice::OutOfRange { point } => {
                    self.publish(EngineEvent::TargetOutOfRange { cast: id, point });
                }
            }
        }

        match session.take_outcome() {
            None => {
                let Some(cast) = self.casts.get_mut(&id) else {
                    return Ok(());
                };
                cast.targeting = Some(PendingTargeting {
                    target_macro,
                    session,
                });
                if cast.subscription.is_none() {
                    cast.subscription = Some(self.bus.subscribe(TICK, TickHandle::Cast(id)));
                }
                Ok(())
            }
            Some(outcome) => {
                drop(target_macro);
                self.unsubscribe_cast(id);
                match outcome {
                    Ok(targets) => self.targeting_succeeded(id, targets),
                    Err(reason) => self.targeting_failed(id, reason),
                }
            }
        }
    }

    fn targeting_succeeded(&mut self, id: CastId, targets: TargetCollection) -> EngineResult<()> {
        let cast = self.casts.get_mut(&id).ok_or(EngineError::UnknownCast(id))?;
        if let Err(violation) = targets.iter().try_for_each(|target| cast.add_target(target)) {
            return Err(self.abort_targeting(id, violation));
        }
        let (spell, cast_ref) = self.cast_parts(id)?;
        debug!(cast = %id, targets = targets.len(), "targets acquired");

        if let Some(hooks) = spell.hooks() {
            hooks.on_targeting_done(self, &cast_ref);
        }
        if !self.casts.contains_key(&id) {
            return Ok(());
        }
        if spell.is_instant() {
            self.succeed_cast(id)
        } else {
            self.start_wind_up(id)
        }
    }

    /// Ends a cast whose macro broke the handshake protocol. The cast goes
    /// to TargetingFailed and is released before the violation is returned.
    fn abort_targeting(&mut self, id: CastId, violation: TargetingViolation) -> EngineError {
        warn!(cast = %id, %violation, "targeting protocol violation");
        if self.casts.get(&id).is_some_and(|c| c.stage() == CastStage::Targeting) {
            if let Err(error) = self.enter_stage(id, CastStage::TargetingFailed) {
                debug!(cast = %id, %error, "could not record targeting failure");
            }
        }
        self.release_cast(id);
        EngineError::targeting(id, violation)
    }

    fn targeting_failed(&mut self, id: CastId, reason: TargetingFailure) -> EngineResult<()> {
        self.enter_stage(id, CastStage::TargetingFailed)?;
        debug!(cast = %id, %reason, "targeting failed");
        self.publish(EngineEvent::TargetingFailed { cast: id, reason });
        self.release_cast(id);
        Ok(())
    }

    // ========================================================================
    // Wind-up
    // ========================================================================

    fn start_wind_up(&mut self, id: CastId) -> EngineResult<()> {
        self.enter_stage(id, CastStage::PreCasting)?;
        let (spell, cast_ref) = self.cast_parts(id)?;

        let (mut interrupts, position) = self
            .actors
            .get(&cast_ref.context.source)
            .map(|a| (a.interrupt_conditions().clone(), a.position))
            .unwrap_or_default();
        interrupts.extend_from(spell.interrupt_conditions());
        let now = self.now();
        if let Some(cast) = self.casts.get_mut(&id) {
            cast.begin_wind_up(now, position, interrupts);
        }

        spell.effects().cast_began.run(self, &cast_ref);
        if let Some(hooks) = spell.hooks() {
            hooks.on_cast_began(self, &cast_ref);
        }

        let Some(cast) = self.casts.get_mut(&id) else {
            return Ok(());
        };
        if cast.stage() != CastStage::PreCasting {
            return Ok(());
        }
        cast.subscription = Some(self.bus.subscribe(TICK, TickHandle::Cast(id)));
        self.enter_stage(id, CastStage::Casting)
    }

    pub(super) fn tick_cast(&mut self, id: CastId) -> EngineResult<()> {
        let Some(cast) = self.casts.get(&id) else {
            return Ok(());
        };
        let stage = cast.stage();
        let _span = info_span!("cast", cast = %id, spell = cast.spell().name()).entered();
        match stage {
            CastStage::Targeting => self.poll_targeting(id),
            CastStage::Casting => self.tick_casting(id),
            _ => Ok(()),
        }
    }

    fn tick_casting(&mut self, id: CastId) -> EngineResult<()> {
        let cast = self.casts.get(&id).ok_or(EngineError::UnknownCast(id))?;
        let cast_ref = cast.cast_ref();
        let interrupted = cast.is_interrupted() || {
            let interrupts = cast.interrupt_conditions().clone();
            interrupts.any(self, &cast_ref)
        };
        if interrupted {
            return self.fail_cast(id);
        }

        let now = self.now();
        let progress = cast.progress(now);
        if progress >= 100.0 {
            return self.succeed_cast(id);
        }

        let spell = Arc::clone(cast.spell());
        let interval = spell
            .casting_interval()
            .unwrap_or(self.config.default_casting_interval);
        let due = self
            .casts
            .get_mut(&id)
            .is_some_and(|c| c.take_casting_hook(now, interval));
        if due {
            spell.effects().casting.run(self, &cast_ref);
            if let Some(hooks) = spell.hooks() {
                hooks.on_casting(self, &cast_ref, progress);
            }
        }
        Ok(())
    }

    // ========================================================================
    // Terminal stages
    // ========================================================================

    pub(super) fn fail_cast(&mut self, id: CastId) -> EngineResult<()> {
        self.unsubscribe_cast(id);
        self.enter_stage(id, CastStage::CastFail)?;
        let (spell, cast_ref) = self.cast_parts(id)?;
        self.clear_active_cast(id);
        info!(cast = %id, spell = spell.name(), "cast failed");

        spell.effects().cast_failed.run(self, &cast_ref);
        if let Some(hooks) = spell.hooks() {
            hooks.on_cast_failed(self, &cast_ref);
        }
        self.publish(EngineEvent::CastInterrupted { cast: id });
        self.release_cast(id);
        Ok(())
    }

    fn succeed_cast(&mut self, id: CastId) -> EngineResult<()> {
        self.unsubscribe_cast(id);
        self.enter_stage(id, CastStage::CastSuccess)?;
        let (spell, cast_ref) = self.cast_parts(id)?;
        self.clear_active_cast(id);
        let targets = self
            .casts
            .get(&id)
            .map(|c| c.targets().clone())
            .ok_or(EngineError::UnknownCast(id))?;
        info!(cast = %id, spell = spell.name(), targets = targets.len(), "cast succeeded");

        if let Some(delivery) = spell.projectile() {
            spell.effects().cast_done.run(self, &cast_ref);
            if let Some(hooks) = spell.hooks() {
                hooks.on_cast_done(self, &cast_ref);
            }
            self.publish(EngineEvent::CastCompleted {
                cast: id,
                targets: targets.len(),
            });
            if !self.casts.contains_key(&id) {
                return Ok(());
            }
            let launched = self.launch_projectiles(id, delivery, &targets)?;
            if launched == 0 {
                self.finish_projectile_cast(id)?;
            }
            return Ok(());
        }

        spell
            .effects()
            .cast_done
            .run(self, &cast_ref)
            .run_targets(self, &cast_ref, &targets);
        if let Some(hooks) = spell.hooks() {
            hooks.on_cast_done(self, &cast_ref);
        }
        self.publish(EngineEvent::CastCompleted {
            cast: id,
            targets: targets.len(),
        });
        self.release_cast(id);
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    pub(super) fn cast_parts(&self, id: CastId) -> EngineResult<(Arc<dyn Spell>, CastRef)> {
        self.casts
            .get(&id)
            .map(|c| (Arc::clone(c.spell()), c.cast_ref()))
            .ok_or(EngineError::UnknownCast(id))
    }

    fn enter_stage(&mut self, id: CastId, stage: CastStage) -> EngineResult<()> {
        self.casts
            .get_mut(&id)
            .ok_or(EngineError::UnknownCast(id))?
            .enter(stage)?;
        self.publish(EngineEvent::StageEntered { cast: id, stage });
        Ok(())
    }

    fn unsubscribe_cast(&mut self, id: CastId) {
        if let Some(subscription) = self.casts.get_mut(&id).and_then(|c| c.subscription.take()) {
            self.bus.unsubscribe(subscription);
        }
    }

    fn clear_active_cast(&mut self, id: CastId) {
        let Some(caster) = self.casts.get(&id).map(Cast::caster) else {
            return;
        };
        if let Some(actor) = self.actors.get_mut(&caster) {
            actor.clear_cast(id);
        }
    }

    /// Drops the cast record and its context subtree.
    pub(super) fn release_cast(&mut self, id: CastId) {
        self.unsubscribe_cast(id);
        self.clear_active_cast(id);
        if let Some(cast) = self.casts.remove(&id) {
            self.contexts.remove(cast.context());
            trace!(cast = %id, history = ?cast.history(), "cast released");
        }
    }
}
