//! The cast state machine's data: stages, the per-cast record and the spell
//! interfaces it drives. The transitions themselves live on
//! [`crate::world::World`], which owns every cast.

mod spell;
mod stage;

pub use spell::{CastHooks, Spell, SpellEffects};
pub use stage::CastStage;

use std::fmt;
use std::sync::Arc;

use crate::bus::SubscriptionId;
use crate::context::{CastRef, ContextRef};
use crate::error::{EngineError, EngineResult, TargetingViolation};
use crate::rules::ConditionCollection;
use crate::targeting::{Target, TargetCollection, TargetMacro, TargetingSession};
use crate::types::{ActorId, CastId, ContextId, GameTime, Vec3};

/// A target macro waiting for input or for more ticks.
pub(crate) struct PendingTargeting {
    pub target_macro: Box<dyn TargetMacro>,
    pub session: TargetingSession,
}

/// One use of a spell by an actor.
pub struct Cast {
    id: CastId,
    spell: Arc<dyn Spell>,
    caster: ActorId,
    context: ContextId,
    stage: CastStage,
    history: Vec<CastStage>,
    targets: TargetCollection,
    begin_time: Option<GameTime>,
    begin_position: Option<Vec3>,
    last_casting_hook: Option<GameTime>,
    interrupts: ConditionCollection<CastRef>,
    interrupted: bool,
    outstanding_projectiles: usize,
    pub(crate) subscription: Option<SubscriptionId>,
    pub(crate) targeting: Option<PendingTargeting>,
}

impl Cast {
    /// Constructs the record directly in `Initialization`.
    pub(crate) fn new(id: CastId, spell: Arc<dyn Spell>, caster: ActorId, context: ContextId) -> Self {
        let form = spell.target_form();
        Self {
            id,
            spell,
            caster,
            context,
            stage: CastStage::Initialization,
            history: vec![CastStage::Initialization],
            targets: TargetCollection::new(form),
            begin_time: None,
            begin_position: None,
            last_casting_hook: None,
            interrupts: ConditionCollection::new(),
            interrupted: false,
            outstanding_projectiles: 0,
            subscription: None,
            targeting: None,
        }
    }

    pub fn id(&self) -> CastId {
        self.id
    }

    pub fn spell(&self) -> &Arc<dyn Spell> {
        &self.spell
    }

    pub fn caster(&self) -> ActorId {
        self.caster
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn cast_ref(&self) -> CastRef {
        CastRef {
            context: ContextRef {
                id: self.context,
                source: self.caster,
            },
            cast: self.id,
        }
    }

    pub fn stage(&self) -> CastStage {
        self.stage
    }

    /// Every stage entered so far, in order.
    pub fn history(&self) -> &[CastStage] {
        &self.history
    }

    pub fn targets(&self) -> &TargetCollection {
        &self.targets
    }

    pub fn begin_time(&self) -> Option<GameTime> {
        self.begin_time
    }

    pub fn begin_position(&self) -> Option<Vec3> {
        self.begin_position
    }

    /// The interrupt set captured when the wind-up began.
    pub fn interrupt_conditions(&self) -> &ConditionCollection<CastRef> {
        &self.interrupts
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn is_targeting_pending(&self) -> bool {
        self.targeting.is_some()
    }

    pub fn outstanding_projectiles(&self) -> usize {
        self.outstanding_projectiles
    }

    /// Completion percentage of the wind-up at `now`.
    pub fn progress(&self, now: GameTime) -> f64 {
        let duration = self.spell.cast_duration();
        match self.begin_time {
            _ if duration <= 0.0 => 100.0,
            Some(begin) => now.since(begin) / duration * 100.0,
            None => 0.0,
        }
    }

    /// Appends an acquired target. Only legal while targeting.
    pub fn add_target(&mut self, target: Target) -> Result<(), TargetingViolation> {
        if self.stage != CastStage::Targeting {
            return Err(TargetingViolation::StageClosed { stage: self.stage });
        }
        self.targets.push(target)
    }

    /// Moves along the transition graph.
    pub(crate) fn enter(&mut self, next: CastStage) -> EngineResult<()> {
        if !self.stage.can_transition_to(next) {
            return Err(EngineError::InvalidTransition {
                cast: self.id,
                from: self.stage,
                to: next,
            });
        }
        tracing::debug!(cast = %self.id, from = %self.stage, to = %next, "stage");
        self.stage = next;
        self.history.push(next);
        Ok(())
    }

    pub(crate) fn interrupt(&mut self) {
        self.interrupted = true;
    }

    pub(crate) fn begin_wind_up(
        &mut self,
        now: GameTime,
        position: Vec3,
        interrupts: ConditionCollection<CastRef>,
    ) {
        self.begin_time = Some(now);
        self.begin_position = Some(position);
        self.last_casting_hook = Some(now);
        self.interrupts = interrupts;
    }

    /// Whether the casting hook is due at `now`. Records the call when it is.
    pub(crate) fn take_casting_hook(&mut self, now: GameTime, interval: f64) -> bool {
        let due = self
            .last_casting_hook
            .is_none_or(|last| now.since(last) >= interval);
        if due {
            self.last_casting_hook = Some(now);
        }
        due
    }

    pub(crate) fn set_outstanding_projectiles(&mut self, count: usize) {
        self.outstanding_projectiles = count;
    }

    /// Decrements the projectile counter and returns what is left.
    pub(crate) fn projectile_collected(&mut self) -> usize {
        self.outstanding_projectiles = self.outstanding_projectiles.saturating_sub(1);
        self.outstanding_projectiles
    }
}

impl fmt::Debug for Cast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cast")
            .field("id", &self.id)
            .field("spell", &self.spell.name())
            .field("caster", &self.caster)
            .field("stage", &self.stage)
            .field("targets", &self.targets.len())
            .field("interrupted", &self.interrupted)
            .finish()
    }
}
