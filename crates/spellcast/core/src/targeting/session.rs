//! The targeting handshake: a single-use acquisition unit bound to one cast.
//!
//! The engine creates a [`TargetingSession`] when a cast enters Targeting,
//! hands it to the spell's [`TargetMacro`] and then polls it once per tick
//! until it is resolved. Resolution happens exactly once, through either
//! [`TargetingSession::complete`] or [`TargetingSession::targeting_failed`];
//! any further attempt is a protocol violation. When the owning cast is
//! interrupted or its context is destroyed the engine resolves the session as
//! a failure itself, so the handshake can never stay pending forever.

use crate::context::{AsCast, CastRef};
use crate::error::{TargetingFailure, TargetingViolation};
use crate::targeting::{Target, TargetCollection, TargetForm};
use crate::types::{ActorId, CastId, TargetableId, Vec3};
use crate::world::World;

/// External selection input routed to a pending macro.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetingInput {
    SelectPoint(Vec3),
    SelectActor(ActorId),
    SelectTargetable(TargetableId),
    /// Finish a plural selection with whatever has been selected so far.
    Confirm,
    /// Explicit user cancel. Always resolves the session as `Cancelled`.
    Cancel,
}

/// Non-terminal feedback produced while a session is pending.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TargetingNotice {
    OutOfRange { point: Vec3 },
}

#[derive(Clone, Debug, PartialEq)]
enum Resolution {
    Pending,
    Acquired,
    Failed(TargetingFailure),
    /// The outcome has been handed to the engine.
    Consumed,
}

/// State shared between one cast and its target macro.
#[derive(Debug)]
pub struct TargetingSession {
    cast: CastRef,
    origin: Vec3,
    range: Option<f32>,
    acquired: TargetCollection,
    resolution: Resolution,
    notices: Vec<TargetingNotice>,
}

impl TargetingSession {
    pub fn new(cast: CastRef, form: TargetForm, origin: Vec3, range: Option<f32>) -> Self {
        Self {
            cast,
            origin,
            range,
            acquired: TargetCollection::new(form),
            resolution: Resolution::Pending,
            notices: Vec::new(),
        }
    }

    pub fn cast(&self) -> &CastRef {
        &self.cast
    }

    pub fn cast_id(&self) -> CastId {
        self.cast.cast()
    }

    pub fn caster(&self) -> ActorId {
        self.cast.caster()
    }

    /// Caster position when targeting began.
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn range(&self) -> Option<f32> {
        self.range
    }

    pub fn form(&self) -> TargetForm {
        self.acquired.form()
    }

    pub fn acquired(&self) -> &TargetCollection {
        &self.acquired
    }

    /// True when `point` lies within the spell's range of the origin.
    pub fn in_range(&self, point: Vec3) -> bool {
        self.range
            .is_none_or(|range| self.origin.distance(point) <= range)
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution != Resolution::Pending
    }

    /// Target-selected callback. Adds a target to the pending selection.
    pub fn target_selected(&mut self, target: Target) -> Result<(), TargetingViolation> {
        self.ensure_pending()?;
        self.acquired.push(target)
    }

    /// Success callback. Resolves the session with the selected targets.
    pub fn complete(&mut self) -> Result<(), TargetingViolation> {
        self.ensure_pending()?;
        self.resolution = Resolution::Acquired;
        Ok(())
    }

    /// Shorthand for selecting one target and completing.
    pub fn complete_with(&mut self, target: Target) -> Result<(), TargetingViolation> {
        self.target_selected(target)?;
        self.complete()
    }

    /// Targeting-failed callback. Resolves the session as a failure.
    pub fn targeting_failed(&mut self, reason: TargetingFailure) -> Result<(), TargetingViolation> {
        self.ensure_pending()?;
        self.resolution = Resolution::Failed(reason);
        Ok(())
    }

    /// Records a rejected selection without resolving the session.
    pub fn notice(&mut self, notice: TargetingNotice) {
        self.notices.push(notice);
    }

    pub(crate) fn take_notices(&mut self) -> Vec<TargetingNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Hands the outcome to the engine once. Later calls return `None`.
    pub(crate) fn take_outcome(&mut self) -> Option<Result<TargetCollection, TargetingFailure>> {
        let form = self.acquired.form();
        let outcome = match self.resolution {
            Resolution::Pending | Resolution::Consumed => return None,
            Resolution::Acquired => Ok(std::mem::replace(
                &mut self.acquired,
                TargetCollection::new(form),
            )),
            Resolution::Failed(reason) => Err(reason),
        };
        self.resolution = Resolution::Consumed;
        Some(outcome)
    }

    fn ensure_pending(&self) -> Result<(), TargetingViolation> {
        if self.is_resolved() {
            Err(TargetingViolation::AlreadyResolved)
        } else {
            Ok(())
        }
    }
}

/// Content-provided target acquisition for one cast.
///
/// `run` is called once when targeting starts. A macro that needs more time
/// (waiting for input, scanning over several frames) leaves the session
/// pending; the engine then calls `poll` every tick and forwards selection
/// input to `on_input` until the session resolves. The macro is dropped right
/// after resolution.
pub trait TargetMacro: Send {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn run(
        &mut self,
        world: &World,
        session: &mut TargetingSession,
    ) -> Result<(), TargetingViolation>;

    fn poll(
        &mut self,
        _world: &World,
        _session: &mut TargetingSession,
    ) -> Result<(), TargetingViolation> {
        Ok(())
    }

    /// Selection input. `Cancel` never reaches the macro.
    fn on_input(
        &mut self,
        _world: &World,
        _session: &mut TargetingSession,
        _input: TargetingInput,
    ) -> Result<(), TargetingViolation> {
        Ok(())
    }
}
