//! Stock target macros.
//!
//! [`SelfTarget`] and [`NearestActors`] resolve inside `run`. [`PointSelect`]
//! and [`ActorSelect`] wait for selection input routed through
//! `World::submit_targeting_input` and stay pending until the selection is
//! complete.

use tracing::debug;

use spellcast_core::{
    ActorId, Target, TargetForm, TargetMacro, TargetingFailure, TargetingInput, TargetingNotice,
    TargetingSession, TargetingViolation, Vec3, World,
};

/// Targets the caster.
#[derive(Clone, Copy, Debug, Default)]
pub struct SelfTarget;

impl TargetMacro for SelfTarget {
    fn name(&self) -> &str {
        "self_target"
    }

    fn run(&mut self, _world: &World, session: &mut TargetingSession) -> Result<(), TargetingViolation> {
        session.complete_with(Target::Actor(session.caster()))
    }
}

/// Picks the closest targetable actors other than the caster, within range.
///
/// Singular spells take one actor; plural spells take up to `count`. Fails
/// with `NotFound` when nobody qualifies.
#[derive(Clone, Copy, Debug)]
pub struct NearestActors {
    pub count: usize,
}

impl NearestActors {
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

impl TargetMacro for NearestActors {
    fn name(&self) -> &str {
        "nearest_actors"
    }

    fn run(&mut self, world: &World, session: &mut TargetingSession) -> Result<(), TargetingViolation> {
        let origin = session.origin();
        let mut candidates: Vec<(f32, ActorId)> = world
            .actors()
            .filter(|a| a.id() != session.caster())
            .filter(|a| world.is_actor_targetable(a.id()))
            .filter(|a| session.in_range(a.position))
            .map(|a| (origin.distance(a.position), a.id()))
            .collect();

        if candidates.is_empty() {
            return session.targeting_failed(TargetingFailure::NotFound);
        }

        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        let take = match session.form() {
            TargetForm::Singular => 1,
            TargetForm::Plural => self.count.max(1),
        };
        for (_, actor) in candidates.into_iter().take(take) {
            session.target_selected(Target::Actor(actor))?;
        }
        session.complete()
    }
}

/// Shared input handling for the interactive macros.
fn accept(session: &mut TargetingSession, target: Target) -> Result<(), TargetingViolation> {
    match session.form() {
        TargetForm::Singular => session.complete_with(target),
        TargetForm::Plural => session.target_selected(target),
    }
}

fn confirm(session: &mut TargetingSession) -> Result<(), TargetingViolation> {
    if session.acquired().is_empty() {
        session.targeting_failed(TargetingFailure::NotFound)
    } else {
        session.complete()
    }
}

/// Waits for point selections. Points beyond the spell's range are rejected
/// with an out-of-range notice and the session stays pending.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointSelect;

impl TargetMacro for PointSelect {
    fn name(&self) -> &str {
        "point_select"
    }

    fn run(&mut self, _world: &World, _session: &mut TargetingSession) -> Result<(), TargetingViolation> {
        Ok(())
    }

    fn on_input(
        &mut self,
        _world: &World,
        session: &mut TargetingSession,
        input: TargetingInput,
    ) -> Result<(), TargetingViolation> {
        match input {
            TargetingInput::SelectPoint(point) if session.in_range(point) => {
                accept(session, Target::Point(point))
            }
            TargetingInput::SelectPoint(point) => {
                debug!(cast = %session.cast_id(), %point, "point out of range");
                session.notice(TargetingNotice::OutOfRange { point });
                Ok(())
            }
            TargetingInput::Confirm => confirm(session),
            _ => Ok(()),
        }
    }
}

/// Waits for actor selections. Untargetable actors are ignored; actors out of
/// range produce an out-of-range notice at their position.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActorSelect;

impl ActorSelect {
    fn position(world: &World, actor: ActorId) -> Option<Vec3> {
        world
            .is_actor_targetable(actor)
            .then(|| world.actor(actor).map(|a| a.position))
            .flatten()
    }
}

impl TargetMacro for ActorSelect {
    fn name(&self) -> &str {
        "actor_select"
    }

    fn run(&mut self, _world: &World, _session: &mut TargetingSession) -> Result<(), TargetingViolation> {
        Ok(())
    }

    fn on_input(
        &mut self,
        world: &World,
        session: &mut TargetingSession,
        input: TargetingInput,
    ) -> Result<(), TargetingViolation> {
        match input {
            TargetingInput::SelectActor(actor) => match Self::position(world, actor) {
                Some(point) if session.in_range(point) => accept(session, Target::Actor(actor)),
                Some(point) => {
                    session.notice(TargetingNotice::OutOfRange { point });
                    Ok(())
                }
                None => Ok(()),
            },
            TargetingInput::Confirm => confirm(session),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spellcast_core::{
        CastId, CastRef, CharacterSpec, ContextRef, EngineConfig,
    };

    fn world() -> (World, ActorId) {
        let mut world = World::new(EngineConfig::default());
        let caster = world.spawn_actor(CharacterSpec::new("caster"));
        world.spawn_actor(CharacterSpec::new("far").at(Vec3::new(8.0, 0.0, 0.0)));
        world.spawn_actor(CharacterSpec::new("near").at(Vec3::new(2.0, 0.0, 0.0)));
        world.spawn_actor(CharacterSpec::new("away").at(Vec3::new(40.0, 0.0, 0.0)));
        (world, caster)
    }

    fn session(world: &World, caster: ActorId, form: TargetForm) -> TargetingSession {
        let cast = CastRef {
            context: ContextRef {
                id: world.actor(caster).unwrap().root_context(),
                source: caster,
            },
            cast: CastId(0),
        };
        TargetingSession::new(cast, form, Vec3::ZERO, Some(10.0))
    }

    fn named(world: &World, name: &str) -> ActorId {
        world.find_actor(name).unwrap().id()
    }

    #[test]
    fn nearest_orders_by_distance_and_respects_range() {
        let (world, caster) = world();
        let mut session = session(&world, caster, TargetForm::Plural);
        NearestActors::new(5).run(&world, &mut session).unwrap();

        assert!(session.is_resolved());
        assert_eq!(
            session.acquired().actors(),
            &[named(&world, "near"), named(&world, "far")]
        );
    }

    #[test]
    fn nearest_fails_when_nobody_qualifies() {
        let mut world = World::new(EngineConfig::default());
        let caster = world.spawn_actor(CharacterSpec::new("alone"));
        let mut session = session(&world, caster, TargetForm::Singular);
        NearestActors::new(1).run(&world, &mut session).unwrap();
        assert!(session.is_resolved());
        assert!(session.acquired().is_empty());
    }

    #[test]
    fn point_select_keeps_waiting_after_out_of_range() {
        let (world, caster) = world();
        let mut session = session(&world, caster, TargetForm::Singular);
        let mut select = PointSelect;
        select.run(&world, &mut session).unwrap();

        select
            .on_input(&world, &mut session, TargetingInput::SelectPoint(Vec3::new(30.0, 0.0, 0.0)))
            .unwrap();
        assert!(!session.is_resolved());

        select
            .on_input(&world, &mut session, TargetingInput::SelectPoint(Vec3::new(3.0, 0.0, 0.0)))
            .unwrap();
        assert!(session.is_resolved());
        assert_eq!(session.acquired().points(), &[Vec3::new(3.0, 0.0, 0.0)]);
    }

    #[test]
    fn actor_select_confirms_plural_selection() {
        let (mut world, caster) = world();
        let near = named(&world, "near");
        let far = named(&world, "far");
        let away = named(&world, "away");
        world.actor_mut(far).unwrap().targetable = false;

        let mut session = session(&world, caster, TargetForm::Plural);
        let mut select = ActorSelect;
        for actor in [near, far, away] {
            select
                .on_input(&world, &mut session, TargetingInput::SelectActor(actor))
                .unwrap();
        }
        assert!(!session.is_resolved());
        select
            .on_input(&world, &mut session, TargetingInput::Confirm)
            .unwrap();

        assert!(session.is_resolved());
        assert_eq!(session.acquired().actors(), &[near]);
    }
}
