//! The world: owner of every actor, cast, buff and projectile, and the single
//! place state transitions happen.
//!
//! Callers drive it with [`World::tick`]. Each tick advances the clock and
//! broadcasts the tick topic on the world's [`TickBus`]; the handles
//! subscribed at that moment are dispatched in subscription order, each
//! running to completion before the next. A handle that was unsubscribed by
//! an earlier handler in the same tick is skipped.
//!
//! Cancellation is cooperative. [`World::interrupt_cast`] and
//! [`World::terminate_buff`] only set a flag; the teardown happens the next
//! time the tick reaches that entity.

mod buffs;
mod casts;
mod projectiles;

pub use buffs::BuffAttach;

use std::collections::BTreeMap;

use tracing::{debug, trace_span};

use crate::actor::{Character, CharacterSpec, SceneObject};
use crate::buff::{BuffKey, BuffVisibility};
use crate::bus::{TICK, TickBus};
use crate::cast::{Cast, CastStage};
use crate::config::EngineConfig;
use crate::context::{ContextKind, ContextTree};
use crate::error::{EngineError, EngineResult};
use crate::events::{EngineEvent, EventLog};
use crate::projectile::Projectile;
use crate::targeting::Target;
use crate::types::{ActorId, CastId, GameTime, ProjectileId, TargetableId, Vec3};

/// What a tick subscription stands for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TickHandle {
    Cast(CastId),
    Buff(BuffKey),
    Projectile(ProjectileId),
}

pub struct World {
    config: EngineConfig,
    clock: GameTime,
    last_delta: f64,
    contexts: ContextTree,
    bus: TickBus<TickHandle>,
    events: EventLog,
    actors: BTreeMap<ActorId, Character>,
    objects: BTreeMap<TargetableId, SceneObject>,
    casts: BTreeMap<CastId, Cast>,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    next_actor: u64,
    next_object: u64,
    next_cast: u64,
    next_projectile: u64,
}

impl World {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            last_delta: config.frame_delta,
            config,
            clock: GameTime::ZERO,
            contexts: ContextTree::new(),
            bus: TickBus::new(),
            events: EventLog::new(),
            actors: BTreeMap::new(),
            objects: BTreeMap::new(),
            casts: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            next_actor: 0,
            next_object: 0,
            next_cast: 0,
            next_projectile: 0,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> GameTime {
        self.clock
    }

    pub fn contexts(&self) -> &ContextTree {
        &self.contexts
    }

    pub fn bus(&self) -> &TickBus<TickHandle> {
        &self.bus
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    pub fn actor(&self, id: ActorId) -> Option<&Character> {
        self.actors.get(&id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Character> {
        self.actors.get_mut(&id)
    }

    pub fn actors(&self) -> impl Iterator<Item = &Character> {
        self.actors.values()
    }

    pub fn find_actor(&self, name: &str) -> Option<&Character> {
        self.actors.values().find(|a| a.name() == name)
    }

    pub fn object(&self, id: TargetableId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: TargetableId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    pub fn cast(&self, id: CastId) -> Option<&Cast> {
        self.casts.get(&id)
    }

    pub fn casts(&self) -> impl Iterator<Item = &Cast> {
        self.casts.values()
    }

    pub fn projectile(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.values()
    }

    /// Current position of a target, if it still exists.
    pub fn target_position(&self, target: &Target) -> Option<Vec3> {
        match *target {
            Target::Point(point) => Some(point),
            Target::Targetable(id) => self.objects.get(&id).map(|o| o.position),
            Target::Actor(id) => self.actors.get(&id).map(|a| a.position),
        }
    }

    // ========================================================================
    // Clock
    // ========================================================================

    /// Runs one tick of `dt` seconds.
    ///
    /// Returns the first protocol violation or engine error raised by a
    /// handler. Handlers after the failing one do not run this tick.
    pub fn tick(&mut self, dt: f64) -> EngineResult<()> {
        let dt = dt.max(0.0);
        self.clock = self.clock + dt;
        self.last_delta = dt;
        let _span = trace_span!("tick", now = %self.clock).entered();

        for (subscription, handle) in self.bus.broadcast(TICK) {
            if !self.bus.is_subscribed(subscription) {
                continue;
            }
            match handle {
                TickHandle::Cast(id) => self.tick_cast(id)?,
                TickHandle::Buff(key) => self.tick_buff(&key)?,
                TickHandle::Projectile(id) => self.tick_projectile(id)?,
            }
        }
        Ok(())
    }

    /// Runs one tick of the configured frame delta.
    pub fn step(&mut self) -> EngineResult<()> {
        self.tick(self.config.frame_delta)
    }

    /// Moves the clock without broadcasting the tick.
    pub fn advance_clock(&mut self, dt: f64) {
        self.clock = self.clock + dt.max(0.0);
    }

    // ========================================================================
    // Actors and objects
    // ========================================================================

    pub fn spawn_actor(&mut self, spec: CharacterSpec) -> ActorId {
        let id = ActorId(self.next_actor);
        self.next_actor += 1;
        let root = self
            .contexts
            .create("root", id, &spec.name, ContextKind::Actor);
        debug!(actor = %id, name = %spec.name, "spawned actor");
        self.actors.insert(id, Character::new(id, root, spec));
        id
    }

    pub fn spawn_object(&mut self, label: impl Into<String>, position: Vec3) -> TargetableId {
        let id = TargetableId(self.next_object);
        self.next_object += 1;
        self.objects.insert(
            id,
            SceneObject {
                id,
                label: label.into(),
                position,
                targetable: true,
            },
        );
        id
    }

    pub fn remove_object(&mut self, id: TargetableId) -> Option<SceneObject> {
        self.objects.remove(&id)
    }

    /// Removes an actor and everything its root context owns.
    ///
    /// Pending target macros resolve as `Cancelled`, casts in their wind-up
    /// fail, in-flight projectiles are collected and buffs are dropped without
    /// running their terminal effects.
    pub fn despawn_actor(&mut self, id: ActorId) -> EngineResult<()> {
        let root = self
            .actors
            .get(&id)
            .map(|a| a.root_context())
            .ok_or(EngineError::UnknownActor(id))?;
        let _span = trace_span!("despawn", actor = %id).entered();

        if let Some(actor) = self.actors.get_mut(&id) {
            actor.alive = false;
        }

        let owned: Vec<CastId> = self
            .casts
            .values()
            .filter(|c| c.caster() == id)
            .map(Cast::id)
            .collect();
        for cast in owned {
            self.abandon_cast(cast)?;
        }

        if let Some(actor) = self.actors.get_mut(&id) {
            let (visible, hidden) = actor.take_buffs();
            for buff in visible.iter().chain(hidden.iter()) {
                if let Some(subscription) = buff.subscription {
                    self.bus.unsubscribe(subscription);
                }
            }
        }

        let removed = self.contexts.remove(root);
        debug!(actor = %id, contexts = removed.len(), "despawned actor");
        self.actors.remove(&id);
        Ok(())
    }

    /// Drives a cast owned by a disappearing actor to a terminal state.
    fn abandon_cast(&mut self, id: CastId) -> EngineResult<()> {
        let Some(cast) = self.casts.get(&id) else {
            return Ok(());
        };
        match cast.stage() {
            CastStage::Targeting => self.cancel_targeting(id),
            CastStage::PreCasting | CastStage::Casting => self.fail_cast(id),
            CastStage::CastSuccess => {
                let projectiles: Vec<ProjectileId> = self
                    .projectiles
                    .values()
                    .filter(|p| p.cast() == id)
                    .map(Projectile::id)
                    .collect();
                for projectile in projectiles {
                    self.collect_projectile(projectile)?;
                }
                // Nothing left in flight; finish anyway in case the counter
                // never got a projectile to count down.
                if self.casts.contains_key(&id) {
                    self.finish_projectile_cast(id)?;
                }
                Ok(())
            }
            _ => {
                self.release_cast(id);
                Ok(())
            }
        }
    }

    pub(crate) fn publish(&mut self, event: EngineEvent) {
        self.events.publish(event);
    }

    /// True when an actor exists, is alive and accepts being targeted.
    pub fn is_actor_targetable(&self, id: ActorId) -> bool {
        self.actors
            .get(&id)
            .is_some_and(|a| a.alive && a.targetable)
    }

    /// Snapshot of every buff key on an actor, visible container first.
    pub fn buff_keys(&self, owner: ActorId) -> Vec<BuffKey> {
        let Some(actor) = self.actors.get(&owner) else {
            return Vec::new();
        };
        [BuffVisibility::Visible, BuffVisibility::Hidden]
            .into_iter()
            .flat_map(|visibility| {
                actor
                    .buffs(visibility)
                    .identities()
                    .map(move |identity| BuffKey {
                        owner,
                        visibility,
                        identity: identity.to_owned(),
                    })
            })
            .collect()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("clock", &self.clock)
            .field("actors", &self.actors.len())
            .field("casts", &self.casts.len())
            .field("projectiles", &self.projectiles.len())
            .field("contexts", &self.contexts.len())
            .field("subscriptions", &self.bus.len())
            .finish()
    }
}
