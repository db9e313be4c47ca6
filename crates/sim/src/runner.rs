//! Scenario replay against a world.

use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info, warn};

use spellcast_content::{ContentLibrary, IsAlive, Not, ScenarioAction, ScenarioDef};
use spellcast_core::{
    ActorId, AttributeCollection, AttributeKind, BuffVisibility, CastId, CharacterSpec,
    ConditionCollection, EngineConfig, EngineError, EngineEvent, TargetingInput, Topic, Vec3,
    World,
};

/// Counts of what happened during a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub casts_started: usize,
    pub casts_refused: usize,
    pub casts_completed: usize,
    pub casts_interrupted: usize,
    pub ui_events: usize,
}

pub struct Runner {
    world: World,
    library: ContentLibrary,
    scenario: ScenarioDef,
    names: BTreeMap<String, ActorId>,
    stats: RunStats,
}

impl Runner {
    /// Spawns the scenario's actors. Every actor's casts are interrupted when
    /// it dies.
    pub fn new(config: EngineConfig, library: ContentLibrary, scenario: ScenarioDef) -> Result<Self> {
        let mut world = World::new(config);
        let mut names = BTreeMap::new();

        for actor in &scenario.actors {
            if names.contains_key(&actor.name) {
                bail!("duplicate actor `{}` in scenario", actor.name);
            }
            let attributes = actor
                .attributes
                .iter()
                .fold(AttributeCollection::new(), |acc, (kind, value)| {
                    acc.with(*kind, *value)
                });
            let (x, y, z) = actor.position;
            let id = world.spawn_actor(
                CharacterSpec::new(actor.name.clone())
                    .at(Vec3::new(x, y, z))
                    .with_attributes(attributes)
                    .with_interrupts(ConditionCollection::new().with(Not::new(IsAlive))),
            );
            names.insert(actor.name.clone(), id);
        }

        Ok(Self {
            world,
            library,
            scenario,
            names,
            stats: RunStats::default(),
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Replays `frames` frames: scripted actions first, then one tick.
    pub fn run(&mut self, frames: u64) -> Result<RunStats> {
        for frame in 0..frames {
            let actions: Vec<ScenarioAction> = self.scenario.steps_at(frame).cloned().collect();
            for action in &actions {
                self.apply(frame, action)
                    .with_context(|| format!("frame {frame}: {action:?}"))?;
            }
            self.world.step()?;
            self.report(frame);
            self.stats.frames = frame + 1;
        }
        Ok(self.stats.clone())
    }

    fn actor(&self, name: &str) -> Result<ActorId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("unknown actor `{name}`"))
    }

    fn active_cast(&self, caster: ActorId) -> Option<CastId> {
        self.world
            .actor(caster)
            .and_then(|a| a.active_casts().first().copied())
    }

    fn apply(&mut self, frame: u64, action: &ScenarioAction) -> Result<()> {
        match action {
            ScenarioAction::Cast { caster, spell } => {
                let caster = self.actor(caster)?;
                let definition = self
                    .library
                    .spell(spell)
                    .ok_or_else(|| anyhow!("unknown spell `{spell}`"))?;
                match self.world.begin_cast(caster, definition) {
                    Ok(cast) => {
                        self.stats.casts_started += 1;
                        info!(frame, %caster, %cast, spell = %spell, "cast started");
                    }
                    Err(EngineError::Refused(reason)) => {
                        warn!(frame, %caster, spell = %spell, %reason, "cast refused");
                    }
                    Err(error) => return Err(error.into()),
                }
            }
            ScenarioAction::SelectPoint { caster, point } => {
                let (x, y, z) = *point;
                self.submit(frame, caster, TargetingInput::SelectPoint(Vec3::new(x, y, z)))?;
            }
            ScenarioAction::SelectActor { caster, target } => {
                let target = self.actor(target)?;
                self.submit(frame, caster, TargetingInput::SelectActor(target))?;
            }
            ScenarioAction::Confirm { caster } => {
                self.submit(frame, caster, TargetingInput::Confirm)?;
            }
            ScenarioAction::Cancel { caster } => {
                self.submit(frame, caster, TargetingInput::Cancel)?;
            }
            ScenarioAction::Interrupt { caster } => {
                let caster = self.actor(caster)?;
                if let Some(cast) = self.active_cast(caster) {
                    self.world.interrupt_cast(cast)?;
                }
            }
            ScenarioAction::Move { actor, to } => {
                let id = self.actor(actor)?;
                let (x, y, z) = *to;
                if let Some(character) = self.world.actor_mut(id) {
                    character.position = Vec3::new(x, y, z);
                }
            }
            ScenarioAction::Despawn { actor } => {
                let id = self.actor(actor)?;
                self.world.despawn_actor(id)?;
                self.names.remove(actor);
                info!(frame, %id, "actor despawned");
            }
        }
        Ok(())
    }

    fn submit(&mut self, frame: u64, caster: &str, input: TargetingInput) -> Result<()> {
        let caster = self.actor(caster)?;
        let Some(cast) = self.active_cast(caster) else {
            warn!(frame, %caster, ?input, "no active cast for input");
            return Ok(());
        };
        if !self.world.submit_targeting_input(cast, input)? {
            debug!(frame, %cast, ?input, "input arrived after targeting ended");
        }
        Ok(())
    }

    fn report(&mut self, frame: u64) {
        for event in self.world.events_mut().drain() {
            match event {
                EngineEvent::CastRefused { .. } => self.stats.casts_refused += 1,
                EngineEvent::CastCompleted { .. } => self.stats.casts_completed += 1,
                EngineEvent::CastInterrupted { .. } => self.stats.casts_interrupted += 1,
                _ => {}
            }
            match event.topic() {
                Topic::Ui => {
                    self.stats.ui_events += 1;
                    println!("[{frame:>5}] {}", self.describe(&event));
                }
                Topic::Trace => debug!(frame, ?event, "trace event"),
            }
        }
    }

    fn name(&self, actor: ActorId) -> String {
        self.world
            .actor(actor)
            .map(|a| a.name().to_owned())
            .unwrap_or_else(|| actor.to_string())
    }

    fn describe(&self, event: &EngineEvent) -> String {
        match event {
            EngineEvent::CastRefused {
                caster,
                spell,
                reason,
            } => format!("{} cannot cast {spell}: {reason}", self.name(*caster)),
            EngineEvent::TargetingFailed { cast, reason } => {
                format!("{cast}: targeting failed ({reason})")
            }
            EngineEvent::TargetOutOfRange { cast, point } => {
                format!("{cast}: {point} is out of range")
            }
            EngineEvent::CastInterrupted { cast } => format!("{cast}: interrupted"),
            EngineEvent::CastCompleted { cast, targets } => {
                format!("{cast}: completed on {targets} target(s)")
            }
            EngineEvent::BuffAttached {
                owner, identity, ..
            } => format!("{} gains {identity}", self.name(*owner)),
            EngineEvent::BuffStacked {
                owner,
                identity,
                stacks,
            } => format!("{} {identity} x{stacks}", self.name(*owner)),
            EngineEvent::BuffExpired { owner, identity } => {
                format!("{} loses {identity}", self.name(*owner))
            }
            EngineEvent::BuffTerminated { owner, identity } => {
                format!("{} {identity} dispelled", self.name(*owner))
            }
            other => format!("{other:?}"),
        }
    }

    pub fn print_summary(&self) {
        println!("--- after {} frames ({:.2}s) ---", self.stats.frames, self.world.now().seconds());
        for actor in self.world.actors() {
            let buffs: Vec<&str> = [BuffVisibility::Visible, BuffVisibility::Hidden]
                .into_iter()
                .flat_map(|v| actor.buffs(v).identities())
                .collect();
            println!(
                "{:<8} health {:>6.1}  mana {:>6.1}  armor {:>5.1}  buffs {:?}",
                actor.name(),
                actor.attribute(AttributeKind::Health),
                actor.attribute(AttributeKind::Mana),
                actor.attribute(AttributeKind::Armor),
                buffs
            );
        }
    }
}
