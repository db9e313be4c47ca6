//! Minimal content used by the integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use spellcast_core::{
    ActorId, BuffDefinition, BuffEffects, BuffRef, CastHooks, CastId, CastRef, CastStage,
    CharacterSpec, ConditionCollection, Effect, EngineConfig, EngineEvent, HitRef,
    ProjectileDelivery, ProjectileRef, Spell, SpellEffects, StackBehavior, StraightLine, Target,
    TargetForm, TargetMacro, TargetableId, TargetingFailure, TargetingInput, TargetingSession,
    TargetingViolation, Vec3, World,
};

pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::default()
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

pub fn world() -> World {
    World::new(EngineConfig::default().with_frame_delta(0.1))
}

pub fn spawn(world: &mut World, name: &str, x: f32) -> ActorId {
    world.spawn_actor(CharacterSpec::new(name).at(Vec3::new(x, 0.0, 0.0)))
}

/// Stages entered by `cast`, in order, read back from the event log.
pub fn stages(world: &World, cast: CastId) -> Vec<CastStage> {
    world
        .events()
        .iter()
        .filter_map(|event| match event {
            EngineEvent::StageEntered { cast: c, stage } if *c == cast => Some(*stage),
            _ => None,
        })
        .collect()
}

/// Ticks the world until `done` holds or `limit` ticks have run.
pub fn run_until(world: &mut World, limit: usize, done: impl Fn(&World) -> bool) {
    for _ in 0..limit {
        if done(world) {
            return;
        }
        world.step().expect("tick");
    }
}

// ============================================================================
// Target macros
// ============================================================================

#[derive(Clone, Debug)]
pub enum Acquire {
    /// Selects the listed targets and completes inside `run`.
    Fixed(Vec<Target>),
    /// Fails with `NotFound` inside `run`.
    NotFound,
    /// Waits for selection input.
    AwaitInput,
}

struct ScriptedMacro {
    plan: Acquire,
}

impl TargetMacro for ScriptedMacro {
    fn run(&mut self, _world: &World, session: &mut TargetingSession) -> Result<(), TargetingViolation> {
        match &self.plan {
            Acquire::Fixed(targets) => {
                for target in targets {
                    session.target_selected(*target)?;
                }
                session.complete()
            }
            Acquire::NotFound => session.targeting_failed(TargetingFailure::NotFound),
            Acquire::AwaitInput => Ok(()),
        }
    }

    fn on_input(
        &mut self,
        _world: &World,
        session: &mut TargetingSession,
        input: TargetingInput,
    ) -> Result<(), TargetingViolation> {
        match input {
            TargetingInput::SelectActor(actor) if session.form() == TargetForm::Singular => {
                session.complete_with(Target::Actor(actor))
            }
            TargetingInput::SelectActor(actor) => session.target_selected(Target::Actor(actor)),
            TargetingInput::SelectPoint(point) => session.target_selected(Target::Point(point)),
            TargetingInput::SelectTargetable(id) => session.target_selected(Target::Targetable(id)),
            TargetingInput::Confirm => session.complete(),
            TargetingInput::Cancel => Ok(()),
        }
    }
}

// ============================================================================
// Effects and hooks
// ============================================================================

/// Appends `tag:target` to a journal for every application.
pub struct Tally {
    pub tag: &'static str,
    pub journal: Journal,
}

impl Tally {
    pub fn new(tag: &'static str, journal: &Journal) -> Self {
        Self {
            tag,
            journal: Arc::clone(journal),
        }
    }

    fn log(&self, what: String) {
        self.journal.lock().unwrap().push(format!("{}:{what}", self.tag));
    }
}

impl<T> Effect<T> for Tally {
    fn apply(&self, _world: &mut World, _ctx: &T) {
        self.log("none".into());
    }

    fn apply_point(&self, _world: &mut World, _ctx: &T, point: Vec3) {
        self.log(format!("point({})", point.x));
    }

    fn apply_actor(&self, _world: &mut World, _ctx: &T, actor: ActorId) {
        self.log(actor.to_string());
    }

    fn apply_targetable(&self, _world: &mut World, _ctx: &T, target: TargetableId) {
        self.log(target.to_string());
    }
}

/// Records every hook call.
pub struct HookLog(pub Journal);

impl HookLog {
    fn log(&self, what: &str) {
        self.0.lock().unwrap().push(what.to_owned());
    }
}

impl CastHooks for HookLog {
    fn on_invoke(&self, _world: &mut World, _cast: &CastRef) {
        self.log("invoke");
    }

    fn on_targeting_done(&self, _world: &mut World, _cast: &CastRef) {
        self.log("targeting_done");
    }

    fn on_cast_began(&self, _world: &mut World, _cast: &CastRef) {
        self.log("cast_began");
    }

    fn on_casting(&self, _world: &mut World, _cast: &CastRef, _progress: f64) {
        self.log("casting");
    }

    fn on_cast_failed(&self, _world: &mut World, _cast: &CastRef) {
        self.log("cast_failed");
    }

    fn on_cast_done(&self, _world: &mut World, _cast: &CastRef) {
        self.log("cast_done");
    }

    fn on_hit(&self, _world: &mut World, hit: &HitRef) {
        self.log(&format!("hit {:?}", hit.target));
    }

    fn on_miss(&self, _world: &mut World, projectile: &ProjectileRef) {
        self.log(&format!("miss {}", projectile.projectile));
    }

    fn on_cleanup(&self, _world: &mut World, _cast: &CastRef) {
        self.log("cleanup");
    }
}

// ============================================================================
// Spell
// ============================================================================

pub struct TestSpell {
    pub name: &'static str,
    pub duration: f64,
    pub form: TargetForm,
    pub casting_interval: Option<f64>,
    pub acquire: Acquire,
    pub invoke_conditions: ConditionCollection<CastRef>,
    pub interrupt_conditions: ConditionCollection<CastRef>,
    pub effects: SpellEffects,
    pub hooks: Option<HookLog>,
    pub projectile: Option<StraightLine>,
}

impl TestSpell {
    pub fn new(name: &'static str, acquire: Acquire) -> Self {
        Self {
            name,
            duration: 0.0,
            form: TargetForm::Singular,
            casting_interval: None,
            acquire,
            invoke_conditions: ConditionCollection::new(),
            interrupt_conditions: ConditionCollection::new(),
            effects: SpellEffects::default(),
            hooks: None,
            projectile: None,
        }
    }

    pub fn plural(mut self) -> Self {
        self.form = TargetForm::Plural;
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }

    pub fn hooks(mut self, journal: &Journal) -> Self {
        self.hooks = Some(HookLog(Arc::clone(journal)));
        self
    }

    pub fn projectile(mut self, speed: f32) -> Self {
        self.projectile = Some(StraightLine::new(speed));
        self
    }

    pub fn shared(self) -> Arc<dyn Spell> {
        Arc::new(self)
    }
}

impl Spell for TestSpell {
    fn name(&self) -> &str {
        self.name
    }

    fn cast_duration(&self) -> f64 {
        self.duration
    }

    fn target_form(&self) -> TargetForm {
        self.form
    }

    fn casting_interval(&self) -> Option<f64> {
        self.casting_interval
    }

    fn target_macro(&self, _cast: &CastRef) -> Box<dyn TargetMacro> {
        Box::new(ScriptedMacro {
            plan: self.acquire.clone(),
        })
    }

    fn invoke_conditions(&self) -> &ConditionCollection<CastRef> {
        &self.invoke_conditions
    }

    fn interrupt_conditions(&self) -> &ConditionCollection<CastRef> {
        &self.interrupt_conditions
    }

    fn effects(&self) -> &SpellEffects {
        &self.effects
    }

    fn hooks(&self) -> Option<&dyn CastHooks> {
        self.hooks.as_ref().map(|h| h as &dyn CastHooks)
    }

    fn projectile(&self) -> Option<&dyn ProjectileDelivery> {
        self.projectile.as_ref().map(|p| p as &dyn ProjectileDelivery)
    }
}

// ============================================================================
// Buff
// ============================================================================

pub struct TestBuff {
    pub name: &'static str,
    pub duration: f64,
    pub interval: f64,
    pub continuous: bool,
    pub max_stacks: u32,
    pub behavior: StackBehavior,
    pub effects: BuffEffects,
    pub done_conditions: ConditionCollection<BuffRef>,
    pub terminate_conditions: ConditionCollection<BuffRef>,
}

impl TestBuff {
    pub fn new(name: &'static str, duration: f64) -> Self {
        Self {
            name,
            duration,
            interval: 1.0,
            continuous: false,
            max_stacks: 1,
            behavior: StackBehavior::RESET_BEGINNING,
            effects: BuffEffects::default(),
            done_conditions: ConditionCollection::new(),
            terminate_conditions: ConditionCollection::new(),
        }
    }

    pub fn stacking(mut self, behavior: StackBehavior, max_stacks: u32) -> Self {
        self.behavior = behavior;
        self.max_stacks = max_stacks;
        self
    }

    pub fn shared(self) -> Arc<dyn BuffDefinition> {
        Arc::new(self)
    }
}

impl BuffDefinition for TestBuff {
    fn name(&self) -> &str {
        self.name
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn interval(&self) -> f64 {
        self.interval
    }

    fn continuous(&self) -> bool {
        self.continuous
    }

    fn max_stacks(&self) -> u32 {
        self.max_stacks
    }

    fn stack_behavior(&self) -> StackBehavior {
        self.behavior
    }

    fn effects(&self) -> &BuffEffects {
        &self.effects
    }

    fn done_conditions(&self) -> &ConditionCollection<BuffRef> {
        &self.done_conditions
    }

    fn terminate_conditions(&self) -> &ConditionCollection<BuffRef> {
        &self.terminate_conditions
    }
}
