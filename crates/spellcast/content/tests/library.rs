use std::path::PathBuf;

use spellcast_content::{
    ContentFactory, ContentLibrary, ContentLoader, IsAlive, Not, ScenarioAction,
};
use spellcast_core::{
    ActorId, AttributeCollection, AttributeKind, BuffKey, BuffVisibility, CastId, CastRefusal,
    CharacterSpec, ConditionCollection, EngineError, EngineEvent, TargetingInput, Vec3, World,
};

fn factory() -> ContentFactory {
    ContentFactory::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data"))
}

fn library() -> ContentLibrary {
    factory().load_library().expect("shipped content compiles")
}

fn world() -> World {
    World::new(factory().load_config().expect("shipped config parses"))
}

fn spawn(world: &mut World, name: &str, x: f32, attributes: &[(AttributeKind, f64)]) -> ActorId {
    let attributes = attributes
        .iter()
        .fold(AttributeCollection::new(), |acc, (kind, value)| acc.with(*kind, *value));
    world.spawn_actor(
        CharacterSpec::new(name)
            .at(Vec3::new(x, 0.0, 0.0))
            .with_attributes(attributes)
            .with_interrupts(ConditionCollection::new().with(Not::new(IsAlive))),
    )
}

fn run_until_released(world: &mut World, cast: CastId) {
    for _ in 0..400 {
        if world.cast(cast).is_none() {
            return;
        }
        world.step().unwrap();
    }
    panic!("cast {cast} never finished");
}

fn health(world: &World, actor: ActorId) -> f64 {
    world.actor(actor).unwrap().attribute(AttributeKind::Health)
}

#[test]
fn shipped_data_loads() {
    let library = library();
    let names: Vec<_> = library.spell_names().collect();
    assert!(names.contains(&"fireball"));
    assert!(library.buff("burning").is_some());

    let config = factory().load_config().unwrap();
    assert_eq!(config.frame_delta, 0.05);

    let scenario = factory().load_scenario("skirmish").unwrap();
    assert_eq!(scenario.actors.len(), 3);
    assert!(matches!(
        scenario.steps_at(1).next(),
        Some(ScenarioAction::Cast { spell, .. }) if spell == "fireball"
    ));
}

#[test]
fn fireball_hits_and_burning_stacks_per_caster_and_spell() {
    let library = library();
    let mut world = world();
    let alice = spawn(&mut world, "alice", 0.0, &[(AttributeKind::Mana, 100.0)]);
    let bob = spawn(&mut world, "bob", 10.0, &[(AttributeKind::Health, 120.0)]);
    let fireball = library.spell("fireball").unwrap();
    let burning = BuffKey {
        owner: bob,
        visibility: BuffVisibility::Visible,
        identity: "burning@fireball:alice".into(),
    };

    for stacks in 1..=2 {
        let cast = world.begin_cast(alice, fireball.clone()).unwrap();
        assert!(world.cast(cast).unwrap().is_targeting_pending());
        assert!(world
            .submit_targeting_input(cast, TargetingInput::SelectActor(bob))
            .unwrap());
        run_until_released(&mut world, cast);

        assert_eq!(world.buff(&burning).map(|b| b.stacks()), Some(stacks));
    }

    assert_eq!(
        world.actor(alice).unwrap().attribute(AttributeKind::Mana),
        60.0
    );
    assert!(health(&world, bob) <= 120.0 - 70.0);
}

#[test]
fn mana_gate_refuses_the_cast() {
    let library = library();
    let mut world = world();
    let alice = spawn(&mut world, "alice", 0.0, &[(AttributeKind::Mana, 5.0)]);

    let err = world
        .begin_cast(alice, library.spell("fireball").unwrap())
        .unwrap_err();
    assert!(matches!(err, EngineError::Refused(CastRefusal::CannotCast)));
    assert_eq!(world.casts().count(), 0);
}

#[test]
fn moving_during_blizzard_interrupts_it() {
    let library = library();
    let mut world = world();
    let bob = spawn(&mut world, "bob", 10.0, &[]);

    let cast = world
        .begin_cast(bob, library.spell("blizzard").unwrap())
        .unwrap();
    world
        .submit_targeting_input(cast, TargetingInput::SelectPoint(Vec3::new(40.0, 0.0, 0.0)))
        .unwrap();
    assert!(world.cast(cast).unwrap().is_targeting_pending());
    world
        .submit_targeting_input(cast, TargetingInput::SelectPoint(Vec3::new(2.0, 0.0, 0.0)))
        .unwrap();

    world.step().unwrap();
    world.actor_mut(bob).unwrap().position = Vec3::new(12.0, 0.0, 0.0);
    run_until_released(&mut world, cast);

    let events = world.events();
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::TargetOutOfRange { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::CastInterrupted { cast: c } if *c == cast)));
    assert!(!events
        .iter()
        .any(|e| matches!(e, EngineEvent::CastCompleted { cast: c, .. } if *c == cast)));
}

#[test]
fn barrier_is_exclusive_and_breaks_at_low_health() {
    let library = library();
    let mut world = world();
    let carol = spawn(&mut world, "carol", 0.0, &[(AttributeKind::Health, 80.0)]);
    let barrier = library.spell("barrier").unwrap();

    let cast = world.begin_cast(carol, barrier.clone()).unwrap();
    assert!(world.cast(cast).is_none());
    assert_eq!(
        world.actor(carol).unwrap().attribute(AttributeKind::Armor),
        10.0
    );
    assert!(matches!(
        world.begin_cast(carol, barrier),
        Err(EngineError::Refused(CastRefusal::CannotCast))
    ));

    world
        .actor_mut(carol)
        .unwrap()
        .attributes
        .get_mut(AttributeKind::Health)
        .set_base(20.0);
    world.step().unwrap();
    world.step().unwrap();

    let actor = world.actor(carol).unwrap();
    assert!(!actor.has_buff_named("barrier"));
    assert_eq!(actor.attribute(AttributeKind::Armor), 0.0);
}

#[test]
fn loader_reports_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    let buffs = dir.path().join("buffs.ron");
    let spells = dir.path().join("spells.ron");

    std::fs::write(&buffs, "(buffs: [])").unwrap();
    std::fs::write(
        &spells,
        r#"(spells: [(name: "curse", effects: (cast_done: [ApplyBuff(buff: "doom")]))])"#,
    )
    .unwrap();
    let err = ContentLoader::load(&buffs, &spells).err().expect("unknown buff");
    assert!(format!("{err:#}").contains("doom"));

    std::fs::write(&spells, "(spells: [(name: ").unwrap();
    let err = ContentLoader::load(&buffs, &spells).err().expect("truncated file");
    assert!(err.to_string().contains("spell catalog"));

    let missing = dir.path().join("nope.ron");
    assert!(ContentLoader::load_spells(&missing).is_err());
}
