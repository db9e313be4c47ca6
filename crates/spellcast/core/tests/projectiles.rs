mod common;

use std::sync::Arc;

use common::*;
use spellcast_core::{
    CastStage, CharacterSpec, EngineEvent, HitFilter, HitRef, HitValidity, Target, Vec3, World,
};

fn count(journal: &Journal, entry: &str) -> usize {
    entries(journal).iter().filter(|e| e.as_str() == entry).count()
}

#[test]
fn cleanup_runs_once_after_the_last_projectile() {
    let mut world = world();
    let caster = spawn(&mut world, "alice", 0.0);
    let b = spawn(&mut world, "bob", 2.0);
    let c = spawn(&mut world, "carol", 3.0);
    let d = spawn(&mut world, "dave", 4.0);
    let hooks = journal();
    let hits = journal();

    let mut spell = TestSpell::new(
        "arcane_missiles",
        Acquire::Fixed(vec![Target::Actor(b), Target::Actor(c), Target::Actor(d)]),
    )
    .plural()
    .projectile(10.0)
    .hooks(&hooks);
    spell.effects.hit.push(Tally::new("hit", &hits));

    let cast = world.begin_cast(caster, spell.shared()).unwrap();
    assert_eq!(world.projectiles().count(), 3);
    assert_eq!(world.cast(cast).map(|c| c.stage()), Some(CastStage::CastSuccess));
    assert_eq!(world.cast(cast).map(|c| c.outstanding_projectiles()), Some(3));
    assert!(world.actor(caster).unwrap().can_cast());

    world.step().unwrap();
    world.step().unwrap();
    world.step().unwrap();
    assert_eq!(world.projectiles().count(), 1);
    assert_eq!(count(&hooks, "cleanup"), 0);

    world.step().unwrap();
    assert_eq!(world.projectiles().count(), 0);
    assert_eq!(count(&hooks, "cleanup"), 1);
    assert_eq!(entries(&hooks).last().map(String::as_str), Some("cleanup"));
    assert!(world.cast(cast).is_none());

    for _ in 0..5 {
        world.step().unwrap();
    }
    assert_eq!(count(&hooks, "cleanup"), 1);
    assert_eq!(
        entries(&hits),
        vec![
            "hit:none",
            "hit:actor#1",
            "hit:none",
            "hit:actor#2",
            "hit:none",
            "hit:actor#3"
        ]
    );
    assert!(world.bus().is_empty());
    assert_eq!(world.contexts().len(), 4);
}

struct Evasive;

impl HitFilter for Evasive {
    fn accepts_hit(&self, _world: &World, _hit: &HitRef) -> bool {
        false
    }
}

#[test]
fn actor_hit_filter_turns_arrival_into_a_miss() {
    let mut world = world();
    let caster = spawn(&mut world, "alice", 0.0);
    let target = world.spawn_actor(
        CharacterSpec::new("rogue")
            .at(Vec3::new(1.0, 0.0, 0.0))
            .with_hit_filter(Arc::new(Evasive)),
    );
    let hooks = journal();

    let spell = TestSpell::new("bolt", Acquire::Fixed(vec![Target::Actor(target)]))
        .projectile(10.0)
        .hooks(&hooks);
    world.begin_cast(caster, spell.shared()).unwrap();
    run_until(&mut world, 10, |w| w.projectiles().count() == 0);

    assert!(world.events().iter().any(|e| matches!(
        e,
        EngineEvent::ProjectileHit {
            validity: HitValidity::RejectedByActor,
            ..
        }
    )));
    assert_eq!(count(&hooks, "miss projectile#0"), 1);
    assert_eq!(count(&hooks, "cleanup"), 1);
    assert!(!entries(&hooks).iter().any(|e| e.starts_with("hit")));
}

#[test]
fn singular_projectile_is_collected_by_any_valid_hit() {
    let mut world = world();
    let caster = spawn(&mut world, "alice", 0.0);
    let far = spawn(&mut world, "far", 50.0);
    let near = spawn(&mut world, "near", 1.0);

    let spell = TestSpell::new("bolt", Acquire::Fixed(vec![Target::Actor(far)])).projectile(1.0);
    world.begin_cast(caster, spell.shared()).unwrap();
    let projectile = world.projectiles().next().unwrap().id();

    let validity = world
        .report_projectile_hit(projectile, Target::Actor(near), Vec3::X)
        .unwrap();
    assert_eq!(validity, HitValidity::Valid);
    assert!(world.projectile(projectile).is_none());
}

#[test]
fn plural_projectile_passes_through_incidental_hits() {
    let mut world = world();
    let caster = spawn(&mut world, "alice", 0.0);
    let far = spawn(&mut world, "far", 50.0);
    let near = spawn(&mut world, "near", 1.0);
    let hooks = journal();

    let spell = TestSpell::new("piercing_shot", Acquire::Fixed(vec![Target::Actor(far)]))
        .plural()
        .projectile(1.0)
        .hooks(&hooks);
    world.begin_cast(caster, spell.shared()).unwrap();
    let projectile = world.projectiles().next().unwrap().id();

    world
        .report_projectile_hit(projectile, Target::Actor(near), Vec3::X)
        .unwrap();
    let record = world.projectile(projectile).unwrap();
    assert_eq!(record.hit_count(), 1);
    assert_eq!(count(&hooks, "cleanup"), 0);

    world
        .report_projectile_hit(projectile, Target::Actor(far), Vec3::X)
        .unwrap();
    assert!(world.projectile(projectile).is_none());
    assert_eq!(count(&hooks, "cleanup"), 1);
}

#[test]
fn point_target_without_hits_misses_before_collection() {
    let mut world = world();
    let caster = spawn(&mut world, "alice", 0.0);
    let hooks = journal();

    let spell = TestSpell::new(
        "flare",
        Acquire::Fixed(vec![Target::Point(Vec3::new(2.0, 0.0, 0.0))]),
    )
    .projectile(10.0)
    .hooks(&hooks);
    world.begin_cast(caster, spell.shared()).unwrap();
    run_until(&mut world, 10, |w| w.projectiles().count() == 0);

    let log = entries(&hooks);
    let miss = log.iter().position(|e| e == "miss projectile#0").unwrap();
    let cleanup = log.iter().position(|e| e == "cleanup").unwrap();
    assert!(miss < cleanup);
}

#[test]
fn vanished_target_is_reported_missing() {
    let mut world = world();
    let caster = spawn(&mut world, "alice", 0.0);
    let target = spawn(&mut world, "bob", 3.0);
    let hooks = journal();

    let spell = TestSpell::new("bolt", Acquire::Fixed(vec![Target::Actor(target)]))
        .projectile(10.0)
        .hooks(&hooks);
    world.begin_cast(caster, spell.shared()).unwrap();
    world.step().unwrap();
    world.despawn_actor(target).unwrap();
    run_until(&mut world, 10, |w| w.projectiles().count() == 0);

    assert!(world.events().iter().any(|e| matches!(
        e,
        EngineEvent::ProjectileHit {
            validity: HitValidity::TargetMissing,
            ..
        }
    )));
    assert_eq!(count(&hooks, "miss projectile#0"), 1);
    assert_eq!(count(&hooks, "cleanup"), 1);
}

#[test]
fn projectile_context_chains_under_the_cast() {
    let mut world = world();
    let caster = spawn(&mut world, "alice", 0.0);
    let target = spawn(&mut world, "bob", 30.0);

    let spell = TestSpell::new("bolt", Acquire::Fixed(vec![Target::Actor(target)])).projectile(1.0);
    let cast = world.begin_cast(caster, spell.shared()).unwrap();
    let projectile = world.projectiles().next().unwrap();

    let cast_context = world.cast(cast).unwrap().context();
    let chain: Vec<_> = world.contexts().ancestors(projectile.context()).collect();
    assert_eq!(chain.len(), 3);
    assert_eq!(chain[0].id(), projectile.context());
    assert_eq!(chain[1].id(), cast_context);
    assert_eq!(
        chain.last().map(|n| n.id()),
        Some(world.actor(caster).unwrap().root_context())
    );
}
