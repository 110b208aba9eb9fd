use std::time::Duration;

use glam::Vec2;
use lawn_defence_core::{Command, EntityId, Event, PlantKind, Sun};
use lawn_defence_system_sun_production::{Config, IntervalRange, SunProduction};
use lawn_defence_world::{self as world, query, World};

fn fixed(seconds: u64) -> IntervalRange {
    IntervalRange::new(Duration::from_secs(seconds), Duration::from_secs(seconds))
}

fn fixed_config() -> Config {
    Config {
        first_interval: fixed(2),
        mature_interval: fixed(5),
        ..Config::default()
    }
}

fn place(world: &mut World, kind: PlantKind, position: Vec2) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::PlacePlant {
            kind,
            position,
            extent: kind.default_extent(),
            cost: kind.default_cost(),
        },
        &mut events,
    );
    events
}

fn tick(world: &mut World, seconds: u64) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_secs(seconds),
        },
        &mut events,
    );
    events
}

#[test]
fn sunflowers_produce_sun_above_themselves() {
    let mut world = World::default();
    let mut production = SunProduction::new(fixed_config());
    let mut commands = Vec::new();

    let mut events = place(&mut world, PlantKind::Sunflower, Vec2::new(40.0, 120.0));
    events.extend(place(&mut world, PlantKind::Peashooter, Vec2::new(120.0, 120.0)));
    production.handle(&events, &mut commands);
    assert_eq!(production.tracked(), 1, "only sunflowers produce sun");

    production.handle(&tick(&mut world, 1), &mut commands);
    assert!(commands.is_empty(), "no sun before the first interval");

    production.handle(&tick(&mut world, 1), &mut commands);
    assert_eq!(
        commands,
        vec![Command::SpawnSun {
            position: Vec2::new(40.0, 100.0),
            velocity: Vec2::ZERO,
            value: Sun::new(25),
        }]
    );

    let mut events = Vec::new();
    for command in commands.drain(..) {
        world::apply(&mut world, command, &mut events);
    }
    world::apply(
        &mut world,
        Command::CollectSun {
            point: Vec2::new(45.0, 95.0),
        },
        &mut events,
    );
    assert!(matches!(
        events.as_slice(),
        [Event::SunSpawned { .. }, Event::SunCollected { balance, .. }] if *balance == Sun::new(75)
    ));
    assert_eq!(query::sun_balance(&world), Sun::new(75));
}

#[test]
fn later_productions_use_the_mature_interval() {
    let mut world = World::default();
    let mut production = SunProduction::new(fixed_config());
    let mut commands = Vec::new();

    production.handle(
        &place(&mut world, PlantKind::Sunflower, Vec2::new(40.0, 40.0)),
        &mut commands,
    );
    production.handle(&tick(&mut world, 2), &mut commands);
    assert_eq!(commands.len(), 1);

    production.handle(&tick(&mut world, 4), &mut commands);
    assert_eq!(commands.len(), 1, "mature interval has not elapsed yet");

    production.handle(&tick(&mut world, 1), &mut commands);
    assert_eq!(commands.len(), 2);
}

#[test]
fn removed_sunflowers_stop_producing() {
    let mut world = World::default();
    let mut production = SunProduction::new(fixed_config());
    let mut commands = Vec::new();

    production.handle(
        &place(&mut world, PlantKind::Sunflower, Vec2::new(40.0, 40.0)),
        &mut commands,
    );
    production.handle(
        &place(&mut world, PlantKind::Sunflower, Vec2::new(120.0, 40.0)),
        &mut commands,
    );
    assert_eq!(production.tracked(), 2);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::RemovePlant {
            entity: EntityId::new(0),
        },
        &mut events,
    );
    production.handle(&events, &mut commands);
    assert_eq!(production.tracked(), 1);

    let mut events = Vec::new();
    world::apply(&mut world, Command::ClearPlants, &mut events);
    events.extend(tick(&mut world, 10));
    production.handle(&events, &mut commands);

    assert_eq!(production.tracked(), 0);
    assert!(commands.is_empty(), "cleared lawns produce nothing");
}

#[test]
fn seeded_production_replays_identically() {
    let first = replay(0x1234_5678);
    let second = replay(0x1234_5678);

    assert_eq!(first, second, "replay diverged between runs");
    assert!(
        !first.is_empty(),
        "sixty seconds must produce at least one sun per sunflower"
    );
}

fn replay(seed: u64) -> Vec<(usize, Command)> {
    let mut world = World::default();
    let mut production = SunProduction::new(Config {
        rng_seed: seed,
        ..Config::default()
    });
    let mut commands = Vec::new();

    let mut events = place(&mut world, PlantKind::Sunflower, Vec2::new(40.0, 40.0));
    events.extend(place(&mut world, PlantKind::Sunflower, Vec2::new(200.0, 40.0)));
    production.handle(&events, &mut commands);

    let mut log = Vec::new();
    for step in 0..120 {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(500),
            },
            &mut events,
        );
        production.handle(&events, &mut commands);
        log.extend(commands.drain(..).map(|command| (step, command)));
    }
    log
}
