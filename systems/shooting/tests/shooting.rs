use std::time::Duration;

use glam::Vec2;
use lawn_defence_core::{Command, EntityCategory, EntityId, Event, PlantKind, VisualState};
use lawn_defence_system_shooting::Shooting;
use lawn_defence_world::{self as world, query, World};

fn run(world: &mut World, shooting: &mut Shooting, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);

    let mut commands = Vec::new();
    shooting.handle(&events, &mut commands);
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn tick(millis: u64) -> Command {
    Command::Tick {
        dt: Duration::from_millis(millis),
    }
}

#[test]
fn planted_peashooters_emit_transient_projectiles() {
    let mut world = World::default();
    let mut shooting = Shooting::default();

    let _ = run(
        &mut world,
        &mut shooting,
        Command::PlacePlant {
            kind: PlantKind::Peashooter,
            position: Vec2::new(40.0, 120.0),
            extent: Vec2::splat(60.0),
            cost: PlantKind::Peashooter.default_cost(),
        },
    );
    let events = run(&mut world, &mut shooting, tick(500));

    assert!(
        events.contains(&Event::ProjectileFired {
            projectile: EntityId::new(1),
            shooter: EntityId::new(0),
            position: Vec2::new(40.0, 120.0),
        }),
        "peashooter should fire once its interval elapses"
    );

    let view = query::entity_view(&world);
    let projectile = view.get(EntityId::new(1)).expect("projectile is registered");
    assert_eq!(projectile.category, EntityCategory::Transient);
    assert_eq!(projectile.visual, VisualState::Projectile);
    assert_eq!(projectile.cell, None);
    assert_eq!(query::occupied_cells(&world).len(), 1, "projectiles claim no cells");
}

#[test]
fn projectiles_travel_right_and_expire_off_screen() {
    let mut world = World::default();
    let mut shooting = Shooting::default();

    let _ = run(
        &mut world,
        &mut shooting,
        Command::PlacePlant {
            kind: PlantKind::Peashooter,
            position: Vec2::new(40.0, 120.0),
            extent: Vec2::splat(60.0),
            cost: PlantKind::Peashooter.default_cost(),
        },
    );
    let _ = run(&mut world, &mut shooting, tick(500));

    let _ = run(&mut world, &mut shooting, tick(250));
    let view = query::entity_view(&world);
    assert_eq!(
        view.get(EntityId::new(1)).map(|snapshot| snapshot.position),
        Some(Vec2::new(140.0, 120.0))
    );

    let mut expired = Vec::new();
    for _ in 0..16 {
        expired.extend(
            run(&mut world, &mut shooting, tick(250))
                .into_iter()
                .filter(|event| matches!(event, Event::ProjectileExpired { .. })),
        );
    }
    assert!(
        expired.contains(&Event::ProjectileExpired {
            projectile: EntityId::new(1),
        }),
        "first projectile must leave the viewport within four seconds"
    );
}

#[test]
fn removed_shooters_stop_firing() {
    let mut world = World::default();
    let mut shooting = Shooting::default();

    let _ = run(
        &mut world,
        &mut shooting,
        Command::PlacePlant {
            kind: PlantKind::Peashooter,
            position: Vec2::new(40.0, 120.0),
            extent: Vec2::splat(60.0),
            cost: PlantKind::Peashooter.default_cost(),
        },
    );
    let _ = run(
        &mut world,
        &mut shooting,
        Command::RemovePlant {
            entity: EntityId::new(0),
        },
    );
    let events = run(&mut world, &mut shooting, tick(2_000));

    assert_eq!(shooting.tracked(), 0);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ProjectileFired { .. })));
}
