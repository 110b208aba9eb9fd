#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits projectile firing commands for planted shooters.

use std::{collections::BTreeMap, time::Duration};

use lawn_defence_core::{Command, EntityId, Event, PlantKind};
use tracing::trace;

const DEFAULT_FIRE_INTERVAL: Duration = Duration::from_millis(500);

/// Shooting system that queues firing commands for shooters whose cooldown
/// elapsed.
#[derive(Debug)]
pub struct Shooting {
    fire_interval: Duration,
    cooldowns: BTreeMap<EntityId, Duration>,
    scratch: Vec<Command>,
}

impl Default for Shooting {
    fn default() -> Self {
        Self::new(DEFAULT_FIRE_INTERVAL)
    }
}

impl Shooting {
    /// Creates a new shooting system firing once per `fire_interval`.
    #[must_use]
    pub fn new(fire_interval: Duration) -> Self {
        Self {
            fire_interval,
            cooldowns: BTreeMap::new(),
            scratch: Vec::new(),
        }
    }

    /// Number of shooters currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.cooldowns.len()
    }

    /// Emits `Command::FireProjectile` entries for shooters ready to fire.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::PlantPlaced {
                    entity,
                    kind: PlantKind::Peashooter,
                    ..
                } => {
                    let _ = self.cooldowns.insert(*entity, Duration::ZERO);
                }
                Event::PlantRemoved { entity, .. } => {
                    let _ = self.cooldowns.remove(entity);
                }
                Event::PlantsCleared { .. } => self.cooldowns.clear(),
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                _ => {}
            }
        }

        if accumulated.is_zero() || self.fire_interval.is_zero() {
            return;
        }

        self.scratch.clear();

        for (shooter, elapsed) in &mut self.cooldowns {
            *elapsed = elapsed.saturating_add(accumulated);
            if *elapsed >= self.fire_interval {
                *elapsed = Duration::ZERO;
                trace!(target: "shooting", shooter = shooter.get(), "shooter fired");
                self.scratch.push(Command::FireProjectile { shooter: *shooter });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
