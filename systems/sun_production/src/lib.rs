#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded sun production system that lets every sunflower on the lawn emit
//! sun pickups on randomised intervals.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use lawn_defence_core::{Command, EntityId, Event, PlantKind, Sun};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Closed range of production intervals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalRange {
    min: Duration,
    max: Duration,
}

impl IntervalRange {
    /// Creates a range, swapping the bounds when they arrive reversed.
    #[must_use]
    pub fn new(a: Duration, b: Duration) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Lower bound of the range.
    #[must_use]
    pub const fn min(&self) -> Duration {
        self.min
    }

    /// Upper bound of the range.
    #[must_use]
    pub const fn max(&self) -> Duration {
        self.max
    }

    fn sample(&self, rng: &mut ChaCha8Rng) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let seconds = rng.gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(seconds)
    }
}

/// Configuration parameters required to construct the sun production system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Wait before a freshly planted sunflower produces its first sun.
    pub first_interval: IntervalRange,
    /// Wait between subsequent productions.
    pub mature_interval: IntervalRange,
    /// Sun credited by each produced pickup.
    pub sun_value: Sun,
    /// Offset from the sunflower's anchor to the spawned pickup.
    pub spawn_offset: Vec2,
    /// Initial velocity of produced pickups.
    pub spawn_velocity: Vec2,
    /// Seed feeding the interval generator.
    pub rng_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            first_interval: IntervalRange::new(
                Duration::from_secs(3),
                Duration::from_millis(12_500),
            ),
            mature_interval: IntervalRange::new(
                Duration::from_secs(23),
                Duration::from_millis(23_500),
            ),
            sun_value: Sun::new(25),
            spawn_offset: Vec2::new(0.0, -20.0),
            spawn_velocity: Vec2::ZERO,
            rng_seed: 0x5eed_f10e_a5a5_0001,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct ProductionTimer {
    position: Vec2,
    elapsed: Duration,
    interval: Duration,
}

/// Pure system that tracks one production timer per sunflower.
#[derive(Debug)]
pub struct SunProduction {
    config: Config,
    rng: ChaCha8Rng,
    timers: BTreeMap<EntityId, ProductionTimer>,
}

impl SunProduction {
    /// Creates a new sun production system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            config,
            timers: BTreeMap::new(),
        }
    }

    /// Number of sunflowers currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.timers.len()
    }

    /// Consumes world events and emits sun spawn commands.
    ///
    /// Sunflowers are tracked from their `PlantPlaced` event until removal.
    /// Time advances are applied after roster changes in the same batch.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::PlantPlaced {
                    entity,
                    kind: PlantKind::Sunflower,
                    position,
                    ..
                } => {
                    let interval = self.config.first_interval.sample(&mut self.rng);
                    let _ = self.timers.insert(
                        *entity,
                        ProductionTimer {
                            position: *position,
                            elapsed: Duration::ZERO,
                            interval,
                        },
                    );
                }
                Event::PlantRemoved { entity, .. } => {
                    let _ = self.timers.remove(entity);
                }
                Event::PlantsCleared { .. } => self.timers.clear(),
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                _ => {}
            }
        }

        if accumulated.is_zero() {
            return;
        }

        for (entity, timer) in &mut self.timers {
            timer.elapsed = timer.elapsed.saturating_add(accumulated);
            if timer.elapsed < timer.interval {
                continue;
            }

            timer.elapsed = Duration::ZERO;
            timer.interval = self.config.mature_interval.sample(&mut self.rng);
            debug!(
                target: "sun_production",
                entity = entity.get(),
                next_in = timer.interval.as_secs_f32(),
                "sunflower produced sun"
            );
            out.push(Command::SpawnSun {
                position: timer.position + self.config.spawn_offset,
                velocity: self.config.spawn_velocity,
                value: self.config.sun_value,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_bounds_are_swapped() {
        let range = IntervalRange::new(Duration::from_secs(9), Duration::from_secs(2));
        assert_eq!(range.min(), Duration::from_secs(2));
        assert_eq!(range.max(), Duration::from_secs(9));
    }

    #[test]
    fn samples_stay_inside_the_range() {
        let range = IntervalRange::new(Duration::from_secs(3), Duration::from_millis(12_500));
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let sample = range.sample(&mut rng);
            assert!(sample >= range.min() && sample <= range.max());
        }
    }

    #[test]
    fn degenerate_range_is_constant() {
        let range = IntervalRange::new(Duration::from_secs(4), Duration::from_secs(4));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(range.sample(&mut rng), Duration::from_secs(4));
    }
}
