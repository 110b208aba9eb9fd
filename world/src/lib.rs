#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lawn Defence.
//!
//! The world owns the placement grid, the sun ledger, the entity registry and
//! the falling sun pickups. Every mutation flows through [`apply`], which
//! serialises commit transactions so exactly one plant claims a cell and the
//! balance never goes negative.

mod entities;
pub mod grid;
pub mod ledger;
mod sun;

use std::time::Duration;

use glam::Vec2;
use lawn_defence_core::{
    CellIndex, Command, EntityCategory, EntityId, Event, GridLayout, PlacementError,
    PlacementRegion, PlantKind, RemovalError, Sun, WorldRect, WELCOME_BANNER,
};
use tracing::{debug, info};

use self::entities::{EntityRegistry, EntityState};
use self::sun::SunPickups;

pub use self::grid::Grid;
pub use self::ledger::SunLedger;

const DEFAULT_STARTING_SUN: Sun = Sun::new(200);
const DEFAULT_VIEWPORT: Vec2 = Vec2::new(1280.0, 800.0);
const DEFAULT_SUN_EXTENT: Vec2 = Vec2::new(60.0, 60.0);
const DEFAULT_PROJECTILE_SPEED: f32 = 400.0;
const DEFAULT_PROJECTILE_EXTENT: Vec2 = Vec2::new(20.0, 20.0);

/// Author-time configuration bound into the world at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Placement grid geometry; `None` selects grid-less placement.
    pub grid: Option<GridLayout>,
    /// Region bounding placements when no grid is bound.
    pub region: Option<PlacementRegion>,
    /// Balance the ledger starts with.
    pub starting_sun: Sun,
    /// Visible area; pickups and projectiles leaving it are discarded.
    pub viewport: Vec2,
    /// Clickable extent of sun pickups.
    pub sun_extent: Vec2,
    /// Horizontal speed of projectiles in world units per second.
    pub projectile_speed: f32,
    /// Bounding extent of projectiles.
    pub projectile_extent: Vec2,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid: Some(GridLayout::default()),
            region: None,
            starting_sun: DEFAULT_STARTING_SUN,
            viewport: DEFAULT_VIEWPORT,
            sun_extent: DEFAULT_SUN_EXTENT,
            projectile_speed: DEFAULT_PROJECTILE_SPEED,
            projectile_extent: DEFAULT_PROJECTILE_EXTENT,
        }
    }
}

/// Represents the authoritative Lawn Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: Option<Grid>,
    region: Option<PlacementRegion>,
    ledger: SunLedger,
    entities: EntityRegistry,
    suns: SunPickups,
    viewport: Vec2,
    sun_extent: Vec2,
    projectile_speed: f32,
    projectile_extent: Vec2,
    tick_index: u64,
}

impl World {
    /// Creates a new world with the provided collaborators bound.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            grid: config.grid.map(Grid::new),
            region: config.region,
            ledger: SunLedger::new(config.starting_sun),
            entities: EntityRegistry::new(),
            suns: SunPickups::new(),
            viewport: config.viewport,
            sun_extent: config.sun_extent,
            projectile_speed: config.projectile_speed,
            projectile_extent: config.projectile_extent,
            tick_index: 0,
        }
    }

    /// Positional and overlap checks a commit must pass before any sun is spent.
    ///
    /// Returns the cell the plant claims when a grid is bound.
    fn admit_placement(
        &self,
        position: Vec2,
        extent: Vec2,
    ) -> Result<Option<CellIndex>, PlacementError> {
        let cell = match (self.grid.as_ref(), self.region.as_ref()) {
            (Some(grid), _) => {
                if !grid.is_point_in_grid_area(position) {
                    return Err(PlacementError::OutsideGrid);
                }
                let cell = grid.world_to_cell(position);
                if !grid.is_cell_free(cell) {
                    return Err(PlacementError::Occupied);
                }
                Some(cell)
            }
            (None, Some(region)) => {
                if !region.contains(position) {
                    return Err(PlacementError::OutsideRegion);
                }
                None
            }
            (None, None) => None,
        };

        if self.entities.blocks(&WorldRect::centered(position, extent)) {
            return Err(PlacementError::Overlap);
        }
        Ok(cell)
    }

    fn commit_placement(
        &mut self,
        kind: PlantKind,
        position: Vec2,
        extent: Vec2,
        cost: Sun,
        out_events: &mut Vec<Event>,
    ) {
        let cell = match self.admit_placement(position, extent) {
            Ok(cell) => cell,
            Err(reason) => {
                reject_placement(kind, position, reason, out_events);
                return;
            }
        };

        if !self.ledger.try_spend(cost) {
            reject_placement(kind, position, PlacementError::InsufficientFunds, out_events);
            return;
        }

        if let (Some(grid), Some(cell)) = (self.grid.as_mut(), cell) {
            grid.mark_occupied(cell);
        }
        let entity = self
            .entities
            .insert(EntityState::plant(kind, position, extent, cell));
        let balance = self.ledger.balance();

        info!(
            target: "world.placement",
            entity = entity.get(),
            ?kind,
            cost = cost.get(),
            balance = balance.get(),
            "plant placed"
        );
        out_events.push(Event::PlantPlaced {
            entity,
            kind,
            position,
            cell,
            cost,
            balance,
        });
    }

    fn remove_plant(&mut self, entity: EntityId, out_events: &mut Vec<Event>) {
        let is_plant = self
            .entities
            .get(entity)
            .is_some_and(|state| state.category == EntityCategory::Placed);
        let removed = if is_plant {
            self.entities.remove(entity)
        } else {
            None
        };

        let Some(state) = removed else {
            debug!(target: "world.placement", entity = entity.get(), "removal rejected");
            out_events.push(Event::PlantRemovalRejected {
                entity,
                reason: RemovalError::MissingPlant,
            });
            return;
        };

        if let (Some(grid), Some(cell)) = (self.grid.as_mut(), state.cell) {
            grid.mark_free(cell);
        }
        info!(target: "world.placement", entity = entity.get(), "plant removed");
        out_events.push(Event::PlantRemoved {
            entity,
            kind: state.kind,
            cell: state.cell,
        });
    }

    fn fire_projectile(&mut self, shooter: EntityId, out_events: &mut Vec<Event>) {
        let Some((kind, position)) = self
            .entities
            .get(shooter)
            .filter(|state| state.category == EntityCategory::Placed)
            .map(|state| (state.kind, state.position))
        else {
            debug!(target: "world.projectile", shooter = shooter.get(), "unknown shooter");
            return;
        };

        let projectile = self.entities.insert(EntityState::projectile(
            kind,
            position,
            self.projectile_extent,
            Vec2::new(self.projectile_speed, 0.0),
        ));
        out_events.push(Event::ProjectileFired {
            projectile,
            shooter,
            position,
        });
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let seconds = dt.as_secs_f32();

        for sun in self.suns.advance(seconds, self.viewport.y) {
            debug!(target: "world.sun", sun = sun.get(), "sun expired");
            out_events.push(Event::SunExpired { sun });
        }

        for projectile in self.entities.advance_projectiles(seconds, self.viewport.x) {
            out_events.push(Event::ProjectileExpired { projectile });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

fn reject_placement(
    kind: PlantKind,
    position: Vec2,
    reason: PlacementError,
    out_events: &mut Vec<Event>,
) {
    info!(target: "world.placement", ?kind, %reason, "placement rejected");
    out_events.push(Event::PlacementRejected {
        kind,
        position,
        reason,
    });
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.advance(dt, out_events);
        }
        Command::PlacePlant {
            kind,
            position,
            extent,
            cost,
        } => world.commit_placement(kind, position, extent, cost, out_events),
        Command::RemovePlant { entity } => world.remove_plant(entity, out_events),
        Command::ClearPlants => {
            let removed = world.entities.clear();
            if let Some(grid) = world.grid.as_mut() {
                grid.reset_all();
            }
            info!(target: "world.placement", removed, "lawn cleared");
            out_events.push(Event::PlantsCleared { removed });
        }
        Command::SpawnSun {
            position,
            velocity,
            value,
        } => {
            let sun = world.suns.spawn(position, velocity, world.sun_extent, value);
            debug!(target: "world.sun", sun = sun.get(), value = value.get(), "sun spawned");
            out_events.push(Event::SunSpawned {
                sun,
                position,
                value,
            });
        }
        Command::CollectSun { point } => {
            if let Some((sun, value)) = world.suns.collect_at(point) {
                world.ledger.add(value);
                let balance = world.ledger.balance();
                info!(
                    target: "world.sun",
                    sun = sun.get(),
                    value = value.get(),
                    balance = balance.get(),
                    "sun collected"
                );
                out_events.push(Event::SunCollected {
                    sun,
                    value,
                    balance,
                });
            }
        }
        Command::FireProjectile { shooter } => world.fire_projectile(shooter, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use lawn_defence_core::{CellIndex, EntityView, PlacementRegion, Sun, SunPickupSnapshot};

    use super::{Grid, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the bound placement grid, if any.
    #[must_use]
    pub fn grid(world: &World) -> Option<&Grid> {
        world.grid.as_ref()
    }

    /// Provides read-only access to the bound placement region, if any.
    #[must_use]
    pub fn placement_region(world: &World) -> Option<&PlacementRegion> {
        world.region.as_ref()
    }

    /// Current sun balance.
    #[must_use]
    pub fn sun_balance(world: &World) -> Sun {
        world.ledger.balance()
    }

    /// Captures a read-only view of every live registry entity.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        EntityView::from_snapshots(world.entities.snapshots())
    }

    /// Captures the sun pickups currently falling through the viewport.
    #[must_use]
    pub fn sun_pickups(world: &World) -> Vec<SunPickupSnapshot> {
        world.suns.snapshots()
    }

    /// Claimed cells in row-major order; empty when no grid is bound.
    #[must_use]
    pub fn occupied_cells(world: &World) -> Vec<CellIndex> {
        world.grid.as_ref().map(Grid::occupied_cells).unwrap_or_default()
    }

    /// Number of ticks processed since construction.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
