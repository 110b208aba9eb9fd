#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lawn Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Lawn Defence.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a dragged candidate is committed as a permanent plant.
    ///
    /// The world executes the commit transaction: occupancy re-check, ledger
    /// debit, occupancy mark and registry insertion.
    PlacePlant {
        /// Kind of plant being placed.
        kind: PlantKind,
        /// World-space anchor of the plant after snapping.
        position: Vec2,
        /// Bounding extent used for overlap tests.
        extent: Vec2,
        /// Sun debited from the ledger when the placement succeeds.
        cost: Sun,
    },
    /// Requests removal of a placed plant, freeing its claimed cell.
    RemovePlant {
        /// Identifier of the plant targeted for removal.
        entity: EntityId,
    },
    /// Removes every placed plant and resets grid occupancy.
    ClearPlants,
    /// Requests that a sun pickup is spawned into the world.
    SpawnSun {
        /// World-space position where the pickup appears.
        position: Vec2,
        /// Velocity applied to the pickup every tick, in world units per second.
        velocity: Vec2,
        /// Amount credited to the ledger once the pickup is collected.
        value: Sun,
    },
    /// Requests collection of the sun pickup under the provided point.
    CollectSun {
        /// World-space pointer position of the press.
        point: Vec2,
    },
    /// Requests that a placed shooter emits a transient projectile.
    FireProjectile {
        /// Identifier of the plant firing the projectile.
        shooter: EntityId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a plant was committed into the world.
    PlantPlaced {
        /// Identifier assigned to the plant by the world.
        entity: EntityId,
        /// Kind of plant that was placed.
        kind: PlantKind,
        /// Final world-space anchor of the plant.
        position: Vec2,
        /// Cell claimed by the plant when a grid is bound.
        cell: Option<CellIndex>,
        /// Sun debited for the placement.
        cost: Sun,
        /// Ledger balance after the debit.
        balance: Sun,
    },
    /// Reports that a placement commit was rejected without side effects.
    PlacementRejected {
        /// Kind of plant requested for placement.
        kind: PlantKind,
        /// Anchor provided in the placement request.
        position: Vec2,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a plant was removed from the world.
    PlantRemoved {
        /// Identifier of the plant that was removed.
        entity: EntityId,
        /// Kind of the removed plant.
        kind: PlantKind,
        /// Cell released by the removal, if the plant claimed one.
        cell: Option<CellIndex>,
    },
    /// Reports that a plant removal request was rejected.
    PlantRemovalRejected {
        /// Identifier of the plant targeted for removal.
        entity: EntityId,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// Announces that every placed plant was removed and the grid reset.
    PlantsCleared {
        /// Number of plants removed by the reset.
        removed: usize,
    },
    /// Confirms that a sun pickup entered the world.
    SunSpawned {
        /// Identifier assigned to the pickup.
        sun: SunId,
        /// World-space position of the pickup.
        position: Vec2,
        /// Amount the pickup is worth.
        value: Sun,
    },
    /// Confirms that a sun pickup was collected and credited.
    SunCollected {
        /// Identifier of the collected pickup.
        sun: SunId,
        /// Amount credited to the ledger.
        value: Sun,
        /// Ledger balance after the credit.
        balance: Sun,
    },
    /// Reports that a sun pickup left the viewport uncollected.
    SunExpired {
        /// Identifier of the expired pickup.
        sun: SunId,
    },
    /// Confirms that a shooter emitted a projectile.
    ProjectileFired {
        /// Identifier assigned to the transient projectile entity.
        projectile: EntityId,
        /// Identifier of the plant that fired.
        shooter: EntityId,
        /// World-space position the projectile starts from.
        position: Vec2,
    },
    /// Reports that a projectile left the viewport and was discarded.
    ProjectileExpired {
        /// Identifier of the expired projectile.
        projectile: EntityId,
    },
}

/// Amount of sun, the currency gating placement.
///
/// Backed by an unsigned integer so a negative balance is unrepresentable.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Sun(u32);

impl Sun {
    /// Zero sun.
    pub const ZERO: Self = Self(0);

    /// Creates a new sun amount.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric amount.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Adds two amounts, saturating at the numeric bound.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts `other`, returning `None` when the result would be negative.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

/// Unique identifier assigned to an entity stored in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a sun pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SunId(u32);

impl SunId {
    /// Creates a new sun pickup identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex {
    column: u32,
    row: u32,
}

impl CellIndex {
    /// Creates a new grid cell index.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Axis-aligned rectangle expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldRect {
    min: Vec2,
    size: Vec2,
}

impl WorldRect {
    /// Constructs a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Constructs a rectangle of the provided size centred on `center`.
    #[must_use]
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size * 0.5,
            size,
        }
    }

    /// Top-left corner of the rectangle.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Bottom-right corner of the rectangle.
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Dimensions of the rectangle.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Centre point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Reports whether the point lies inside the half-open rectangle
    /// `[min, max)`, matching sprite hit-testing.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.y >= self.min.y && point.x < max.x && point.y < max.y
    }

    /// Reports whether the point lies inside the closed rectangle `[min, max]`.
    #[must_use]
    pub fn contains_inclusive(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.y >= self.min.y && point.x <= max.x && point.y <= max.y
    }

    /// Reports whether two rectangles share a region of positive area.
    ///
    /// Rectangles that only touch along an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &WorldRect) -> bool {
        let self_max = self.max();
        let other_max = other.max();
        self.min.x < other_max.x
            && other.min.x < self_max.x
            && self.min.y < other_max.y
            && other.min.y < self_max.y
    }
}

/// Immutable geometry of the placement grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    cell_size: Vec2,
    origin: Vec2,
    columns: u32,
    rows: u32,
    max_search_radius: u32,
}

impl GridLayout {
    /// Validates and creates a grid layout.
    ///
    /// Cell dimensions must be strictly positive and the grid must contain at
    /// least one row and one column.
    pub fn new(
        cell_size: Vec2,
        origin: Vec2,
        columns: u32,
        rows: u32,
        max_search_radius: u32,
    ) -> Result<Self, GridLayoutError> {
        if !(cell_size.x > 0.0 && cell_size.y > 0.0 && cell_size.is_finite()) {
            return Err(GridLayoutError::NonPositiveCellSize {
                width: cell_size.x,
                height: cell_size.y,
            });
        }
        if columns == 0 || rows == 0 {
            return Err(GridLayoutError::EmptyGrid { columns, rows });
        }
        if !origin.is_finite() {
            return Err(GridLayoutError::NonFiniteOrigin {
                x: origin.x,
                y: origin.y,
            });
        }

        Ok(Self {
            cell_size,
            origin,
            columns,
            rows,
            max_search_radius,
        })
    }

    /// Size of a single cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    /// World-space position of the grid's top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Largest Chebyshev radius examined by nearest-free-cell searches.
    #[must_use]
    pub const fn max_search_radius(&self) -> u32 {
        self.max_search_radius
    }

    /// Total width of the grid measured in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_size.x
    }

    /// Total height of the grid measured in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_size.y
    }

    /// Rectangle covered by the grid in world space.
    #[must_use]
    pub fn area(&self) -> WorldRect {
        WorldRect::from_min_size(self.origin, Vec2::new(self.width(), self.height()))
    }
}

impl Default for GridLayout {
    /// Nine columns by five rows of 80×80 cells anchored at the origin.
    fn default() -> Self {
        Self {
            cell_size: Vec2::new(80.0, 80.0),
            origin: Vec2::ZERO,
            columns: 9,
            rows: 5,
            max_search_radius: 3,
        }
    }
}

/// Reasons a [`GridLayout`] cannot be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum GridLayoutError {
    /// Cells must have a strictly positive, finite width and height.
    #[error("cell size must be positive (received {width}x{height})")]
    NonPositiveCellSize {
        /// Provided cell width.
        width: f32,
        /// Provided cell height.
        height: f32,
    },
    /// Grids need at least one row and one column.
    #[error("grid must contain at least one cell (received {columns} columns, {rows} rows)")]
    EmptyGrid {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// The grid origin must be a finite position.
    #[error("grid origin must be finite (received {x}, {y})")]
    NonFiniteOrigin {
        /// Provided origin x coordinate.
        x: f32,
        /// Provided origin y coordinate.
        y: f32,
    },
}

/// Optional world-space area that bounds placements when no grid is bound.
#[derive(Clone, Debug, PartialEq)]
pub enum PlacementRegion {
    /// Axis-aligned rectangle.
    Rect(WorldRect),
    /// Arbitrary closed polygon described by its vertices in order.
    Polygon(Vec<Vec2>),
}

impl PlacementRegion {
    /// Reports whether the anchor point lies inside the region.
    ///
    /// Polygons use the even-odd rule; fewer than three vertices enclose
    /// nothing.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Self::Rect(rect) => rect.contains(point),
            Self::Polygon(vertices) => polygon_contains(vertices, point),
        }
    }
}

fn polygon_contains(vertices: &[Vec2], point: Vec2) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut previous = vertices[vertices.len() - 1];
    for &current in vertices {
        let crosses = (current.y > point.y) != (previous.y > point.y);
        if crosses {
            let intersection_x = current.x
                + (point.y - current.y) * (previous.x - current.x) / (previous.y - current.y);
            if point.x < intersection_x {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}

/// Distinguishes permanent placements from spawned by-products.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityCategory {
    /// Permanently placed plant that blocks other placements.
    Placed,
    /// In-flight by-product that passes through occupied space freely.
    Transient,
}

/// Types of plants that can be dragged out of the card tray.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantKind {
    /// Shooter that periodically fires transient projectiles.
    Peashooter,
    /// Producer that periodically drops sun pickups.
    Sunflower,
}

impl PlantKind {
    /// Every plant kind in card order.
    pub const ALL: [PlantKind; 2] = [PlantKind::Peashooter, PlantKind::Sunflower];

    /// Sun cost charged when no configuration overrides it.
    #[must_use]
    pub const fn default_cost(self) -> Sun {
        match self {
            Self::Peashooter => Sun::new(100),
            Self::Sunflower => Sun::new(50),
        }
    }

    /// Bounding extent used for overlap tests when no configuration overrides it.
    #[must_use]
    pub const fn default_extent(self) -> Vec2 {
        match self {
            Self::Peashooter | Self::Sunflower => Vec2::new(60.0, 60.0),
        }
    }
}

/// RGBA modulation applied to an entity when presenting it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tint {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Tint {
    /// Translucent neutral tint shown while the candidate could be placed.
    pub const DRAG_ACCEPT: Self = Self::new(1.0, 1.0, 1.0, 0.8);
    /// Translucent red tint shown while the candidate would be rejected.
    pub const DRAG_REJECT: Self = Self::new(1.0, 0.3, 0.3, 0.8);

    /// Creates a new tint from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

/// Presentation state of a plant-like entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VisualState {
    /// Shown inside the card tray.
    Carded,
    /// Following the pointer as a placement candidate.
    Dragging(Tint),
    /// Committed into the lawn.
    Planted,
    /// Flying as a transient projectile.
    Projectile,
}

/// Immutable representation of a registry entity used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Identifier allocated to the entity by the world.
    pub id: EntityId,
    /// Whether the entity blocks placements.
    pub category: EntityCategory,
    /// Plant kind the entity was created from.
    pub kind: PlantKind,
    /// World-space anchor of the entity.
    pub position: Vec2,
    /// Bounding extent centred on the anchor.
    pub extent: Vec2,
    /// Cell claimed by the entity, if any.
    pub cell: Option<CellIndex>,
    /// Presentation state of the entity.
    pub visual: VisualState,
}

impl EntitySnapshot {
    /// Axis-aligned bounds centred on the entity's anchor.
    #[must_use]
    pub fn bounds(&self) -> WorldRect {
        WorldRect::centered(self.position, self.extent)
    }
}

/// Read-only snapshot describing all live registry entities.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over entities that block placements.
    pub fn placed(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.category == EntityCategory::Placed)
    }

    /// Looks up a single entity by identifier.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a falling sun pickup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunPickupSnapshot {
    /// Identifier allocated to the pickup.
    pub id: SunId,
    /// World-space centre of the pickup.
    pub position: Vec2,
    /// Clickable extent centred on the position.
    pub extent: Vec2,
    /// Amount credited when collected.
    pub value: Sun,
}

/// Reasons a placement may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The anchor lies outside the bound grid's area.
    #[error("anchor lies outside the grid area")]
    OutsideGrid,
    /// The cell under the anchor is already claimed.
    #[error("target cell is already occupied")]
    Occupied,
    /// The anchor lies outside the bound placement region.
    #[error("anchor lies outside the placement region")]
    OutsideRegion,
    /// The footprint overlaps another placed entity.
    #[error("footprint overlaps a placed entity")]
    Overlap,
    /// The ledger cannot cover the plant's cost.
    #[error("not enough sun to pay for the plant")]
    InsufficientFunds,
}

/// Reasons a plant removal request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum RemovalError {
    /// No placed plant with the provided identifier exists.
    #[error("no placed plant with that identifier exists")]
    MissingPlant,
}
