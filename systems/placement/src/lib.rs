#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure placement validator combining grid occupancy, region membership and
//! overlap detection into a single admit/reject decision.
//!
//! The validator never mutates state. It is queried every frame while a
//! candidate is dragged and once more when the candidate is dropped.

use glam::Vec2;
use lawn_defence_core::{
    CellIndex, EntityCategory, EntityId, EntityView, PlacementError, PlacementRegion, Sun,
    WorldRect,
};
use lawn_defence_world::{query, Grid, World};

/// Geometry of a placement under consideration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementProbe {
    /// World-space anchor checked against the grid or region.
    pub anchor: Vec2,
    /// Bounding extent centred on the anchor.
    pub extent: Vec2,
    /// Category of the entity being placed.
    pub category: EntityCategory,
    /// Registry entity excluded from overlap tests, typically the probe itself.
    pub ignore: Option<EntityId>,
}

impl PlacementProbe {
    /// Describes a permanent placement anchored at the provided position.
    #[must_use]
    pub const fn placed(anchor: Vec2, extent: Vec2) -> Self {
        Self {
            anchor,
            extent,
            category: EntityCategory::Placed,
            ignore: None,
        }
    }

    /// Describes a transient by-product anchored at the provided position.
    #[must_use]
    pub const fn transient(anchor: Vec2, extent: Vec2) -> Self {
        Self {
            anchor,
            extent,
            category: EntityCategory::Transient,
            ignore: None,
        }
    }

    /// Excludes the provided registry entity from overlap tests.
    #[must_use]
    pub const fn ignoring(mut self, entity: EntityId) -> Self {
        self.ignore = Some(entity);
        self
    }

    /// Axis-aligned bounds of the probe.
    #[must_use]
    pub fn bounds(&self) -> WorldRect {
        WorldRect::centered(self.anchor, self.extent)
    }
}

/// Validator assembled from whichever collaborators are bound.
///
/// Missing collaborators degrade to the next-best check: without a grid the
/// region bounds the anchor, without either the positional check passes, and
/// without an entity view nothing can overlap.
#[derive(Clone, Copy, Debug, Default)]
pub struct Validator<'a> {
    grid: Option<&'a Grid>,
    region: Option<&'a PlacementRegion>,
    entities: Option<&'a EntityView>,
}

impl<'a> Validator<'a> {
    /// Creates a validator with no collaborators bound.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            grid: None,
            region: None,
            entities: None,
        }
    }

    /// Binds every collaborator the world exposes.
    #[must_use]
    pub fn for_world(world: &'a World, entities: &'a EntityView) -> Self {
        Self {
            grid: query::grid(world),
            region: query::placement_region(world),
            entities: Some(entities),
        }
    }

    /// Binds a placement grid.
    #[must_use]
    pub const fn with_grid(mut self, grid: &'a Grid) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Binds a fallback placement region.
    #[must_use]
    pub const fn with_region(mut self, region: &'a PlacementRegion) -> Self {
        self.region = Some(region);
        self
    }

    /// Binds the registry view used for overlap tests.
    #[must_use]
    pub const fn with_entities(mut self, entities: &'a EntityView) -> Self {
        self.entities = Some(entities);
        self
    }

    /// Grid bound to the validator, if any.
    #[must_use]
    pub const fn grid(&self) -> Option<&'a Grid> {
        self.grid
    }

    /// Evaluates the probe, reporting the first failing check.
    pub fn check(&self, probe: &PlacementProbe) -> Result<(), PlacementError> {
        match (self.grid, self.region) {
            (Some(grid), _) => {
                if !grid.is_point_in_grid_area(probe.anchor) {
                    return Err(PlacementError::OutsideGrid);
                }
                if !grid.is_cell_free(grid.world_to_cell(probe.anchor)) {
                    return Err(PlacementError::Occupied);
                }
            }
            (None, Some(region)) => {
                if !region.contains(probe.anchor) {
                    return Err(PlacementError::OutsideRegion);
                }
            }
            (None, None) => {}
        }

        if probe.category == EntityCategory::Transient {
            return Ok(());
        }

        let Some(entities) = self.entities else {
            return Ok(());
        };
        let bounds = probe.bounds();
        let blocked = entities
            .placed()
            .filter(|entity| Some(entity.id) != probe.ignore)
            .any(|entity| entity.bounds().overlaps(&bounds));
        if blocked {
            return Err(PlacementError::Overlap);
        }

        Ok(())
    }

    /// Reports whether the probe passes every bound check.
    #[must_use]
    pub fn can_place(&self, probe: &PlacementProbe) -> bool {
        self.check(probe).is_ok()
    }

    /// Cell the anchor would claim, when a grid is bound and contains it.
    #[must_use]
    pub fn target_cell(&self, anchor: Vec2) -> Option<CellIndex> {
        self.grid
            .filter(|grid| grid.is_point_in_grid_area(anchor))
            .map(|grid| grid.world_to_cell(anchor))
    }
}

/// Currency half of the release check.
#[must_use]
pub fn affordable(balance: Sun, cost: Sun) -> bool {
    balance >= cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use lawn_defence_core::{EntitySnapshot, GridLayout, PlantKind, VisualState};

    fn planted(id: u32, position: Vec2, extent: Vec2) -> EntitySnapshot {
        EntitySnapshot {
            id: EntityId::new(id),
            category: EntityCategory::Placed,
            kind: PlantKind::Sunflower,
            position,
            extent,
            cell: None,
            visual: VisualState::Planted,
        }
    }

    #[test]
    fn validator_without_collaborators_accepts_anything() {
        let validator = Validator::new();
        assert!(validator.can_place(&PlacementProbe::placed(
            Vec2::new(-1.0e6, 4.0e6),
            Vec2::splat(60.0)
        )));
        assert_eq!(validator.target_cell(Vec2::ZERO), None);
    }

    #[test]
    fn probe_ignores_itself_when_checking_overlap() {
        let view = EntityView::from_snapshots(vec![planted(
            3,
            Vec2::new(100.0, 100.0),
            Vec2::splat(60.0),
        )]);
        let validator = Validator::new().with_entities(&view);
        let probe = PlacementProbe::placed(Vec2::new(110.0, 100.0), Vec2::splat(60.0));

        assert_eq!(validator.check(&probe), Err(PlacementError::Overlap));
        assert_eq!(validator.check(&probe.ignoring(EntityId::new(3))), Ok(()));
    }

    #[test]
    fn target_cell_requires_the_anchor_inside_the_grid() {
        let grid = Grid::new(GridLayout::default());
        let validator = Validator::new().with_grid(&grid);

        assert_eq!(
            validator.target_cell(Vec2::new(100.0, 30.0)),
            Some(CellIndex::new(1, 0))
        );
        assert_eq!(validator.target_cell(Vec2::new(-5.0, 30.0)), None);
    }

    #[test]
    fn affordability_is_inclusive() {
        assert!(affordable(Sun::new(100), Sun::new(100)));
        assert!(!affordable(Sun::new(99), Sun::new(100)));
    }
}
