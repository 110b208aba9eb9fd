//! Authoritative registry of placed plants and transient projectiles.

use std::collections::BTreeMap;

use glam::Vec2;
use lawn_defence_core::{
    CellIndex, EntityCategory, EntityId, EntitySnapshot, PlantKind, VisualState, WorldRect,
};

/// State of an entity stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct EntityState {
    /// Whether the entity blocks placements.
    pub(crate) category: EntityCategory,
    /// Plant kind the entity was created from.
    pub(crate) kind: PlantKind,
    /// World-space anchor of the entity.
    pub(crate) position: Vec2,
    /// Bounding extent centred on the anchor.
    pub(crate) extent: Vec2,
    /// Cell claimed by the entity, if any.
    pub(crate) cell: Option<CellIndex>,
    /// Displacement applied per simulated second.
    pub(crate) velocity: Vec2,
}

impl EntityState {
    /// Describes a plant committed at the provided anchor.
    pub(crate) fn plant(
        kind: PlantKind,
        position: Vec2,
        extent: Vec2,
        cell: Option<CellIndex>,
    ) -> Self {
        Self {
            category: EntityCategory::Placed,
            kind,
            position,
            extent,
            cell,
            velocity: Vec2::ZERO,
        }
    }

    /// Describes a projectile emitted by a shooter of the provided kind.
    pub(crate) fn projectile(
        kind: PlantKind,
        position: Vec2,
        extent: Vec2,
        velocity: Vec2,
    ) -> Self {
        Self {
            category: EntityCategory::Transient,
            kind,
            position,
            extent,
            cell: None,
            velocity,
        }
    }

    fn bounds(&self) -> WorldRect {
        WorldRect::centered(self.position, self.extent)
    }

    fn visual(&self) -> VisualState {
        match self.category {
            EntityCategory::Placed => VisualState::Planted,
            EntityCategory::Transient => VisualState::Projectile,
        }
    }
}

/// Registry that stores entities and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EntityRegistry {
    entries: BTreeMap<EntityId, EntityState>,
    next_entity_id: EntityId,
}

impl EntityRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_entity_id: EntityId::new(0),
        }
    }

    /// Stores the entity and returns its freshly allocated identifier.
    pub(crate) fn insert(&mut self, state: EntityState) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id = EntityId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(id, state);
        id
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&EntityState> {
        self.entries.get(&id)
    }

    pub(crate) fn remove(&mut self, id: EntityId) -> Option<EntityState> {
        self.entries.remove(&id)
    }

    /// Removes every entity, returning how many were stored.
    pub(crate) fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    /// Reports whether any placed entity overlaps the provided bounds.
    ///
    /// Transient entities never block.
    pub(crate) fn blocks(&self, bounds: &WorldRect) -> bool {
        self.entries
            .values()
            .filter(|state| state.category == EntityCategory::Placed)
            .any(|state| state.bounds().overlaps(bounds))
    }

    /// Moves transient entities and discards those past `right_edge`.
    ///
    /// Returns the identifiers of discarded entities in ascending order.
    pub(crate) fn advance_projectiles(&mut self, seconds: f32, right_edge: f32) -> Vec<EntityId> {
        let mut expired = Vec::new();
        for (id, state) in &mut self.entries {
            if state.category != EntityCategory::Transient {
                continue;
            }
            state.position += state.velocity * seconds;
            if state.position.x > right_edge {
                expired.push(*id);
            }
        }
        for id in &expired {
            let _ = self.entries.remove(id);
        }
        expired
    }

    /// Snapshots every entity in identifier order.
    pub(crate) fn snapshots(&self) -> Vec<EntitySnapshot> {
        self.entries
            .iter()
            .map(|(id, state)| EntitySnapshot {
                id: *id,
                category: state.category,
                kind: state.kind,
                position: state.position,
                extent: state.extent,
                cell: state.cell,
                visual: state.visual(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let registry = EntityRegistry::new();
        assert!(registry.entries.is_empty());
        assert_eq!(registry.next_entity_id.get(), 0);
    }

    #[test]
    fn identifiers_are_allocated_sequentially() {
        let mut registry = EntityRegistry::new();
        let first = registry.insert(EntityState::plant(
            PlantKind::Sunflower,
            Vec2::ZERO,
            Vec2::splat(60.0),
            None,
        ));
        let second = registry.insert(EntityState::plant(
            PlantKind::Peashooter,
            Vec2::ONE,
            Vec2::splat(60.0),
            None,
        ));

        assert_eq!(first, EntityId::new(0));
        assert_eq!(second, EntityId::new(1));
        assert!(registry.remove(first).is_some());
        assert!(registry.get(first).is_none());
    }

    #[test]
    fn projectiles_move_and_expire_while_plants_stay_put() {
        let mut registry = EntityRegistry::new();
        let plant = registry.insert(EntityState::plant(
            PlantKind::Peashooter,
            Vec2::new(40.0, 40.0),
            Vec2::splat(60.0),
            None,
        ));
        let projectile = registry.insert(EntityState::projectile(
            PlantKind::Peashooter,
            Vec2::new(40.0, 40.0),
            Vec2::splat(20.0),
            Vec2::new(400.0, 0.0),
        ));

        assert!(registry.advance_projectiles(0.5, 1000.0).is_empty());
        let snapshots = registry.snapshots();
        assert_eq!(snapshots[0].position, Vec2::new(40.0, 40.0));
        assert_eq!(snapshots[1].position, Vec2::new(240.0, 40.0));
        assert_eq!(snapshots[1].visual, VisualState::Projectile);

        let over_projectile = WorldRect::centered(Vec2::new(240.0, 40.0), Vec2::splat(20.0));
        assert!(!registry.blocks(&over_projectile), "projectiles never block");
        let over_plant = WorldRect::centered(Vec2::new(60.0, 40.0), Vec2::splat(20.0));
        assert!(registry.blocks(&over_plant));

        assert_eq!(registry.advance_projectiles(2.0, 1000.0), vec![projectile]);
        assert!(registry.get(plant).is_some());
        assert_eq!(registry.clear(), 1);
    }
}
