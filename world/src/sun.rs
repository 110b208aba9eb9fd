//! Falling sun pickups waiting to be collected.

use std::collections::BTreeMap;

use glam::Vec2;
use lawn_defence_core::{Sun, SunId, SunPickupSnapshot, WorldRect};

#[derive(Clone, Debug)]
struct SunPickup {
    position: Vec2,
    velocity: Vec2,
    extent: Vec2,
    value: Sun,
}

/// Collection of live sun pickups keyed by identifier.
#[derive(Debug)]
pub(crate) struct SunPickups {
    entries: BTreeMap<SunId, SunPickup>,
    next_sun_id: SunId,
}

impl SunPickups {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_sun_id: SunId::new(0),
        }
    }

    pub(crate) fn spawn(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        extent: Vec2,
        value: Sun,
    ) -> SunId {
        let id = self.next_sun_id;
        self.next_sun_id = SunId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(
            id,
            SunPickup {
                position,
                velocity,
                extent,
                value,
            },
        );
        id
    }

    /// Removes the lowest-id pickup whose bounds contain `point`.
    pub(crate) fn collect_at(&mut self, point: Vec2) -> Option<(SunId, Sun)> {
        let id = self
            .entries
            .iter()
            .find(|(_, pickup)| WorldRect::centered(pickup.position, pickup.extent).contains(point))
            .map(|(id, _)| *id)?;
        self.entries.remove(&id).map(|pickup| (id, pickup.value))
    }

    /// Moves every pickup and discards those that fell below `bottom_edge`.
    pub(crate) fn advance(&mut self, seconds: f32, bottom_edge: f32) -> Vec<SunId> {
        let mut expired = Vec::new();
        for (id, pickup) in &mut self.entries {
            pickup.position += pickup.velocity * seconds;
            if pickup.position.y > bottom_edge {
                expired.push(*id);
            }
        }
        for id in &expired {
            let _ = self.entries.remove(id);
        }
        expired
    }

    pub(crate) fn snapshots(&self) -> Vec<SunPickupSnapshot> {
        self.entries
            .iter()
            .map(|(id, pickup)| SunPickupSnapshot {
                id: *id,
                position: pickup.position,
                extent: pickup.extent,
                value: pickup.value,
            })
            .collect()
    }
}
