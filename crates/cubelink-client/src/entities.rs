//! Fixed-capacity table of remote players visible near the client.
//!
//! The server streams entity spawns and teleports for everything in range;
//! only player entities are kept, in a small fixed pool. When the pool is
//! full, additional players are ignored until a slot frees up.

use glam::{DVec3, Vec3};

use crate::anchor::Anchor;

/// Maximum number of remote players tracked at once.
pub const REMOTE_PLAYER_SLOTS: usize = 8;

/// One tracked remote player, in local feet-space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemotePlayer {
    pub entity_id: i32,
    /// Local position; `y` is the feet height.
    pub pos: Vec3,
}

/// Slot pool of tracked remote players.
#[derive(Debug, Default)]
pub struct RemoteEntityTable {
    slots: [Option<RemotePlayer>; REMOTE_PLAYER_SLOTS],
}

impl RemoteEntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update a player's position, allocating a slot for an unseen id.
    /// Positions arrive in server space and are stored local.
    pub fn upsert(&mut self, entity_id: i32, server_pos: DVec3, anchor: &Anchor) {
        let pos = anchor.server_to_local_or_raw(server_pos);
        if let Some(p) = self.find_mut(entity_id) {
            p.pos = pos;
            return;
        }
        if let Some(slot) = self.slots.iter_mut().find(|s| s.is_none()) {
            *slot = Some(RemotePlayer { entity_id, pos });
        } else {
            tracing::debug!(entity_id, "remote player pool full, ignoring");
        }
    }

    pub fn remove(&mut self, entity_id: i32) {
        for slot in &mut self.slots {
            if slot.is_some_and(|p| p.entity_id == entity_id) {
                *slot = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }

    /// Slide every tracked position when the local frame shifts.
    pub fn shift_xz(&mut self, shift_x: f32, shift_z: f32) {
        for p in self.slots.iter_mut().flatten() {
            p.pos.x -= shift_x;
            p.pos.z -= shift_z;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RemotePlayer> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, entity_id: i32) -> Option<&RemotePlayer> {
        self.slots
            .iter()
            .flatten()
            .find(|p| p.entity_id == entity_id)
    }

    fn find_mut(&mut self, entity_id: i32) -> Option<&mut RemotePlayer> {
        self.slots
            .iter_mut()
            .flatten()
            .find(|p| p.entity_id == entity_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn anchored() -> Anchor {
        let mut a = Anchor::new();
        a.resync(DVec3::new(100.0, 80.0, 200.0));
        a
    }

    #[test]
    fn test_upsert_converts_to_local_space() {
        let anchor = anchored();
        let mut table = RemoteEntityTable::new();
        table.upsert(5, DVec3::new(102.0, 81.0, 199.0), &anchor);
        let p = table.get(5).unwrap();
        // Local spawn is (7.5, 3.0, 7.5); the player is +2/+1/-1 from base.
        assert_eq!(p.pos, Vec3::new(9.5, 4.0, 6.5));
    }

    #[test]
    fn test_upsert_updates_existing_slot() {
        let anchor = anchored();
        let mut table = RemoteEntityTable::new();
        table.upsert(5, DVec3::new(100.0, 80.0, 200.0), &anchor);
        table.upsert(5, DVec3::new(101.0, 80.0, 200.0), &anchor);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(5).unwrap().pos.x, 8.5);
    }

    #[test]
    fn test_pool_exhaustion_drops_new_ids() {
        let anchor = anchored();
        let mut table = RemoteEntityTable::new();
        for id in 0..REMOTE_PLAYER_SLOTS as i32 + 3 {
            table.upsert(id, DVec3::new(100.0, 80.0, 200.0), &anchor);
        }
        assert_eq!(table.len(), REMOTE_PLAYER_SLOTS);
        assert!(table.get(REMOTE_PLAYER_SLOTS as i32).is_none());
        // A freed slot becomes available again.
        table.remove(0);
        table.upsert(99, DVec3::new(100.0, 80.0, 200.0), &anchor);
        assert!(table.get(99).is_some());
    }

    #[test]
    fn test_shift_moves_all_players() {
        let anchor = anchored();
        let mut table = RemoteEntityTable::new();
        table.upsert(1, DVec3::new(100.0, 80.0, 200.0), &anchor);
        table.upsert(2, DVec3::new(104.0, 80.0, 204.0), &anchor);
        table.shift_xz(16.0, -16.0);
        assert_eq!(table.get(1).unwrap().pos, Vec3::new(-8.5, 3.0, 23.5));
        assert_eq!(table.get(2).unwrap().pos, Vec3::new(-4.5, 3.0, 27.5));
    }

    #[test]
    fn test_clear_empties_pool() {
        let anchor = anchored();
        let mut table = RemoteEntityTable::new();
        table.upsert(1, DVec3::new(100.0, 80.0, 200.0), &anchor);
        table.clear();
        assert!(table.is_empty());
    }
}
