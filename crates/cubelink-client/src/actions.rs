//! Player-initiated block and hotbar actions.
//!
//! Actions are only forwarded while fully in play with a valid anchor;
//! outside that window they report `false` and change nothing. The server
//! remains authoritative over the world — confirmed edits arrive back as
//! chunk data — but edits can optionally be predicted into the local grid
//! for immediate feedback.

use cubelink_proto::packets::{self, face_from_normal};
use cubelink_world::{Block, RayHit};
use glam::IVec3;

use crate::session::{Session, SessionError};
use crate::stage::Stage;

/// Hotbar slots available to the client.
pub const HOTBAR_SLOTS: u8 = 9;

impl Session {
    /// Select a hotbar slot, notifying the server when in play.
    pub fn set_held_slot(&mut self, slot: u8) -> Result<(), SessionError> {
        if slot >= HOTBAR_SLOTS {
            return Ok(());
        }
        self.held_slot = slot;
        if self.stage() == Stage::Play {
            self.queue(packets::set_held_item(u16::from(slot)))?;
        }
        Ok(())
    }

    /// Place the held block against the struck face of `hit`.
    ///
    /// Returns `Ok(true)` when the request was queued. `block` is what a
    /// predicted edit writes into the grid; the server decides what is
    /// actually placed.
    pub fn try_place_block(&mut self, hit: &RayHit, block: Block) -> Result<bool, SessionError> {
        let Some(target) = self.action_target(hit.block) else {
            return Ok(false);
        };
        let face = face_from_normal(hit.normal.x, hit.normal.y, hit.normal.z);
        let seq = self.next_sequence();
        self.queue(packets::use_item_on(target.x, target.y, target.z, face, seq))?;

        if self.params().predict_edits {
            self.grid.set(hit.prev.x, hit.prev.y, hit.prev.z, block);
        }
        Ok(true)
    }

    /// Break the block struck by `hit`.
    pub fn try_break_block(&mut self, hit: &RayHit) -> Result<bool, SessionError> {
        let Some(target) = self.action_target(hit.block) else {
            return Ok(false);
        };
        let face = face_from_normal(hit.normal.x, hit.normal.y, hit.normal.z);
        let seq = self.next_sequence();
        self.queue(packets::player_action_finish_mining(
            target.x, target.y, target.z, face, seq,
        ))?;

        if self.params().predict_edits {
            self.grid.set(hit.block.x, hit.block.y, hit.block.z, Block::Air);
        }
        Ok(true)
    }

    /// Server block coordinates for a targeted local cell, or `None` when
    /// gameplay actions are not currently allowed.
    fn action_target(&self, cell: IVec3) -> Option<IVec3> {
        if self.stage() != Stage::Play || !self.anchor.is_valid() {
            return None;
        }
        Some(self.anchor.block_to_server(cell))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
