//! Clientbound frame parsing.
//!
//! Frames are parsed by packet id alone; several ids are reused across
//! protocol stages, so the session decides which parsed packets are
//! meaningful for its current stage and ignores the rest. A frame that is
//! too short or structurally malformed parses to `None` and is dropped —
//! only framing-level violations ever cost the connection.

use cubelink_proto::{ByteReader, packets::clientbound};
use glam::DVec3;

/// Entity type ids the server uses for player entities.
pub fn is_player_entity_type(entity_type: i32) -> bool {
    entity_type == 149 || entity_type == 157
}

/// A parsed clientbound packet. `ChunkData` borrows its payload from the
/// frame head rather than copying it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clientbound<'a> {
    LoginSuccess,
    KnownPacks,
    FinishConfiguration,
    PlayReady,
    KeepAlive {
        token: u64,
    },
    SyncPlayerPosition {
        teleport_id: i32,
        pos: DVec3,
    },
    AddEntity {
        entity_id: i32,
        entity_type: i32,
        pos: DVec3,
    },
    TeleportEntity {
        entity_id: i32,
        pos: DVec3,
    },
    RemoveEntity {
        entity_id: i32,
    },
    SetCenterChunk {
        cx: i32,
        cz: i32,
    },
    ChunkData {
        payload: &'a [u8],
    },
    /// Recognized id space, ignored content.
    Unknown {
        id: i32,
    },
}

/// Parse one frame head into a packet, or `None` to drop the frame.
pub fn parse(head: &[u8]) -> Option<Clientbound<'_>> {
    let mut r = ByteReader::new(head);
    let id = r.read_varint()?;

    let pkt = match id {
        clientbound::LOGIN_SUCCESS => Clientbound::LoginSuccess,
        clientbound::KNOWN_PACKS => Clientbound::KnownPacks,
        clientbound::FINISH_CONFIGURATION => Clientbound::FinishConfiguration,
        clientbound::PLAY_READY => Clientbound::PlayReady,
        clientbound::KEEP_ALIVE => Clientbound::KeepAlive {
            token: r.read_u64()?,
        },
        clientbound::SYNC_PLAYER_POSITION => {
            let teleport_id = r.read_varint()?;
            let pos = read_dvec3(&mut r)?;
            // Velocity and look direction are read for validation only.
            read_dvec3(&mut r)?;
            r.read_f32()?;
            r.read_f32()?;
            Clientbound::SyncPlayerPosition { teleport_id, pos }
        }
        clientbound::ADD_ENTITY => {
            let entity_id = r.read_varint()?;
            r.skip(16)?; // UUID
            let entity_type = r.read_varint()?;
            let pos = read_dvec3(&mut r)?;
            r.skip(3)?; // pitch, yaw, head yaw
            r.read_varint()?; // entity data
            // Velocity shorts must be present for a well-formed packet.
            if r.remaining() < 6 {
                return None;
            }
            Clientbound::AddEntity {
                entity_id,
                entity_type,
                pos,
            }
        }
        clientbound::TELEPORT_ENTITY => {
            let entity_id = r.read_varint()?;
            let pos = read_dvec3(&mut r)?;
            Clientbound::TeleportEntity { entity_id, pos }
        }
        clientbound::REMOVE_ENTITIES => Clientbound::RemoveEntity {
            entity_id: r.read_varint()?,
        },
        clientbound::SET_CENTER_CHUNK => {
            let cx = r.read_varint()?;
            let cz = r.read_varint()?;
            Clientbound::SetCenterChunk { cx, cz }
        }
        clientbound::CHUNK_DATA => Clientbound::ChunkData { payload: r.rest() },
        other => Clientbound::Unknown { id: other },
    };
    Some(pkt)
}

fn read_dvec3(r: &mut ByteReader<'_>) -> Option<DVec3> {
    Some(DVec3::new(r.read_f64()?, r.read_f64()?, r.read_f64()?))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
