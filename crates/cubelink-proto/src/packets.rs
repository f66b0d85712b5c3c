//! Packet ids and serverbound packet builders for the pinned server dialect.
//!
//! Ids are protocol-version-specific constants of the bareiron 1.21.x
//! dialect this client targets; they are configuration, not general
//! protocol facts. Builders produce a [`PacketWriter`] body (no length
//! prefix); the connection layer prepends the frame length when sending.

use crate::codec::PacketWriter;

/// Protocol version sent in the handshake.
pub const PROTOCOL_VERSION: i32 = 772;

/// Player names longer than this are truncated before login.
pub const MAX_PLAYER_NAME_LEN: usize = 16;

/// Clientbound packet ids.
pub mod clientbound {
    pub const ADD_ENTITY: i32 = 0x01;
    pub const LOGIN_SUCCESS: i32 = 0x02;
    pub const FINISH_CONFIGURATION: i32 = 0x03;
    pub const KNOWN_PACKS: i32 = 0x0E;
    pub const TELEPORT_ENTITY: i32 = 0x1F;
    pub const KEEP_ALIVE: i32 = 0x26;
    pub const CHUNK_DATA: i32 = 0x27;
    pub const PLAY_READY: i32 = 0x2B;
    pub const SYNC_PLAYER_POSITION: i32 = 0x41;
    pub const REMOVE_ENTITIES: i32 = 0x46;
    pub const SET_CENTER_CHUNK: i32 = 0x57;
}

/// Serverbound packet ids. Several values repeat across handshake, login,
/// configuration and play stages; the stage disambiguates them.
pub mod serverbound {
    pub const HANDSHAKE: i32 = 0x00;
    pub const LOGIN_START: i32 = 0x00;
    pub const CLIENT_INFORMATION: i32 = 0x00;
    pub const BRAND_PLUGIN_MESSAGE: i32 = 0x02;
    pub const LOGIN_ACK: i32 = 0x03;
    pub const CONFIG_ACK: i32 = 0x03;
    pub const KNOWN_PACKS_ACK: i32 = 0x07;
    pub const KEEP_ALIVE: i32 = 0x1B;
    pub const MOVE_PLAYER_POS_ROT: i32 = 0x1E;
    pub const PLAYER_ACTION: i32 = 0x28;
    pub const PLAYER_LOADED: i32 = 0x2B;
    pub const SET_HELD_ITEM: i32 = 0x34;
    pub const USE_ITEM_ON: i32 = 0x3F;
}

/// Block faces as the server numbers them, derived from a surface normal.
/// Dominant axis wins; a degenerate normal maps to the top face.
pub fn face_from_normal(nx: i32, ny: i32, nz: i32) -> u8 {
    if ny < 0 {
        0
    } else if ny > 0 {
        1
    } else if nz < 0 {
        2
    } else if nz > 0 {
        3
    } else if nx < 0 {
        4
    } else if nx > 0 {
        5
    } else {
        1
    }
}

/// Pack a block position into the 26/12/26-bit wire encoding
/// (x in the top 26 bits, z in the middle, y in the low 12).
pub fn encode_block_pos(x: i32, y: i32, z: i32) -> u64 {
    let ux = (x as u64) & 0x3FF_FFFF;
    let uy = (y as u64) & 0xFFF;
    let uz = (z as u64) & 0x3FF_FFFF;
    (ux << 38) | (uz << 12) | uy
}

/// Derive the deterministic login UUID from a 64-bit station id: the id
/// big-endian in the high half, an XOR fold of it in the low half.
pub fn build_login_uuid(station_id: u64) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[..8].copy_from_slice(&station_id.to_be_bytes());
    for i in 8..16 {
        out[i] = out[i - 8] ^ (0x5Au8.wrapping_add((i as u8).wrapping_mul(11)));
    }
    out
}

pub fn handshake(host: &str, port: u16) -> PacketWriter {
    let mut p = PacketWriter::new();
    p.write_varint(serverbound::HANDSHAKE);
    p.write_varint(PROTOCOL_VERSION);
    p.write_str(host);
    p.write_u16(port);
    p.write_varint(2); // next state: login
    p
}

pub fn login_start(player_name: &str, uuid: &[u8; 16]) -> PacketWriter {
    let mut p = PacketWriter::new();
    p.write_varint(serverbound::LOGIN_START);
    p.write_str(player_name);
    p.write_bytes(uuid);
    p
}

pub fn login_ack() -> PacketWriter {
    let mut p = PacketWriter::new();
    p.write_varint(serverbound::LOGIN_ACK);
    p
}

pub fn brand_plugin_message(brand: &str) -> PacketWriter {
    let mut p = PacketWriter::new();
    p.write_varint(serverbound::BRAND_PLUGIN_MESSAGE);
    p.write_str("minecraft:brand");
    p.write_str(brand);
    p
}

pub fn client_information(locale: &str, view_distance: u8) -> PacketWriter {
    let mut p = PacketWriter::new();
    p.write_varint(serverbound::CLIENT_INFORMATION);
    p.write_str(locale);
    p.write_u8(view_distance);
    p.write_varint(0); // chat mode: enabled
    p.write_u8(1); // chat colors
    p.write_u8(0x7F); // skin parts
    p.write_varint(1); // main hand: right
    p.write_u8(0); // text filtering
    p.write_u8(1); // allow listing
    p.write_varint(0); // particle status
    p
}

pub fn known_packs_ack() -> PacketWriter {
    let mut p = PacketWriter::new();
    p.write_varint(serverbound::KNOWN_PACKS_ACK);
    p
}

pub fn config_ack() -> PacketWriter {
    let mut p = PacketWriter::new();
    p.write_varint(serverbound::CONFIG_ACK);
    p
}

pub fn player_loaded() -> PacketWriter {
    let mut p = PacketWriter::new();
    p.write_varint(serverbound::PLAYER_LOADED);
    p
}

pub fn keep_alive(token: u64) -> PacketWriter {
    let mut p = PacketWriter::new();
    p.write_varint(serverbound::KEEP_ALIVE);
    p.write_u64(token);
    p
}

pub fn move_player_pos_rot(
    x: f64,
    y: f64,
    z: f64,
    yaw_deg: f32,
    pitch_deg: f32,
    on_ground: bool,
) -> PacketWriter {
    let mut p = PacketWriter::new();
    p.write_varint(serverbound::MOVE_PLAYER_POS_ROT);
    p.write_f64(x);
    p.write_f64(y);
    p.write_f64(z);
    p.write_f32(yaw_deg);
    p.write_f32(pitch_deg);
    p.write_u8(u8::from(on_ground));
    p
}

pub fn set_held_item(slot: u16) -> PacketWriter {
    let mut p = PacketWriter::new();
    p.write_varint(serverbound::SET_HELD_ITEM);
    p.write_u16(slot);
    p
}

/// Place a block against the given face. Cursor position is sent as the
/// block centre; this server ignores it.
pub fn use_item_on(x: i32, y: i32, z: i32, face: u8, sequence: i32) -> PacketWriter {
    let mut p = PacketWriter::new();
    p.write_varint(serverbound::USE_ITEM_ON);
    p.write_u8(0); // main hand
    p.write_u64(encode_block_pos(x, y, z));
    p.write_u8(face);
    p.write_f32(0.5);
    p.write_f32(0.5);
    p.write_f32(0.5);
    p.write_u8(0); // inside block
    p.write_u8(0); // world border hit
    p.write_varint(sequence);
    p
}

/// Finish mining the block at the given position.
pub fn player_action_finish_mining(x: i32, y: i32, z: i32, face: u8, sequence: i32) -> PacketWriter {
    let mut p = PacketWriter::new();
    p.write_varint(serverbound::PLAYER_ACTION);
    p.write_u8(2); // status: finish mining
    p.write_u64(encode_block_pos(x, y, z));
    p.write_u8(face);
    p.write_varint(sequence);
    p
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ByteReader;

    #[test]
    fn test_handshake_layout() {
        let p = handshake("example.net", 25565);
        assert!(p.ok());
        let mut r = ByteReader::new(p.as_bytes());
        assert_eq!(r.read_varint(), Some(serverbound::HANDSHAKE));
        assert_eq!(r.read_varint(), Some(PROTOCOL_VERSION));
        assert_eq!(r.read_str_bytes(), Some(b"example.net".as_ref()));
        assert_eq!(r.read_u16(), Some(25565));
        assert_eq!(r.read_varint(), Some(2));
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_login_start_carries_name_and_uuid() {
        let uuid = build_login_uuid(0xA1B2_C3D4_E5F6_0718);
        let p = login_start("steve", &uuid);
        let mut r = ByteReader::new(p.as_bytes());
        assert_eq!(r.read_varint(), Some(serverbound::LOGIN_START));
        assert_eq!(r.read_str_bytes(), Some(b"steve".as_ref()));
        assert_eq!(r.read_bytes(16), Some(uuid.as_ref()));
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_login_uuid_is_deterministic_and_folded() {
        let a = build_login_uuid(42);
        let b = build_login_uuid(42);
        assert_eq!(a, b);
        assert_eq!(&a[..8], &42u64.to_be_bytes());
        for i in 8..16 {
            assert_eq!(a[i], a[i - 8] ^ (0x5A + (i as u8) * 11));
        }
        assert_ne!(a, build_login_uuid(43));
    }

    #[test]
    fn test_block_pos_encoding() {
        let v = encode_block_pos(100, 64, -200);
        assert_eq!(v >> 38, 100);
        assert_eq!(v & 0xFFF, 64);
        // z occupies the middle 26 bits, sign-truncated.
        assert_eq!((v >> 12) & 0x3FF_FFFF, (-200i64 as u64) & 0x3FF_FFFF);
    }

    #[test]
    fn test_face_from_normal_six_directions() {
        assert_eq!(face_from_normal(0, -1, 0), 0);
        assert_eq!(face_from_normal(0, 1, 0), 1);
        assert_eq!(face_from_normal(0, 0, -1), 2);
        assert_eq!(face_from_normal(0, 0, 1), 3);
        assert_eq!(face_from_normal(-1, 0, 0), 4);
        assert_eq!(face_from_normal(1, 0, 0), 5);
        assert_eq!(face_from_normal(0, 0, 0), 1);
    }

    #[test]
    fn test_movement_packet_layout() {
        let p = move_player_pos_rot(1.5, 80.0, -2.5, 90.0, -30.0, true);
        let mut r = ByteReader::new(p.as_bytes());
        assert_eq!(r.read_varint(), Some(serverbound::MOVE_PLAYER_POS_ROT));
        assert_eq!(r.read_f64(), Some(1.5));
        assert_eq!(r.read_f64(), Some(80.0));
        assert_eq!(r.read_f64(), Some(-2.5));
        assert_eq!(r.read_f32(), Some(90.0));
        assert_eq!(r.read_f32(), Some(-30.0));
        assert_eq!(r.read_u8(), Some(1));
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_use_item_on_carries_sequence() {
        let p = use_item_on(3, 5, 7, 1, 9);
        let mut r = ByteReader::new(p.as_bytes());
        assert_eq!(r.read_varint(), Some(serverbound::USE_ITEM_ON));
        assert_eq!(r.read_u8(), Some(0));
        assert_eq!(r.read_u64(), Some(encode_block_pos(3, 5, 7)));
        assert_eq!(r.read_u8(), Some(1));
        r.skip(12).unwrap(); // cursor floats
        assert_eq!(r.read_u8(), Some(0));
        assert_eq!(r.read_u8(), Some(0));
        assert_eq!(r.read_varint(), Some(9));
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_keep_alive_echo_token() {
        let p = keep_alive(0xDEAD_BEEF_CAFE_F00D);
        let mut r = ByteReader::new(p.as_bytes());
        assert_eq!(r.read_varint(), Some(serverbound::KEEP_ALIVE));
        assert_eq!(r.read_u64(), Some(0xDEAD_BEEF_CAFE_F00D));
    }
}
