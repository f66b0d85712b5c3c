//! Wire-format primitives for the cubelink block-game protocol.
//!
//! The protocol is a pinned binary dialect: every frame is prefixed with a
//! varint length, packet payloads mix varints, big-endian fixed-width
//! integers, IEEE floats and varint-length-prefixed strings. The layout is a
//! wire-format constant of the target server; nothing here goes through a
//! generic serializer.

pub mod codec;
pub mod framing;
pub mod packets;

pub use codec::{ByteReader, PACKET_WRITER_CAP, PacketWriter, encode_varint};
pub use framing::{FRAME_HEAD_CAP, FrameAssembler, FrameError, FrameView, MAX_FRAME_LEN, Progress};
