//! The local voxel window: a small fixed-size grid mirroring the region of
//! the remote world around the player, plus the decoder that fills it from
//! streamed chunk payloads, an offline terrain fallback, and the physics
//! query surface consumed by movement and rendering collaborators.

pub mod decode;
pub mod r#gen;
pub mod grid;
pub mod palette;
pub mod physics;

pub use decode::apply_chunk_frame;
pub use r#gen::build_world;
pub use grid::{Block, VoxelGrid, WORLD_D, WORLD_H, WORLD_W};
pub use physics::{
    EYE_HEIGHT, PLAYER_HEIGHT, PLAYER_RADIUS, RayHit, is_player_colliding, raycast_center,
    support_y_below,
};
