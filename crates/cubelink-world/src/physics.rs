//! Player collision and targeting queries against the voxel grid.
//!
//! Everything here is read-only over [`VoxelGrid`] and operates in local
//! grid space. The camera sits [`EYE_HEIGHT`] above the feet; collision
//! uses a simple axis-aligned box swept over the covered cells.

use glam::{IVec3, Vec3};

use crate::grid::{VoxelGrid, WORLD_D, WORLD_H, WORLD_W};

/// Camera height above the feet, in voxels.
pub const EYE_HEIGHT: f32 = 1.72;
/// Full player bounding-box height.
pub const PLAYER_HEIGHT: f32 = 1.82;
/// Player bounding-box half-width on X and Z.
pub const PLAYER_RADIUS: f32 = 0.27;

/// Ray march step length.
const RAY_STEP: f32 = 0.08;
/// Maximum targeting distance.
const RAY_MAX_DIST: f32 = 12.0;
/// Distance at which the march starts, skipping the player's own head.
const RAY_START: f32 = 0.2;

/// Vertical inset applied to the collision box, so a box resting exactly
/// on a surface does not register as colliding with it.
const COLLIDE_Y_INSET: f32 = 0.02;

/// Result of a centre-of-view raycast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayHit {
    /// The solid voxel that was struck.
    pub block: IVec3,
    /// Last air voxel sampled before the strike; where a placement goes.
    pub prev: IVec3,
    /// Unit-axis face normal, derived from `prev - block`.
    pub normal: IVec3,
}

/// Highest solid voxel at column `(x, z)` at or below the player's feet,
/// or `None` when the column is outside the grid or fully air.
pub fn support_y_below(grid: &VoxelGrid, x: i32, z: i32, cam_y: f32) -> Option<i32> {
    if x < 0 || z < 0 || x >= WORLD_W as i32 || z >= WORLD_D as i32 {
        return None;
    }
    let y0 = ((cam_y - EYE_HEIGHT).floor() as i32).clamp(0, WORLD_H as i32 - 1);
    (0..=y0).rev().find(|&y| grid.is_solid(x, y, z))
}

/// Whether the player's box overlaps any solid voxel when the camera is at
/// `cam`. A box poking below the grid floor always counts as colliding.
pub fn is_player_colliding(grid: &VoxelGrid, cam: Vec3) -> bool {
    let foot = cam.y - EYE_HEIGHT;
    let head = foot + PLAYER_HEIGHT;

    let min_y = foot + COLLIDE_Y_INSET;
    let max_y = head - COLLIDE_Y_INSET;
    if min_y < 0.0 {
        return true;
    }

    let x0 = (cam.x - PLAYER_RADIUS).floor() as i32;
    let x1 = (cam.x + PLAYER_RADIUS).floor() as i32;
    let y0 = (min_y.floor() as i32).max(0);
    let y1 = (max_y.floor() as i32).min(WORLD_H as i32 - 1);
    let z0 = (cam.z - PLAYER_RADIUS).floor() as i32;
    let z1 = (cam.z + PLAYER_RADIUS).floor() as i32;
    if y0 > y1 {
        return false;
    }

    for x in x0..=x1 {
        for y in y0..=y1 {
            for z in z0..=z1 {
                if grid.is_solid(x, y, z) {
                    return true;
                }
            }
        }
    }
    false
}

/// March a ray from the camera along the view direction and return the
/// first solid voxel, with the placement cell and struck face.
///
/// `yaw` and `pitch` are in radians; yaw 0 looks toward +Z.
pub fn raycast_center(grid: &VoxelGrid, cam: Vec3, yaw: f32, pitch: f32) -> Option<RayHit> {
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    let dir = Vec3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch);

    let mut prev: Option<IVec3> = None;
    let mut t = RAY_START;
    while t <= RAY_MAX_DIST {
        let p = cam + dir * t;
        let v = IVec3::new(p.x.floor() as i32, p.y.floor() as i32, p.z.floor() as i32);

        if grid.is_solid(v.x, v.y, v.z) {
            // Without an air sample in front the top face is assumed.
            let prev = prev.unwrap_or(IVec3::new(v.x, v.y + 1, v.z));
            return Some(RayHit {
                block: v,
                prev,
                normal: face_normal(prev - v),
            });
        }

        prev = Some(v);
        t += RAY_STEP;
    }
    None
}

/// Snap a cell-to-cell delta onto its dominant axis as a unit normal.
/// Ties prefer Y, then X.
fn face_normal(d: IVec3) -> IVec3 {
    let a = d.abs();
    if a.y >= a.x && a.y >= a.z {
        IVec3::new(0, if d.y >= 0 { 1 } else { -1 }, 0)
    } else if a.x >= a.z {
        IVec3::new(if d.x >= 0 { 1 } else { -1 }, 0, 0)
    } else {
        IVec3::new(0, 0, if d.z >= 0 { 1 } else { -1 })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
