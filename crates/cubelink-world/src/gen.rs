//! Offline fallback terrain.
//!
//! When no server is reachable the client still needs something to stand
//! on, so the grid is filled with a small simplex-noise island: a rolling
//! grass surface over dirt and stone, a bedrock floor, and sparse caves
//! and ore pockets underground.

use noise::{NoiseFn, Simplex};

use crate::grid::{Block, VoxelGrid, WORLD_D, WORLD_H, WORLD_W};

/// Surface height midpoint, in voxels above the bedrock floor.
const HEIGHT_MID: f64 = 5.8;
/// Surface height swing applied to the noise sample.
const HEIGHT_AMP: f64 = 1.65;
/// Column heights are clamped to this range.
const HEIGHT_MIN: i32 = 3;
const HEIGHT_MAX: i32 = WORLD_H as i32 - 1;

/// Cave carving threshold on the 3D sample.
const CAVE_THRESHOLD: f64 = 0.70;
/// Ore placement threshold on the 3D sample.
const ORE_THRESHOLD: f64 = 0.62;

/// Deterministic terrain generator for the local grid.
pub struct WorldGenerator {
    terrain: Simplex,
    caves: Simplex,
    ore: Simplex,
}

impl WorldGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            terrain: Simplex::new(seed),
            caves: Simplex::new(seed.wrapping_add(1)),
            ore: Simplex::new(seed.wrapping_add(2)),
        }
    }

    /// Column surface height for `(x, z)`, in `[HEIGHT_MIN, HEIGHT_MAX]`.
    fn column_height(&self, x: i32, z: i32) -> i32 {
        let n = self.terrain.get([f64::from(x) * 0.23, f64::from(z) * 0.21]) * 2.9;
        let h = (HEIGHT_MID + n * HEIGHT_AMP) as i32;
        h.clamp(HEIGHT_MIN, HEIGHT_MAX)
    }

    /// Fill `grid` with generated terrain, replacing its previous content.
    pub fn build(&self, grid: &mut VoxelGrid) {
        grid.clear();
        for x in 0..WORLD_W as i32 {
            for z in 0..WORLD_D as i32 {
                let h = self.column_height(x, z);

                for y in 0..h {
                    let block = if y == h - 1 {
                        Block::Grass
                    } else if y >= h - 3 {
                        Block::Dirt
                    } else {
                        Block::Stone
                    };
                    grid.set(x, y, z, block);
                }

                grid.set(x, 0, z, Block::Bedrock);

                // Carve caves and seed ore below the dirt layer, keeping
                // the surface and the two lowest rows intact.
                if h >= 6 {
                    for y in 2..=h - 3 {
                        let p = [f64::from(x) * 0.87, f64::from(y) * 0.41, f64::from(z) * 0.79];
                        if self.caves.get(p) > CAVE_THRESHOLD {
                            grid.set(x, y, z, Block::Air);
                            continue;
                        }
                        if grid.get(x, y, z) == Block::Stone {
                            let q =
                                [f64::from(x) * 1.21, f64::from(y) * 0.77, f64::from(z) * 1.07];
                            if self.ore.get(q) > ORE_THRESHOLD {
                                grid.set(x, y, z, Block::Ore);
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Build offline terrain for `seed` into `grid`.
pub fn build_world(grid: &mut VoxelGrid, seed: u32) {
    WorldGenerator::new(seed).build(grid);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
