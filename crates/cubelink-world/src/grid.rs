//! Dense fixed-size voxel storage.
//!
//! The grid covers one 16×16 chunk column, 14 voxels tall — the window the
//! renderer and physics can afford. Any cell outside the bounds is
//! implicitly [`Block::Air`]: reads return Air, writes are dropped. The
//! grid has a single writer (world generation, chunk decode, confirmed
//! edits); collaborators only read.

/// Grid width along X, in voxels.
pub const WORLD_W: usize = 16;
/// Grid height along Y, in voxels.
pub const WORLD_H: usize = 14;
/// Grid depth along Z, in voxels.
pub const WORLD_D: usize = 16;

/// Local block palette. Small on purpose: the render path only carries a
/// handful of materials, so every server block collapses into one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Block {
    #[default]
    Air = 0,
    Grass = 1,
    Dirt = 2,
    Stone = 3,
    Wood = 4,
    Sand = 5,
    Ore = 6,
    Bedrock = 7,
}

impl Block {
    pub fn is_solid(self) -> bool {
        self != Block::Air
    }

    /// Short label for the status/hotbar display.
    pub fn short_name(self) -> &'static str {
        match self {
            Block::Air => "air",
            Block::Grass => "grs",
            Block::Dirt => "drt",
            Block::Stone => "stn",
            Block::Wood => "wod",
            Block::Sand => "snd",
            Block::Ore => "ore",
            Block::Bedrock => "bdr",
        }
    }
}

/// The local voxel window.
#[derive(Clone)]
pub struct VoxelGrid {
    cells: [[[Block; WORLD_D]; WORLD_H]; WORLD_W],
}

impl VoxelGrid {
    /// An all-air grid.
    pub fn new() -> Self {
        Self {
            cells: [[[Block::Air; WORLD_D]; WORLD_H]; WORLD_W],
        }
    }

    pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && (x as usize) < WORLD_W
            && y >= 0
            && (y as usize) < WORLD_H
            && z >= 0
            && (z as usize) < WORLD_D
    }

    /// Read a cell; out-of-bounds cells are air.
    pub fn get(&self, x: i32, y: i32, z: i32) -> Block {
        if Self::in_bounds(x, y, z) {
            self.cells[x as usize][y as usize][z as usize]
        } else {
            Block::Air
        }
    }

    /// Write a cell; out-of-bounds writes are dropped.
    pub fn set(&mut self, x: i32, y: i32, z: i32, block: Block) {
        if Self::in_bounds(x, y, z) {
            self.cells[x as usize][y as usize][z as usize] = block;
        }
    }

    pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        self.get(x, y, z).is_solid()
    }

    /// Reset every cell to air.
    pub fn clear(&mut self) {
        self.cells = [[[Block::Air; WORLD_D]; WORLD_H]; WORLD_W];
    }

    /// Count non-air cells. Diagnostic helper for tests and status output.
    pub fn solid_count(&self) -> usize {
        let mut n = 0;
        for col in &self.cells {
            for layer in col {
                for &b in layer {
                    if b.is_solid() {
                        n += 1;
                    }
                }
            }
        }
        n
    }
}

impl Default for VoxelGrid {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_all_air() {
        let grid = VoxelGrid::new();
        assert_eq!(grid.solid_count(), 0);
        assert_eq!(grid.get(0, 0, 0), Block::Air);
    }

    #[test]
    fn test_set_get_roundtrip() {
        let mut grid = VoxelGrid::new();
        grid.set(3, 5, 7, Block::Stone);
        assert_eq!(grid.get(3, 5, 7), Block::Stone);
        assert!(grid.is_solid(3, 5, 7));
        assert_eq!(grid.solid_count(), 1);
    }

    #[test]
    fn test_out_of_bounds_reads_are_air() {
        let mut grid = VoxelGrid::new();
        grid.set(0, 0, 0, Block::Bedrock);
        for (x, y, z) in [
            (-1, 0, 0),
            (WORLD_W as i32, 0, 0),
            (0, -1, 0),
            (0, WORLD_H as i32, 0),
            (0, 0, -1),
            (0, 0, WORLD_D as i32),
        ] {
            assert_eq!(grid.get(x, y, z), Block::Air);
            assert!(!grid.is_solid(x, y, z));
        }
    }

    #[test]
    fn test_out_of_bounds_writes_are_dropped() {
        let mut grid = VoxelGrid::new();
        grid.set(-1, 0, 0, Block::Stone);
        grid.set(0, WORLD_H as i32, 0, Block::Stone);
        grid.set(0, 0, 99, Block::Stone);
        assert_eq!(grid.solid_count(), 0);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut grid = VoxelGrid::new();
        for x in 0..WORLD_W as i32 {
            grid.set(x, 2, 2, Block::Dirt);
        }
        assert_eq!(grid.solid_count(), WORLD_W);
        grid.clear();
        assert_eq!(grid.solid_count(), 0);
    }
}
