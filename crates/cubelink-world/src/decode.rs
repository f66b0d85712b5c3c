//! Streamed chunk payload decoding into the local voxel window.
//!
//! A chunk-data frame carries the whole 32-section column; only the
//! sections intersecting the locally visible vertical window (anchored a
//! few blocks under the player's feet) are translated into grid cells.
//! The payload may be truncated by the framing layer — every read is
//! bounds-checked and a structural failure stops decoding without touching
//! any state beyond the sections already applied.

use cubelink_proto::ByteReader;

use crate::grid::{Block, VoxelGrid, WORLD_H};
use crate::palette::{map_server_block, map_uniform_state};

/// Sections per chunk column in this dialect.
const SECTION_COUNT: i32 = 32;
/// World Y of the bottom of section 0.
const SECTION_BASE_Y: i32 = -64;
/// Packed block bytes per non-uniform section (16×16×16 cells).
const SECTION_DATA_BYTES: usize = 4096;

/// Decode one chunk-data payload (bytes after the packet id) into `grid`.
///
/// The chunk must match the current centre focus chunk; anything else is
/// stale and dropped. Returns `true` iff at least one section wrote into
/// the window — the grid is zeroed right before the first such write, so a
/// successful application never leaves stale cells behind, while a dropped
/// frame leaves the previous grid fully intact.
pub fn apply_chunk_frame(
    grid: &mut VoxelGrid,
    payload: &[u8],
    center_chunk: Option<(i32, i32)>,
    server_feet_y: f64,
) -> bool {
    let mut r = ByteReader::new(payload);

    let (Some(chunk_x), Some(chunk_z)) = (r.read_i32(), r.read_i32()) else {
        return false;
    };
    let Some((center_x, center_z)) = center_chunk else {
        return false;
    };
    if chunk_x != center_x || chunk_z != center_z {
        tracing::debug!(chunk_x, chunk_z, center_x, center_z, "stale chunk dropped");
        return false;
    }

    // Heightmap NBT: length-prefixed, irrelevant to the window.
    let Some(heightmap_len) = r.read_varint() else {
        return false;
    };
    if heightmap_len < 0 || r.skip(heightmap_len as usize).is_none() {
        return false;
    }

    let Some(chunk_data_len) = r.read_varint() else {
        return false;
    };
    if chunk_data_len <= 0 {
        return false;
    }

    let window_min_y = server_feet_y.floor() as i32 - 3;
    let window_max_y = window_min_y + (WORLD_H as i32 - 1);

    let mut cleared = false;
    let mut wrote_any = false;

    for section in 0..SECTION_COUNT {
        if r.read_u16().is_none() {
            break; // non-air count
        }
        let Some(bits_per_entry) = r.read_u8() else {
            break;
        };

        let section_y0 = SECTION_BASE_Y + section * 16;
        let intersects = section_y0 + 15 >= window_min_y && section_y0 <= window_max_y;

        if bits_per_entry == 0 {
            // Uniform section: one palette state, then the biome container.
            let Some(state) = r.read_varint() else {
                break;
            };
            if r.skip(2).is_none() {
                break;
            }
            if !intersects {
                continue;
            }
            if !cleared {
                grid.clear();
                cleared = true;
            }
            let mapped = map_uniform_state(state);
            for ly in 0..WORLD_H as i32 {
                let server_y = window_min_y + ly;
                if server_y < section_y0 || server_y > section_y0 + 15 {
                    continue;
                }
                for x in 0..16 {
                    for z in 0..16 {
                        grid.set(x, ly, z, mapped);
                    }
                }
            }
            wrote_any = true;
            continue;
        }

        // Palette entries are global state ids the local palette ignores.
        let Some(palette_len) = r.read_varint() else {
            break;
        };
        if palette_len <= 0 {
            break;
        }
        let mut palette_ok = true;
        for _ in 0..palette_len {
            if r.read_varint().is_none() {
                palette_ok = false;
                break;
            }
        }
        if !palette_ok {
            break;
        }

        let Some(section_data) = r.read_bytes(SECTION_DATA_BYTES) else {
            break;
        };
        if r.skip(2).is_none() {
            break; // biome container
        }

        if !intersects {
            continue;
        }
        if !cleared {
            grid.clear();
            cleared = true;
        }

        for ly in 0..WORLD_H as i32 {
            let server_y = window_min_y + ly;
            if server_y < section_y0 || server_y > section_y0 + 15 {
                continue;
            }
            let dy = server_y - section_y0;
            for z in 0..16i32 {
                for x in 0..16i32 {
                    let block = section_data[packed_index(x, z, dy)];
                    grid.set(x, ly, z, map_server_block(block));
                }
            }
        }
        wrote_any = true;
    }

    wrote_any
}

/// Byte index of cell `(x, z, dy)` in a packed section array.
///
/// The low three address bits are XOR-reversed within each 8-byte group —
/// a pinned quirk of this server dialect's packed-section layout.
fn packed_index(x: i32, z: i32, dy: i32) -> usize {
    let addr = (x + (z << 4) + (dy << 8)) as usize;
    (addr & !7) | (7 - (addr & 7))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn push_varint(out: &mut Vec<u8>, v: i32) {
        let mut buf = [0u8; 5];
        let n = cubelink_proto::encode_varint(&mut buf, v).unwrap();
        out.extend_from_slice(&buf[..n]);
    }

    /// A uniform (bits-per-entry 0) section with the given palette state.
    fn push_uniform_section(out: &mut Vec<u8>, state: i32) {
        out.extend_from_slice(&0u16.to_be_bytes()); // non-air count
        out.push(0); // bits per entry
        push_varint(out, state);
        out.extend_from_slice(&[0, 0]); // biome container
    }

    /// A packed section with every byte set to `fill`.
    fn push_packed_section(out: &mut Vec<u8>, fill: u8) -> usize {
        out.extend_from_slice(&4096u16.to_be_bytes());
        out.push(8); // bits per entry (anything non-zero)
        push_varint(out, 2); // palette length
        push_varint(out, 0);
        push_varint(out, 16);
        let data_start = out.len();
        out.extend_from_slice(&[fill; SECTION_DATA_BYTES]);
        out.extend_from_slice(&[0, 0]); // biome container
        data_start
    }

    /// Payload header: chunk coords, empty heightmap, chunk-data size.
    fn payload_header(chunk_x: i32, chunk_z: i32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&chunk_x.to_be_bytes());
        out.extend_from_slice(&chunk_z.to_be_bytes());
        push_varint(&mut out, 0); // heightmap NBT length
        push_varint(&mut out, 1); // chunk data size (value unused)
        out
    }

    /// Feet at 80.0: window covers server Y 77..=90, crossing sections
    /// 8 (64..=79) and 9 (80..=95).
    const FEET_Y: f64 = 80.0;

    #[test]
    fn test_uniform_sections_fill_window() {
        let mut payload = payload_header(0, 0);
        for section in 0..SECTION_COUNT {
            // Sections 8 and 9 solid, everything else air.
            push_uniform_section(&mut payload, i32::from(section == 8 || section == 9));
        }

        let mut grid = VoxelGrid::new();
        assert!(apply_chunk_frame(&mut grid, &payload, Some((0, 0)), FEET_Y));
        // Every cell of the window lies in section 8 or 9.
        for ly in 0..WORLD_H as i32 {
            assert_eq!(grid.get(0, ly, 0), Block::Stone, "ly={ly}");
        }
    }

    #[test]
    fn test_packed_section_uses_xor_permutation() {
        let mut payload = payload_header(0, 0);
        let mut target_data_start = 0;
        for section in 0..SECTION_COUNT {
            if section == 9 {
                target_data_start = push_packed_section(&mut payload, 16); // stone
            } else {
                push_uniform_section(&mut payload, 0);
            }
        }
        // Cell (x=1, z=2) at the bottom of section 9 (dy=0): the raw
        // address is 33, which the 3-bit XOR maps to byte 38.
        payload[target_data_start + 38] = 13; // grass

        let mut grid = VoxelGrid::new();
        assert!(apply_chunk_frame(&mut grid, &payload, Some((0, 0)), FEET_Y));
        // Section 9 starts at server Y 80 = local ly 3.
        assert_eq!(grid.get(1, 3, 2), Block::Grass);
        assert_eq!(grid.get(0, 3, 0), Block::Stone);
        // Below the section boundary the window shows section 8 (air here).
        assert_eq!(grid.get(1, 2, 2), Block::Air);
    }

    #[test]
    fn test_stale_chunk_leaves_grid_unmodified() {
        let mut payload = payload_header(5, -3);
        for _ in 0..SECTION_COUNT {
            push_uniform_section(&mut payload, 1);
        }

        let mut grid = VoxelGrid::new();
        grid.set(4, 4, 4, Block::Wood);
        assert!(!apply_chunk_frame(&mut grid, &payload, Some((0, 0)), FEET_Y));
        assert_eq!(grid.get(4, 4, 4), Block::Wood);
        assert_eq!(grid.solid_count(), 1);
    }

    #[test]
    fn test_no_center_chunk_drops_frame() {
        let mut payload = payload_header(0, 0);
        push_uniform_section(&mut payload, 1);
        let mut grid = VoxelGrid::new();
        assert!(!apply_chunk_frame(&mut grid, &payload, None, FEET_Y));
    }

    #[test]
    fn test_structural_failure_before_any_write_keeps_grid() {
        // Header only — truncated before the first section.
        let payload = payload_header(0, 0);
        let mut grid = VoxelGrid::new();
        grid.set(1, 1, 1, Block::Sand);
        assert!(!apply_chunk_frame(&mut grid, &payload, Some((0, 0)), FEET_Y));
        assert_eq!(grid.get(1, 1, 1), Block::Sand);
    }

    #[test]
    fn test_truncation_after_applied_section_still_applies() {
        // Sections 0..=8 complete (8 writes into the window), then the
        // payload is cut mid-section-9.
        let mut payload = payload_header(0, 0);
        for section in 0..9 {
            push_uniform_section(&mut payload, i32::from(section == 8));
        }
        payload.extend_from_slice(&4096u16.to_be_bytes());
        payload.push(8); // bits per entry, then nothing

        let mut grid = VoxelGrid::new();
        assert!(apply_chunk_frame(&mut grid, &payload, Some((0, 0)), FEET_Y));
        // Window rows inside section 8 (server Y 77..=79 → ly 0..=2) are
        // solid; rows for the truncated section 9 stay cleared.
        assert_eq!(grid.get(0, 0, 0), Block::Stone);
        assert_eq!(grid.get(0, 2, 0), Block::Stone);
        assert_eq!(grid.get(0, 3, 0), Block::Air);
    }

    #[test]
    fn test_negative_heightmap_length_drops_frame() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&0i32.to_be_bytes());
        payload.extend_from_slice(&0i32.to_be_bytes());
        push_varint(&mut payload, -1);
        let mut grid = VoxelGrid::new();
        assert!(!apply_chunk_frame(&mut grid, &payload, Some((0, 0)), FEET_Y));
    }

    #[test]
    fn test_zero_chunk_data_size_drops_frame() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&0i32.to_be_bytes());
        payload.extend_from_slice(&0i32.to_be_bytes());
        push_varint(&mut payload, 0); // heightmap
        push_varint(&mut payload, 0); // chunk data size
        let mut grid = VoxelGrid::new();
        assert!(!apply_chunk_frame(&mut grid, &payload, Some((0, 0)), FEET_Y));
    }

    #[test]
    fn test_first_window_write_zeroes_stale_cells() {
        let mut payload = payload_header(0, 0);
        for section in 0..SECTION_COUNT {
            push_uniform_section(&mut payload, i32::from(section == 8));
        }

        let mut grid = VoxelGrid::new();
        grid.set(9, 9, 9, Block::Ore); // stale cell from a previous chunk
        assert!(apply_chunk_frame(&mut grid, &payload, Some((0, 0)), FEET_Y));
        // ly 9 is server Y 86, inside section 9 which decoded as air.
        assert_eq!(grid.get(9, 9, 9), Block::Air);
    }

    #[test]
    fn test_packed_index_permutation_pins_layout() {
        // addr 0 → byte 7, addr 7 → byte 0, addr 8 → byte 15.
        assert_eq!(packed_index(0, 0, 0), 7);
        assert_eq!(packed_index(7, 0, 0), 0);
        assert_eq!(packed_index(8, 0, 0), 15);
        // (x=1, z=2, dy=0): addr 33 → byte 38 (used by the decode test).
        assert_eq!(packed_index(1, 2, 0), 38);
        // Highest cell: addr 4095 → byte 4088.
        assert_eq!(packed_index(15, 15, 15), 4088);
    }
}
