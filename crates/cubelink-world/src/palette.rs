//! Mapping from server block-type codes to the local palette.
//!
//! The server's block registry has hundreds of states; the client renders a
//! handful of materials. The membership sets below are pinned against the
//! bareiron server's registry — they are dialect constants, not vanilla
//! protocol facts.

use crate::grid::Block;

/// Collapse a server block code into the local palette.
pub fn map_server_block(code: u8) -> Block {
    match code {
        // Passable blocks and fluids render as air.
        0..=12 | 15 | 84 | 86 | 132 | 156 => Block::Air,
        37 => Block::Bedrock,
        13 | 30 | 33 | 198 => Block::Grass,
        14 | 31 | 32 | 141 => Block::Dirt,
        21 | 43..=46 | 57 | 137 | 153 | 218 | 239 => Block::Ore,
        35 | 47..=53 | 128 | 139 | 143 | 148 | 162 | 164 | 176 | 194 => Block::Wood,
        38..=42 | 60..=62 | 217 => Block::Sand,
        _ => Block::Stone,
    }
}

/// Map a single-state (uniform) section palette entry.
///
/// In this server's generated payloads state 0 is air; any other uniform
/// section is treated as solid fallback.
pub fn map_uniform_state(state_id: i32) -> Block {
    if state_id == 0 { Block::Air } else { Block::Stone }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passable_and_fluid_codes_are_air() {
        for code in [0u8, 1, 6, 12, 15, 84, 86, 132, 156] {
            assert_eq!(map_server_block(code), Block::Air, "code {code}");
        }
    }

    #[test]
    fn test_group_representatives() {
        assert_eq!(map_server_block(37), Block::Bedrock);
        assert_eq!(map_server_block(13), Block::Grass);
        assert_eq!(map_server_block(198), Block::Grass);
        assert_eq!(map_server_block(14), Block::Dirt);
        assert_eq!(map_server_block(141), Block::Dirt);
        assert_eq!(map_server_block(21), Block::Ore);
        assert_eq!(map_server_block(239), Block::Ore);
        assert_eq!(map_server_block(35), Block::Wood);
        assert_eq!(map_server_block(194), Block::Wood);
        assert_eq!(map_server_block(38), Block::Sand);
        assert_eq!(map_server_block(217), Block::Sand);
    }

    #[test]
    fn test_unknown_codes_fall_back_to_stone() {
        for code in [16u8, 34, 99, 200, 255] {
            assert_eq!(map_server_block(code), Block::Stone, "code {code}");
        }
    }

    #[test]
    fn test_uniform_state_mapping() {
        assert_eq!(map_uniform_state(0), Block::Air);
        assert_eq!(map_uniform_state(1), Block::Stone);
        assert_eq!(map_uniform_state(9), Block::Stone);
    }
}
