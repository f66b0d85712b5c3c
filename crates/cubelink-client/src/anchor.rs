//! Mapping between the small local grid and server world coordinates.
//!
//! The local grid always represents the server chunk the player stands in,
//! so positions are kept in two frames: server space (doubles, absolute)
//! and local feet-space (floats, relative to the grid origin). The anchor
//! records one correspondence point between the frames — the server
//! position from the last position sync paired with the fixed local spawn —
//! and all conversions are offsets from that pair.

use glam::{DVec3, IVec3, Vec3};

/// Local feet-space point the player is re-anchored to on every position
/// sync: the middle of the grid, a few blocks up.
pub const LOCAL_SPAWN: Vec3 = Vec3::new(7.5, 3.0, 7.5);

/// Server feet Y assumed before the first position sync arrives.
const DEFAULT_SERVER_FEET_Y: f64 = 80.0;

/// The local↔server correspondence established by a position sync.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    valid: bool,
    server_base: DVec3,
    local_anchor: Vec3,
    server_feet_y: f64,
}

impl Anchor {
    pub fn new() -> Self {
        Self {
            valid: false,
            server_base: DVec3::new(0.0, DEFAULT_SERVER_FEET_Y, 0.0),
            local_anchor: Vec3::ZERO,
            server_feet_y: DEFAULT_SERVER_FEET_Y,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Forget the correspondence (connection reset).
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Re-anchor at `server_pos` (feet), pairing it with [`LOCAL_SPAWN`].
    pub fn resync(&mut self, server_pos: DVec3) {
        self.server_base = server_pos;
        self.server_feet_y = server_pos.y;
        self.local_anchor = LOCAL_SPAWN;
        self.valid = true;
    }

    /// Slide the local frame when the focus chunk moves: every local
    /// position (including this anchor point) shifts by `-shift` so the
    /// player stays near the window centre.
    pub fn shift_xz(&mut self, shift_x: f32, shift_z: f32) {
        self.local_anchor.x -= shift_x;
        self.local_anchor.z -= shift_z;
    }

    /// Server feet Y from the last sync or movement report. Chunk decoding
    /// anchors its vertical window here.
    pub fn server_feet_y(&self) -> f64 {
        self.server_feet_y
    }

    /// Record the feet Y most recently reported to the server.
    pub fn set_server_feet_y(&mut self, y: f64) {
        self.server_feet_y = y;
    }

    /// Local feet-space position to server space.
    ///
    /// Without a valid anchor, X/Z pass through and Y is offset to the
    /// assumed server height so early movement reports are plausible.
    pub fn local_to_server(&self, local_feet: Vec3) -> DVec3 {
        if self.valid {
            self.server_base + (local_feet - self.local_anchor).as_dvec3()
        } else {
            DVec3::new(
                f64::from(local_feet.x),
                DEFAULT_SERVER_FEET_Y + f64::from(local_feet.y),
                f64::from(local_feet.z),
            )
        }
    }

    /// Server-space position to local feet-space.
    pub fn server_to_local(&self, server: DVec3) -> Vec3 {
        self.local_anchor + (server - self.server_base).as_vec3()
    }

    /// Like [`server_to_local`](Self::server_to_local), but passes raw
    /// coordinates through when no anchor exists yet.
    pub fn server_to_local_or_raw(&self, server: DVec3) -> Vec3 {
        if self.valid {
            self.server_to_local(server)
        } else {
            server.as_vec3()
        }
    }

    /// Translate a local grid cell into server block coordinates.
    pub fn block_to_server(&self, cell: IVec3) -> IVec3 {
        let s = self.server_base + (cell.as_dvec3() - self.local_anchor.as_dvec3());
        IVec3::new(
            s.x.floor() as i32,
            s.y.floor() as i32,
            s.z.floor() as i32,
        )
    }
}

impl Default for Anchor {
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
    fn test_resync_pins_local_spawn() {
        let mut a = Anchor::new();
        assert!(!a.is_valid());
        a.resync(DVec3::new(100.0, 80.0, -40.0));
        assert!(a.is_valid());
        assert_eq!(a.server_to_local(DVec3::new(100.0, 80.0, -40.0)), LOCAL_SPAWN);
        assert_eq!(a.server_feet_y(), 80.0);
    }

    #[test]
    fn test_round_trip_through_both_frames() {
        let mut a = Anchor::new();
        a.resync(DVec3::new(256.25, 71.0, -19.5));
        let local = Vec3::new(3.0, 5.5, 12.0);
        let server = a.local_to_server(local);
        let back = a.server_to_local(server);
        assert!((back - local).length() < 1e-4);
    }

    #[test]
    fn test_unanchored_fallback_offsets_y_only() {
        let a = Anchor::new();
        let server = a.local_to_server(Vec3::new(7.5, 3.0, 7.5));
        assert_eq!(server, DVec3::new(7.5, 83.0, 7.5));
        assert_eq!(
            a.server_to_local_or_raw(DVec3::new(1.0, 2.0, 3.0)),
            Vec3::new(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn test_shift_keeps_server_mapping_consistent() {
        let mut a = Anchor::new();
        a.resync(DVec3::new(0.0, 80.0, 0.0));
        let server_probe = DVec3::new(4.0, 80.0, 4.0);
        let before = a.server_to_local(server_probe);
        // Focus chunk moved +1 on X: local frame slides 16 back.
        a.shift_xz(16.0, 0.0);
        let after = a.server_to_local(server_probe);
        assert_eq!(after, before - Vec3::new(16.0, 0.0, 0.0));
    }

    #[test]
    fn test_block_to_server_floors_coordinates() {
        let mut a = Anchor::new();
        a.resync(DVec3::new(100.25, 80.0, -40.75));
        let cell = IVec3::new(7, 3, 7);
        let s = a.block_to_server(cell);
        // spawn (7.5, 3.0, 7.5) maps to the server base, so cell (7,3,7)
        // lands half a block behind it on x/z.
        assert_eq!(s, IVec3::new(99, 80, -42));
    }
}
