//! Socket-free protocol session.
//!
//! The session consumes completed frames and produces outbound packet
//! bodies in a queue; it never touches a socket. The connection driver
//! feeds frames in, drains the queue out, and turns a [`SessionError`]
//! into a connection reset. Keeping the session synchronous makes the
//! whole login sequence and every play-stage behavior testable in-process.

use cubelink_proto::{FrameView, PacketWriter, packets};
use cubelink_world::{EYE_HEIGHT, VoxelGrid, apply_chunk_frame, is_player_colliding};
use glam::Vec3;

use crate::anchor::{Anchor, LOCAL_SPAWN};
use crate::entities::RemoteEntityTable;
use crate::protocol::{self, Clientbound};
use crate::stage::{LinkStatus, Stage};

/// Session failures that require dropping the connection.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// An outbound packet body overflowed the fixed writer capacity.
    #[error("outbound packet exceeded writer capacity")]
    PacketOverflow,
}

/// Connection parameters snapshotted from the config.
#[derive(Debug, Clone)]
pub struct SessionParams {
    pub host: String,
    pub port: u16,
    pub player_name: String,
    pub station_id: u64,
    pub locale: String,
    pub view_distance: u8,
    pub predict_edits: bool,
}

impl SessionParams {
    pub fn from_config(config: &cubelink_config::Config) -> Self {
        Self {
            host: config.network.host.trim().to_string(),
            port: if config.network.port == 0 {
                25565
            } else {
                config.network.port
            },
            player_name: sanitize_player_name(&config.network.player_name),
            station_id: config.network.station_id,
            locale: config.game.locale.clone(),
            view_distance: config.game.view_distance,
            predict_edits: config.game.predict_edits,
        }
    }
}

/// Trim, default and cap a configured player name.
pub fn sanitize_player_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "cubelink".to_string();
    }
    trimmed.chars().take(packets::MAX_PLAYER_NAME_LEN).collect()
}

/// The locally controlled player, in local camera space.
#[derive(Debug, Clone, Copy)]
pub struct LocalPlayer {
    /// Camera position; feet are [`EYE_HEIGHT`] below.
    pub pos: Vec3,
    /// Yaw in radians, 0 looking toward +Z.
    pub yaw: f32,
    /// Pitch in radians, positive looking up.
    pub pitch: f32,
}

impl Default for LocalPlayer {
    fn default() -> Self {
        Self {
            pos: LOCAL_SPAWN + Vec3::new(0.0, EYE_HEIGHT, 0.0),
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

/// Protocol state machine plus the world state it maintains.
pub struct Session {
    params: SessionParams,
    stage: Stage,
    status: LinkStatus,
    pub grid: VoxelGrid,
    pub anchor: Anchor,
    pub entities: RemoteEntityTable,
    pub player: LocalPlayer,
    center_chunk: Option<(i32, i32)>,
    have_remote_world: bool,
    sent_known_packs_ack: bool,
    sent_config_ack: bool,
    sent_player_loaded: bool,
    pub(crate) action_sequence: i32,
    pub(crate) held_slot: u8,
    chunk_rx: u32,
    chunk_applied: u32,
    chunk_dropped: u32,
    outbound: Vec<Vec<u8>>,
}

impl Session {
    pub fn new(params: SessionParams) -> Self {
        Self {
            params,
            stage: Stage::Idle,
            status: LinkStatus::Disconnected,
            grid: VoxelGrid::new(),
            anchor: Anchor::new(),
            entities: RemoteEntityTable::new(),
            player: LocalPlayer::default(),
            center_chunk: None,
            have_remote_world: false,
            sent_known_packs_ack: false,
            sent_config_ack: false,
            sent_player_loaded: false,
            action_sequence: 1,
            held_slot: 0,
            chunk_rx: 0,
            chunk_applied: 0,
            chunk_dropped: 0,
            outbound: Vec::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn status(&self) -> LinkStatus {
        self.status
    }

    pub fn set_status(&mut self, status: LinkStatus) {
        if self.status != status {
            tracing::info!(status = status.label(), "link status");
            self.status = status;
        }
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    pub fn set_params(&mut self, params: SessionParams) {
        self.params = params;
    }

    /// Whether the world shown is streamed from the server.
    pub fn have_remote_world(&self) -> bool {
        self.have_remote_world
    }

    /// Chunk counters: received, applied, dropped.
    pub fn chunk_stats(&self) -> (u32, u32, u32) {
        (self.chunk_rx, self.chunk_applied, self.chunk_dropped)
    }

    /// Queued outbound packet bodies, handing ownership to the caller.
    pub fn drain_outbound(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.outbound)
    }

    /// Drop all connection-scoped state and report `status`.
    pub fn reset(&mut self, status: LinkStatus) {
        self.stage = Stage::Idle;
        self.sent_known_packs_ack = false;
        self.sent_config_ack = false;
        self.sent_player_loaded = false;
        self.anchor.invalidate();
        self.center_chunk = None;
        self.have_remote_world = false;
        self.entities.clear();
        self.grid.clear();
        self.outbound.clear();
        self.set_status(status);
    }

    /// Start a fresh login on a newly opened connection: queues the
    /// handshake and login start and arms the state machine.
    pub fn begin_connect(&mut self) -> Result<(), SessionError> {
        self.reset(LinkStatus::WaitLogin);
        let uuid = packets::build_login_uuid(self.params.station_id);
        self.queue(packets::handshake(&self.params.host, self.params.port))?;
        self.queue(packets::login_start(&self.params.player_name, &uuid))?;
        self.stage = Stage::AwaitingLoginSuccess;
        Ok(())
    }

    /// Handle one completed frame.
    ///
    /// Malformed or stage-inappropriate packets are dropped silently; an
    /// `Err` means the connection must be closed.
    pub fn handle_frame(&mut self, frame: FrameView<'_>) -> Result<(), SessionError> {
        let Some(pkt) = protocol::parse(frame.head) else {
            return Ok(());
        };
        if self.stage != Stage::Play {
            tracing::debug!(stage = ?self.stage, packet = ?pkt, "rx");
        }

        match pkt {
            Clientbound::LoginSuccess if self.stage == Stage::AwaitingLoginSuccess => {
                self.queue(packets::login_ack())?;
                self.queue(packets::brand_plugin_message("cubelink"))?;
                self.queue(packets::client_information(
                    &self.params.locale,
                    self.params.view_distance,
                ))?;
                self.stage = Stage::AwaitingConfigFinish;
                self.sent_config_ack = false;
                self.set_status(LinkStatus::WaitConfig);
            }

            Clientbound::KnownPacks if self.stage == Stage::AwaitingConfigFinish => {
                if !self.sent_known_packs_ack {
                    self.queue(packets::known_packs_ack())?;
                    self.sent_known_packs_ack = true;
                }
                // Tolerant path: some servers never surface a separate
                // finish-configuration packet, so known packs alone may
                // complete the phase.
                if !self.sent_config_ack {
                    self.queue(packets::config_ack())?;
                    self.sent_config_ack = true;
                    self.stage = Stage::AwaitingPlayLogin;
                    self.set_status(LinkStatus::WaitPlay);
                }
            }

            Clientbound::FinishConfiguration if self.stage == Stage::AwaitingConfigFinish => {
                self.queue(packets::config_ack())?;
                self.sent_config_ack = true;
                self.stage = Stage::AwaitingPlayLogin;
                self.set_status(LinkStatus::WaitPlay);
            }

            Clientbound::PlayReady if self.stage == Stage::AwaitingPlayLogin => {
                if !self.sent_player_loaded {
                    self.queue(packets::player_loaded())?;
                    self.sent_player_loaded = true;
                }
                self.stage = Stage::Play;
                self.set_status(LinkStatus::Play);
                self.queue(packets::set_held_item(u16::from(self.held_slot)))?;
            }

            Clientbound::KeepAlive { token } => {
                // A keep-alive during the configuration tail means the
                // server already considers us in play.
                if matches!(
                    self.stage,
                    Stage::AwaitingConfigFinish | Stage::AwaitingPlayLogin
                ) {
                    self.stage = Stage::Play;
                    self.set_status(LinkStatus::Play);
                }
                self.queue(packets::keep_alive(token))?;
            }

            Clientbound::SyncPlayerPosition { teleport_id, pos } => {
                self.anchor.resync(pos);
                self.player.pos = LOCAL_SPAWN + Vec3::new(0.0, EYE_HEIGHT, 0.0);
                tracing::info!(
                    teleport_id,
                    server_x = pos.x,
                    server_y = pos.y,
                    server_z = pos.z,
                    "position sync, re-anchored to local spawn"
                );
            }

            Clientbound::AddEntity {
                entity_id,
                entity_type,
                pos,
            } => {
                if protocol::is_player_entity_type(entity_type) {
                    self.entities.upsert(entity_id, pos, &self.anchor);
                }
            }

            Clientbound::TeleportEntity { entity_id, pos } => {
                self.entities.upsert(entity_id, pos, &self.anchor);
            }

            Clientbound::RemoveEntity { entity_id } => {
                self.entities.remove(entity_id);
            }

            Clientbound::SetCenterChunk { cx, cz } => {
                self.on_center_chunk(cx, cz);
            }

            Clientbound::ChunkData { payload } => {
                self.chunk_rx += 1;
                let applied = apply_chunk_frame(
                    &mut self.grid,
                    payload,
                    self.center_chunk,
                    self.anchor.server_feet_y(),
                );
                if applied {
                    self.have_remote_world = true;
                    self.chunk_applied += 1;
                } else {
                    self.chunk_dropped += 1;
                }
                tracing::debug!(
                    total_len = frame.total_len,
                    head_len = frame.head.len(),
                    truncated = frame.truncated,
                    applied,
                    ok = self.chunk_applied,
                    dropped = self.chunk_dropped,
                    "chunk frame"
                );
            }

            // Stage-mismatched or unrecognized packets are dropped.
            _ => {}
        }
        Ok(())
    }

    /// Queue the periodic position report.
    pub fn queue_movement_packet(&mut self) -> Result<(), SessionError> {
        let local_feet = Vec3::new(
            self.player.pos.x,
            self.player.pos.y - EYE_HEIGHT,
            self.player.pos.z,
        );
        let server = self.anchor.local_to_server(local_feet);
        self.anchor.set_server_feet_y(server.y);

        let probe = self.player.pos - Vec3::new(0.0, 0.04, 0.0);
        let on_ground = is_player_colliding(&self.grid, probe);

        self.queue(packets::move_player_pos_rot(
            server.x,
            server.y,
            server.z,
            self.player.yaw.to_degrees(),
            -self.player.pitch.to_degrees(),
            on_ground,
        ))
    }

    fn on_center_chunk(&mut self, cx: i32, cz: i32) {
        if let Some((old_cx, old_cz)) = self.center_chunk {
            let d_cx = cx - old_cx;
            let d_cz = cz - old_cz;
            if d_cx != 0 || d_cz != 0 {
                let shift_x = (d_cx * 16) as f32;
                let shift_z = (d_cz * 16) as f32;
                // Keep the player near the window centre while the server
                // streams the new focus chunk.
                self.player.pos.x -= shift_x;
                self.player.pos.z -= shift_z;
                self.anchor.shift_xz(shift_x, shift_z);
                self.entities.shift_xz(shift_x, shift_z);
                tracing::info!(
                    from = ?(old_cx, old_cz),
                    to = ?(cx, cz),
                    shift_x,
                    shift_z,
                    "center chunk moved, local frame shifted"
                );
            }
        }
        self.center_chunk = Some((cx, cz));
    }

    /// Push a packet body onto the outbound queue, rejecting overflows.
    pub(crate) fn queue(&mut self, p: PacketWriter) -> Result<(), SessionError> {
        if !p.ok() {
            return Err(SessionError::PacketOverflow);
        }
        self.outbound.push(p.as_bytes().to_vec());
        Ok(())
    }

    pub(crate) fn next_sequence(&mut self) -> i32 {
        let seq = self.action_sequence;
        self.action_sequence += 1;
        seq
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
