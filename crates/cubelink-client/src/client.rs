//! Connection driver: socket ownership, reconnection, timers.
//!
//! The driver runs a fixed-cadence tick on a single task. Each tick drains
//! whatever the socket has ready (up to a byte budget, so one huge chunk
//! burst cannot starve the rest of the tick), feeds the frame assembler,
//! dispatches completed frames into the session, enforces login idle
//! timeouts, emits the periodic movement report, and flushes the session's
//! outbound queue. All failure paths converge on [`Client::close_to`],
//! which resets the session and lets the reconnect backoff take over.

use std::time::{Duration, Instant};

use cubelink_config::Config;
use cubelink_proto::{FrameAssembler, FrameError, encode_varint};
use cubelink_world::build_world;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::session::{Session, SessionParams};
use crate::stage::{LinkStatus, Stage};

/// Minimum delay between connection attempts.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(5);
/// TCP connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Max silence tolerated while waiting for login success.
const HANDSHAKE_IDLE_TIMEOUT: Duration = Duration::from_secs(12);
/// Max silence tolerated during the configuration tail. Servers may stall
/// here while preparing the world, so this window is generous.
const CONFIG_IDLE_TIMEOUT: Duration = Duration::from_secs(45);
/// Timeout for writing one outbound frame.
const WRITE_TIMEOUT: Duration = Duration::from_secs(12);
/// Cadence of the periodic movement report.
const MOVE_INTERVAL: Duration = Duration::from_millis(200);
/// Bytes drained from the socket per tick before yielding.
const READ_BUDGET: usize = 262_144;
/// Driver tick cadence.
const TICK_INTERVAL: Duration = Duration::from_millis(20);

/// The connected (or reconnecting) voxel world client.
pub struct Client {
    session: Session,
    assembler: FrameAssembler,
    socket: Option<TcpStream>,
    auto_connect: bool,
    world_seed: u32,
    last_attempt: Option<Instant>,
    last_rx: Instant,
    last_move_send: Instant,
    offline_world_built: bool,
}

impl Client {
    pub fn new(config: &Config) -> Self {
        let mut client = Self {
            session: Session::new(SessionParams::from_config(config)),
            assembler: FrameAssembler::new(),
            socket: None,
            auto_connect: config.network.auto_connect,
            world_seed: config.game.world_seed,
            last_attempt: None,
            last_rx: Instant::now(),
            last_move_send: Instant::now(),
            offline_world_built: false,
        };
        // Something to stand on before the first chunk arrives.
        client.ensure_offline_world();
        client
    }

    /// The session, for gameplay input (movement, block actions).
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> LinkStatus {
        self.session.status()
    }

    /// Connected, logged in, and showing server-streamed terrain.
    pub fn ready_for_gameplay(&self) -> bool {
        self.socket.is_some()
            && self.session.stage() == Stage::Play
            && self.session.have_remote_world()
    }

    /// Replace the connection settings, forcing a reconnect when they
    /// actually changed.
    pub fn set_server_config(&mut self, config: &Config) {
        let params = SessionParams::from_config(config);
        let changed = {
            let old = self.session.params();
            old.host != params.host
                || old.port != params.port
                || old.player_name != params.player_name
        } || self.auto_connect != config.network.auto_connect;

        self.session.set_params(params);
        self.auto_connect = config.network.auto_connect;
        self.world_seed = config.game.world_seed;

        if changed {
            self.close_to(LinkStatus::Reconnect);
            self.last_attempt = None;
        }
    }

    /// Run the driver until the task is cancelled.
    pub async fn run(&mut self) {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// One driver step. Public so gameplay loops and tests can own the
    /// cadence themselves.
    pub async fn tick(&mut self) {
        if !self.auto_connect {
            self.close_to(LinkStatus::Disabled);
            self.ensure_offline_world();
            return;
        }

        if self.session.params().host.is_empty() {
            self.close_to(LinkStatus::NoHost);
            return;
        }

        if self.socket.is_none() {
            if self.session.stage() != Stage::Idle {
                self.close_to(LinkStatus::Disconnected);
            }
            self.try_connect().await;
            return;
        }

        self.process_incoming();
        if self.socket.is_none() {
            return;
        }

        let stage = self.session.stage();
        if stage.is_logging_in() {
            let limit = match stage {
                Stage::AwaitingConfigFinish | Stage::AwaitingPlayLogin => CONFIG_IDLE_TIMEOUT,
                _ => HANDSHAKE_IDLE_TIMEOUT,
            };
            if self.last_rx.elapsed() > limit {
                tracing::warn!(?stage, "no server data within the stage deadline");
                self.close_to(LinkStatus::RxTimeout);
                return;
            }
        }

        if stage == Stage::Play && self.last_move_send.elapsed() >= MOVE_INTERVAL {
            if self.session.queue_movement_packet().is_err() {
                self.close_to(LinkStatus::TxFail);
                return;
            }
            self.last_move_send = Instant::now();
        }

        self.flush_outbound().await;
    }

    async fn try_connect(&mut self) {
        if self
            .last_attempt
            .is_some_and(|t| t.elapsed() < RECONNECT_BACKOFF)
        {
            return;
        }
        self.last_attempt = Some(Instant::now());
        self.session.set_status(LinkStatus::Connecting);

        let params = self.session.params();
        let addr = (params.host.clone(), params.port);
        tracing::info!(host = %addr.0, port = addr.1, "connecting");

        let stream = match tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => {
                tracing::warn!(%err, "connect failed");
                self.session.set_status(LinkStatus::ConnectFail);
                return;
            }
            Err(_) => {
                tracing::warn!("connect timed out");
                self.session.set_status(LinkStatus::ConnectFail);
                return;
            }
        };
        if let Err(err) = stream.set_nodelay(true) {
            tracing::debug!(%err, "could not set TCP_NODELAY");
        }

        self.assembler.reset();
        self.offline_world_built = false;
        if self.session.begin_connect().is_err() {
            self.close_to(LinkStatus::TxFail);
            return;
        }
        self.socket = Some(stream);
        self.last_rx = Instant::now();
        self.flush_outbound().await;
    }

    /// Drain ready bytes from the socket into the frame assembler and
    /// dispatch completed frames, within the per-tick budget.
    fn process_incoming(&mut self) {
        let mut budget = READ_BUDGET;
        let mut buf = [0u8; 4096];

        while budget > 0 {
            let read = match self.socket.as_mut() {
                Some(socket) => socket.try_read(&mut buf),
                None => return,
            };
            match read {
                Ok(0) => {
                    self.close_to(LinkStatus::Disconnected);
                    return;
                }
                Ok(n) => {
                    self.last_rx = Instant::now();
                    budget = budget.saturating_sub(n);
                    if !self.feed_assembler(&buf[..n]) {
                        return;
                    }
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => return,
                Err(err) => {
                    tracing::warn!(%err, "socket read failed");
                    self.close_to(LinkStatus::Disconnected);
                    return;
                }
            }
        }
    }

    /// Push received bytes through the assembler, dispatching each
    /// completed frame. Returns `false` when the connection was closed.
    fn feed_assembler(&mut self, mut input: &[u8]) -> bool {
        while !input.is_empty() {
            let progress = match self.assembler.accept(input) {
                Ok(progress) => progress,
                Err(FrameError::BadLengthPrefix) => {
                    tracing::warn!("bad frame length prefix");
                    self.close_to(LinkStatus::LenErr);
                    return false;
                }
                Err(FrameError::FrameTooLarge(len)) => {
                    tracing::warn!(len, "oversized frame");
                    self.close_to(LinkStatus::PktTooBig);
                    return false;
                }
            };
            input = &input[progress.consumed..];
            if progress.frame_complete {
                if let Some(frame) = self.assembler.current_frame()
                    && self.session.handle_frame(frame).is_err()
                {
                    self.close_to(LinkStatus::TxFail);
                    return false;
                }
                self.assembler.clear_frame();
            }
        }
        true
    }

    /// Write every queued packet body as a length-prefixed frame.
    async fn flush_outbound(&mut self) {
        let bodies = self.session.drain_outbound();
        for body in bodies {
            let mut prefix = [0u8; 5];
            let Some(n) = encode_varint(&mut prefix, body.len() as i32) else {
                self.close_to(LinkStatus::TxFail);
                return;
            };
            let mut frame = Vec::with_capacity(n + body.len());
            frame.extend_from_slice(&prefix[..n]);
            frame.extend_from_slice(&body);

            let Some(socket) = self.socket.as_mut() else {
                return;
            };
            match tokio::time::timeout(WRITE_TIMEOUT, socket.write_all(&frame)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(%err, "socket write failed");
                    self.close_to(LinkStatus::TxFail);
                    return;
                }
                Err(_) => {
                    tracing::warn!("socket write timed out");
                    self.close_to(LinkStatus::TxFail);
                    return;
                }
            }
        }
    }

    /// Drop the socket and reset all connection-scoped state.
    fn close_to(&mut self, status: LinkStatus) {
        let had_connection = self.socket.is_some() || self.session.stage() != Stage::Idle;
        self.socket = None;
        if had_connection {
            self.session.reset(status);
            self.assembler.reset();
            self.offline_world_built = false;
        } else {
            self.session.set_status(status);
        }
    }

    /// Regenerate the fallback terrain after the grid was cleared.
    fn ensure_offline_world(&mut self) {
        if !self.offline_world_built {
            build_world(&mut self.session.grid, self.world_seed);
            self.offline_world_built = true;
            tracing::info!(seed = self.world_seed, "offline world generated");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
