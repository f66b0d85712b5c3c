//! Remote world client: protocol state machine, coordinate anchoring,
//! remote entity tracking, and the connection driver that ties them to a
//! TCP socket with reconnection and fixed per-tick read budgets.
//!
//! The [`session`] layer is fully synchronous and socket-free — it consumes
//! decoded frames and queues outbound packet bodies — which keeps the whole
//! login and play sequence testable without a server. The [`client`] layer
//! owns the socket, timers and reconnection policy.

pub mod anchor;
pub mod client;
pub mod entities;
pub mod protocol;
pub mod session;
pub mod stage;

mod actions;

pub use anchor::Anchor;
pub use client::Client;
pub use entities::{REMOTE_PLAYER_SLOTS, RemoteEntityTable, RemotePlayer};
pub use session::{LocalPlayer, Session, SessionError, SessionParams};
pub use stage::{LinkStatus, Stage};
