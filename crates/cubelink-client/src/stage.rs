//! Protocol stage and user-facing link status.

/// Where the connection is in the login sequence.
///
/// Stages advance strictly forward within one connection; any failure
/// resets to [`Stage::Idle`] and the next connection starts over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// No connection in progress.
    #[default]
    Idle,
    /// Handshake and login start sent, waiting for login success.
    AwaitingLoginSuccess,
    /// In the configuration phase, waiting for it to finish.
    AwaitingConfigFinish,
    /// Configuration acknowledged, waiting for the play-stage login packet.
    AwaitingPlayLogin,
    /// Fully logged in; gameplay packets flow.
    Play,
}

impl Stage {
    /// True while a connection exists but login has not completed.
    pub fn is_logging_in(self) -> bool {
        !matches!(self, Stage::Idle | Stage::Play)
    }
}

/// Short status label shown on the client's status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStatus {
    #[default]
    Disconnected,
    Connecting,
    ConnectFail,
    WaitLogin,
    WaitConfig,
    WaitPlay,
    Play,
    TxFail,
    RxTimeout,
    LenErr,
    PktTooBig,
    Disabled,
    NoHost,
    Reconnect,
}

impl LinkStatus {
    pub fn label(self) -> &'static str {
        match self {
            LinkStatus::Disconnected => "DISCONNECTED",
            LinkStatus::Connecting => "CONNECTING",
            LinkStatus::ConnectFail => "CONNECT_FAIL",
            LinkStatus::WaitLogin => "WAIT_LOGIN",
            LinkStatus::WaitConfig => "WAIT_CONFIG",
            LinkStatus::WaitPlay => "WAIT_PLAY",
            LinkStatus::Play => "PLAY",
            LinkStatus::TxFail => "TX_FAIL",
            LinkStatus::RxTimeout => "RX_TIMEOUT",
            LinkStatus::LenErr => "LEN_ERR",
            LinkStatus::PktTooBig => "PKT_TOO_BIG",
            LinkStatus::Disabled => "DISABLED",
            LinkStatus::NoHost => "NO_HOST",
            LinkStatus::Reconnect => "RECONNECT",
        }
    }
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_in_excludes_idle_and_play() {
        assert!(!Stage::Idle.is_logging_in());
        assert!(!Stage::Play.is_logging_in());
        assert!(Stage::AwaitingLoginSuccess.is_logging_in());
        assert!(Stage::AwaitingConfigFinish.is_logging_in());
        assert!(Stage::AwaitingPlayLogin.is_logging_in());
    }

    #[test]
    fn test_status_labels_are_stable() {
        assert_eq!(LinkStatus::Play.label(), "PLAY");
        assert_eq!(LinkStatus::RxTimeout.to_string(), "RX_TIMEOUT");
    }
}
