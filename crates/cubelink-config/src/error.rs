//! Failures of the config load/save/reload cycle.

/// Why a config file could not be loaded or persisted. I/O and RON
/// failures are kept distinct so the caller can tell a missing or
/// unreadable file from a hand-edited one that no longer parses.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file unreadable: {0}")]
    Read(#[source] std::io::Error),

    #[error("config file not writable: {0}")]
    Write(#[source] std::io::Error),

    /// The file exists but is not valid RON for [`Config`](crate::Config).
    #[error("config does not parse: {0}")]
    Parse(#[source] ron::error::SpannedError),

    #[error("config serialization failed: {0}")]
    Serialize(#[source] ron::Error),
}
