//! Application-layer errors

use crate::infrastructure::config::ConfigError;
use crate::ports::outbound::ConnectionError;

/// Errors surfaced by `SessionService` operations that raise
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No socket is open
    #[error("websocket not connected")]
    NotConnected,
    /// The session has no self player; create or join a room first
    #[error("no player in session; create or join a room first")]
    NoPlayer,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}
