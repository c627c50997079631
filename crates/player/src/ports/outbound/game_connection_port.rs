//! Game Connection Port - Outbound port for the room WebSocket
//!
//! This port abstracts the socket so the session service can be driven by a
//! tokio-tungstenite client in production and a recording double in tests.
//!
//! NOTE: handlers are passed as `Arc<dyn Fn>` objects, which mockall cannot
//! mock; the test double lives in `ports::outbound::testing` instead.

use std::sync::Arc;

use gemduel_shared::{ClientMessage, ServerMessage};

/// Connection state for the room socket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected to the server
    #[default]
    Disconnected,
    /// Handshake in progress
    Connecting,
    /// Socket open
    Connected,
    /// Handshake failed
    Failed,
}

impl ConnectionState {
    /// Convert to u8 for atomic storage.
    pub fn to_u8(self) -> u8 {
        match self {
            ConnectionState::Disconnected => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Connected => 2,
            ConnectionState::Failed => 3,
        }
    }

    /// Convert from u8 (atomic storage).
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Failed,
            _ => ConnectionState::Disconnected,
        }
    }

    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

/// Errors from the socket adapter
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Opening the socket failed
    #[error("websocket handshake with {url} failed: {reason}")]
    Handshake { url: String, reason: String },
    /// No socket is open
    #[error("websocket not connected")]
    NotConnected,
    /// The writer task is gone (socket closed underneath us)
    #[error("websocket writer closed")]
    ChannelClosed,
    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type MessageHandler = Arc<dyn Fn(ServerMessage) + Send + Sync>;
pub type StateHandler = Arc<dyn Fn(ConnectionState) + Send + Sync>;

/// Callbacks installed for the lifetime of one socket
#[derive(Clone)]
pub struct ConnectionHandlers {
    /// Called for every inbound frame that parses, in arrival order
    pub on_message: MessageHandler,
    /// Called on every state transition, including close and error
    pub on_state_change: StateHandler,
}

impl ConnectionHandlers {
    pub fn new<M, S>(on_message: M, on_state_change: S) -> Self
    where
        M: Fn(ServerMessage) + Send + Sync + 'static,
        S: Fn(ConnectionState) + Send + Sync + 'static,
    {
        Self {
            on_message: Arc::new(on_message),
            on_state_change: Arc::new(on_state_change),
        }
    }
}

/// Port for the room WebSocket
///
/// At most one socket is live per implementation; `connect` closes any
/// previous socket before opening the new one.
#[async_trait::async_trait]
pub trait GameConnectionPort: Send + Sync {
    /// Get the current connection state
    fn state(&self) -> ConnectionState;

    /// Open a socket to `url`; returns once the handshake completes
    async fn connect(&self, url: &str, handlers: ConnectionHandlers)
        -> Result<(), ConnectionError>;

    /// Queue a message for transmission (fire-and-forget, no acknowledgement)
    async fn send(&self, message: ClientMessage) -> Result<(), ConnectionError>;

    /// Close the socket if one is open
    async fn disconnect(&self);
}
