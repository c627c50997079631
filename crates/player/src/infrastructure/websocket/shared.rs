//! Frame encoding helpers for the WebSocket client.
//!
//! No tokio in here; framing rules are tested without a socket.

use gemduel_shared::{ClientMessage, ServerMessage};

/// Capacity of the outbound frame queue
pub const OUTBOUND_QUEUE_CAPACITY: usize = 32;

/// How long `disconnect` waits for the close frame to flush
pub const CLOSE_TIMEOUT_MS: u64 = 2_000;

pub fn parse_server_message(text: &str) -> Result<ServerMessage, serde_json::Error> {
    serde_json::from_str(text)
}

pub fn encode_client_message(message: &ClientMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}
