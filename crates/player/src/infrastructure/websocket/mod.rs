//! WebSocket client for the room socket
//!
//! - `client`: tokio-tungstenite based `RoomSocketClient`
//! - `shared`: runtime-agnostic frame encoding

mod client;
mod shared;

pub use client::RoomSocketClient;
pub use shared::{encode_client_message, parse_server_message};
