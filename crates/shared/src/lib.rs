//! GemDuel Shared - Wire types for the room server and its players
//!
//! This crate contains all types exchanged between the room server and the player:
//! - REST request bodies and the `{success, message, data}` response envelope
//! - WebSocket message types (ClientMessage, ServerMessage)
//! - Room, game and player snapshots
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json and chrono
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Lenient decoding** - Missing or `null` fields fall back to defaults and
//!    unknown message types decode to `Unknown`

pub mod messages;
pub mod requests;
pub mod responses;
pub mod types;

pub use messages::{ClientMessage, GameStartPayload, ServerMessage};
pub use requests::{CreateRoomRequest, JoinRoomRequest};
pub use responses::{ApiResponse, RoomAssignment};
pub use types::{
    ChatMessageData, GameActionData, GameState, GameStatus, HistorySnapshot, PlayerAction,
    PlayerPresence, PlayerState, Room,
};
