//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing application services to interact with the room server without
//! depending on concrete implementations.

pub mod api_port;
pub mod game_connection_port;
pub mod testing;

pub use api_port::{ApiError, RoomApiPort};
pub use game_connection_port::{
    ConnectionError, ConnectionHandlers, ConnectionState, GameConnectionPort, MessageHandler,
    StateHandler,
};
