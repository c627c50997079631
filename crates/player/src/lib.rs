//! GemDuel player crate.
//!
//! This crate contains the client session for one player in one room:
//! outbound ports, their HTTP/WebSocket adapters, the session state store,
//! the session service that composes them, and a terminal front end.

pub mod application;
pub mod infrastructure;
pub mod ports;
pub mod state;
pub mod ui;

// Re-export commonly used entrypoints
pub use application::{RoomOutcome, SessionError, SessionService};
pub use infrastructure::{ApiAdapter, PlayerConfig, RoomSocketClient};
pub use state::{SessionState, SessionStore};
