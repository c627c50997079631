//! Application services
//!
//! Services depend on port traits, not concrete infrastructure
//! implementations.

pub mod session_service;

pub use session_service::{RoomOutcome, SessionService};
