//! Test utilities for outbound ports
//!
//! This module provides test doubles for outbound port traits.
//! These are available when the `testing` feature is enabled.
//!
//! # Usage
//!
//! Add to your Cargo.toml:
//! ```toml
//! [dev-dependencies]
//! gemduel-player = { workspace = true, features = ["testing"] }
//! ```
//!
//! Then import the doubles:
//! ```ignore
//! use gemduel_player::ports::outbound::testing::{MockRoomApiPort, RecordingConnection};
//! ```

#[cfg(any(test, feature = "testing"))]
mod recording_connection;

#[cfg(any(test, feature = "testing"))]
pub use recording_connection::RecordingConnection;

#[cfg(any(test, feature = "testing"))]
pub use super::api_port::MockRoomApiPort;
