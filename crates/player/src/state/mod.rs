//! Client-local session state
//!
//! Holds the cached room, self player, game snapshot, chat and action log, and
//! the dispatcher that folds inbound socket messages into them.

mod session_state;

pub use session_state::{ActionLogEntry, ChatEntry, SelfPlayer, SessionState, SessionStore};
