//! Terminal front end for the player binary.

pub mod terminal;

pub use terminal::{parse_command, render_message, render_state, Command, CommandError};
