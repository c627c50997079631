//! Line-oriented terminal UI
//!
//! Stdin lines become [`Command`]s; inbound messages and the session snapshot
//! are rendered as plain text lines.

use serde_json::Value;

use gemduel_shared::{PlayerAction, ServerMessage};

use crate::state::SessionState;

/// One parsed stdin line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Chat(String),
    Action(PlayerAction),
    Start,
    State,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("usage: /action <type> [json]")]
    MissingActionType,
    #[error("action data is not valid JSON: {0}")]
    InvalidActionData(String),
    #[error("unknown command /{0}")]
    Unknown(String),
}

/// Parse a stdin line; blank lines yield `Ok(None)`
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Chat(line.to_string())));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "action" => {
            let (action_type, data) = match args.split_once(char::is_whitespace) {
                Some((action_type, data)) => (action_type, data.trim()),
                None => (args, ""),
            };
            if action_type.is_empty() {
                return Err(CommandError::MissingActionType);
            }
            let action = PlayerAction::new(action_type);
            if data.is_empty() {
                Command::Action(action)
            } else {
                let data: Value = serde_json::from_str(data)
                    .map_err(|e| CommandError::InvalidActionData(e.to_string()))?;
                Command::Action(action.with_data(data))
            }
        }
        "start" => Command::Start,
        "state" => Command::State,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

/// Text line for an inbound message, or `None` for messages with nothing to show
pub fn render_message(message: &ServerMessage) -> Option<String> {
    match message {
        ServerMessage::ChatMessage {
            player_name,
            message: Some(text),
            ..
        } => Some(format!("[{}] {}", player_name, text)),
        ServerMessage::GameAction {
            action: Some(action),
        } => Some(format!("* {} {}", action.player_name, action.summary())),
        ServerMessage::PlayerJoined { data: Some(p) } => Some(format!(
            "-> {} joined",
            p.player_name.as_deref().unwrap_or(&p.player_id)
        )),
        ServerMessage::PlayerLeft { data: Some(p) } => Some(format!(
            "<- {} left",
            p.player_name.as_deref().unwrap_or(&p.player_id)
        )),
        ServerMessage::GameStart { .. } => Some("== game started ==".to_string()),
        ServerMessage::GameEnd { data } => Some(match data {
            Some(data) => format!("== game over == {}", data),
            None => "== game over ==".to_string(),
        }),
        ServerMessage::Error { message } => Some(format!(
            "! {}",
            message.as_deref().unwrap_or("server error")
        )),
        _ => None,
    }
}

/// Multi-line summary of the session for `/state`
pub fn render_state(state: &SessionState) -> String {
    let mut lines = Vec::new();

    match &state.current_room {
        Some(room) => lines.push(format!("room: {} ({})", room.name, room.id)),
        None => lines.push("room: -".to_string()),
    }
    if let Some(player) = &state.current_player {
        lines.push(format!("you: {} ({})", player.name, player.id));
    }
    lines.push(format!(
        "connection: {}",
        if state.is_connected { "open" } else { "closed" }
    ));

    if let Some(game) = &state.game_state {
        lines.push(format!("status: {:?}", game.status));
        if !game.current_turn.is_empty() {
            lines.push(format!("turn: {}", game.current_turn));
        }
        for player in &game.players {
            lines.push(format!(
                "  {} ({}) points={} crowns={}",
                player.name, player.id, player.points, player.crowns
            ));
        }
        if let Some(winner) = &game.winner {
            lines.push(format!("winner: {}", winner));
        }
    }

    lines.push(format!(
        "chat: {} messages, history: {} actions",
        state.chat_messages.len(),
        state.game_history.len()
    ));

    lines.join("\n")
}
