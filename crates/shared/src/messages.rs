//! WebSocket message types for the room socket
//!
//! Every frame is a JSON object carrying a `type` discriminator. Field names are
//! camelCase on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{
    GameActionData, GameState, HistorySnapshot, PlayerAction, PlayerPresence, Room,
};

// =============================================================================
// Client Messages (Player → Server)
// =============================================================================

/// Messages from the player to the room server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Announce this player on a freshly opened socket
    PlayerJoin {
        player_id: String,
        player_name: String,
    },
    /// Chat line for everyone in the room
    ChatMessage {
        player_id: String,
        player_name: String,
        message: String,
    },
    /// Game move; the server validates and rebroadcasts state
    GameAction {
        player_id: String,
        player_name: String,
        action_type: String,
        data: Value,
    },
    /// Ask the server to start the game now
    StartGame,
}

impl ClientMessage {
    /// Build a `game_action` frame from a player action, defaulting data to `{}`
    pub fn game_action(player_id: &str, player_name: &str, action: PlayerAction) -> Self {
        ClientMessage::GameAction {
            player_id: player_id.to_string(),
            player_name: player_name.to_string(),
            action_type: action.action_type,
            data: action
                .data
                .unwrap_or_else(|| Value::Object(Default::default())),
        }
    }
}

// =============================================================================
// Server Messages (Server → Player)
// =============================================================================

/// Messages from the room server to the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Full game snapshot
    GameStateUpdate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        game_state: Option<GameState>,
    },
    /// Chat line relayed by the server
    ChatMessage {
        #[serde(default)]
        player_id: String,
        #[serde(default)]
        player_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// A move made by some player
    GameAction {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action: Option<GameActionData>,
    },
    PlayerJoined {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<PlayerPresence>,
    },
    PlayerLeft {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<PlayerPresence>,
    },
    /// The game has started
    ///
    /// Servers put the snapshot either at the top level or inside a room
    /// object under `data`.
    GameStart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        game_state: Option<GameState>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<GameStartPayload>,
    },
    GameEnd {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
    /// Server-side failure report
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Room details sent right after the socket registers
    RoomInfo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Room>,
    },
    /// Chat and action history replayed on join
    HistorySnapshot {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<HistorySnapshot>,
    },
    /// Unknown message type for forward compatibility
    ///
    /// When deserializing an unknown variant, this variant is used instead of
    /// failing. Allows older clients to gracefully handle new message types.
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    /// Wire tag of this message, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::GameStateUpdate { .. } => "game_state_update",
            ServerMessage::ChatMessage { .. } => "chat_message",
            ServerMessage::GameAction { .. } => "game_action",
            ServerMessage::PlayerJoined { .. } => "player_joined",
            ServerMessage::PlayerLeft { .. } => "player_left",
            ServerMessage::GameStart { .. } => "game_start",
            ServerMessage::GameEnd { .. } => "game_end",
            ServerMessage::Error { .. } => "error",
            ServerMessage::RoomInfo { .. } => "room_info",
            ServerMessage::HistorySnapshot { .. } => "history_snapshot",
            ServerMessage::Unknown => "unknown",
        }
    }
}

/// Nested payload of `game_start` when the server sends the whole room
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStartPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_state: Option<GameState>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_messages_use_wire_names() {
        let join = ClientMessage::PlayerJoin {
            player_id: "p1".into(),
            player_name: "Alice".into(),
        };
        assert_eq!(
            serde_json::to_value(&join).unwrap(),
            json!({"type": "player_join", "playerId": "p1", "playerName": "Alice"})
        );

        let start = serde_json::to_value(&ClientMessage::StartGame).unwrap();
        assert_eq!(start, json!({"type": "start_game"}));
    }

    #[test]
    fn test_game_action_defaults_data_to_empty_object() {
        let msg = ClientMessage::game_action("p1", "Alice", PlayerAction::new("takeGems"));
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "type": "game_action",
                "playerId": "p1",
                "playerName": "Alice",
                "actionType": "takeGems",
                "data": {}
            })
        );
    }

    #[test]
    fn test_unknown_server_type_parses() {
        let msg: ServerMessage =
            serde_json::from_value(json!({"type": "spectator_count", "data": 3})).unwrap();
        assert_eq!(msg, ServerMessage::Unknown);
    }

    #[test]
    fn test_game_start_both_payload_locations() {
        let top: ServerMessage = serde_json::from_value(json!({
            "type": "game_start",
            "gameState": {"status": "playing"}
        }))
        .unwrap();
        assert!(matches!(top, ServerMessage::GameStart { game_state: Some(_), data: None }));

        let nested: ServerMessage = serde_json::from_value(json!({
            "type": "game_start",
            "data": {"id": "room-1", "name": "Duel", "gameState": {"status": "playing"}}
        }))
        .unwrap();
        match nested {
            ServerMessage::GameStart { game_state, data } => {
                assert!(game_state.is_none());
                assert!(data.and_then(|d| d.game_state).is_some());
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_game_end_ignores_payload() {
        let msg: ServerMessage = serde_json::from_value(json!({"type": "game_end"})).unwrap();
        assert_eq!(msg.kind(), "game_end");
    }
}
