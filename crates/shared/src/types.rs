//! Snapshot types mirrored from the room server
//!
//! The server owns every one of these; the player only caches copies. Fields the
//! client never inspects (board layout, card rows, nobles, ...) are kept verbatim
//! in `extra` maps so a snapshot survives a decode/encode cycle unchanged.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Room
// =============================================================================

/// A game room as returned by the room API and `room_info` broadcasts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Embedded game state; its roster doubles as the room's member list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_state: Option<GameState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Room {
    /// Players currently seated in the room
    pub fn members(&self) -> &[PlayerState] {
        self.game_state
            .as_ref()
            .map(|state| state.players.as_slice())
            .unwrap_or_default()
    }
}

// =============================================================================
// Game state
// =============================================================================

/// Lifecycle of a game inside a room
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Waiting,
    Playing,
    Finished,
    /// Unknown variant for forward compatibility
    #[serde(other)]
    Unknown,
}

/// Server-authoritative game snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    #[serde(default)]
    pub status: GameStatus,
    /// Id of the player whose turn it is (empty before the game starts)
    #[serde(default)]
    pub current_turn: String,
    /// Seated players, in server order
    ///
    /// The server sends this either as an array or as an object keyed by player id.
    #[serde(default, deserialize_with = "deserialize_roster")]
    pub players: Vec<PlayerState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    /// Board fields the client passes through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GameState {
    /// Placeholder state used before the server has sent a snapshot
    pub fn waiting() -> Self {
        Self::default()
    }

    pub fn player(&self, player_id: &str) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.player(player_id).is_some()
    }
}

/// One seat in the game roster, with its resource counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Gem tokens held, by colour
    #[serde(default, deserialize_with = "null_as_default")]
    pub gems: BTreeMap<String, i64>,
    /// Permanent bonuses from purchased cards, by colour
    #[serde(default, alias = "bonuses", deserialize_with = "null_as_default")]
    pub bonus: BTreeMap<String, i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reserved_cards: Vec<Value>,
    #[serde(default)]
    pub crowns: u32,
    #[serde(default)]
    pub privilege_tokens: u32,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub is_host: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlayerState {
    /// Fresh roster entry with every counter at zero
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

// =============================================================================
// Chat and action history
// =============================================================================

/// A chat line as stored by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub player_id: String,
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A game action as broadcast by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameActionData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub player_id: String,
    #[serde(default)]
    pub player_name: String,
    #[serde(rename = "type", default)]
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        rename = "descriptionHTML",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description_html: Option<String>,
}

impl GameActionData {
    /// Server description, or a generic one built from the action type
    pub fn summary(&self) -> String {
        match self.description.as_deref() {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => format!("performed {} action", self.action_type),
        }
    }
}

/// Chat and action history replayed to a client when it joins
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub chat: Vec<ChatMessageData>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<GameActionData>,
}

/// Payload of `player_joined` / `player_left`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPresence {
    #[serde(default)]
    pub player_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

/// A game action as requested by the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAction {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl PlayerAction {
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

// =============================================================================
// Deserialization helpers
// =============================================================================

/// Treat an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Roster {
    List(Vec<PlayerState>),
    Keyed(BTreeMap<String, PlayerState>),
}

fn deserialize_roster<'de, D>(deserializer: D) -> Result<Vec<PlayerState>, D::Error>
where
    D: Deserializer<'de>,
{
    let players = match Option::<Roster>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Roster::List(players)) => players,
        Some(Roster::Keyed(players)) => players
            .into_iter()
            .map(|(id, mut player)| {
                if player.id.is_empty() {
                    player.id = id;
                }
                player
            })
            .collect(),
    };
    Ok(players)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roster_accepts_list() {
        let state: GameState = serde_json::from_value(json!({
            "status": "playing",
            "currentTurn": "p1",
            "players": [
                {"id": "p1", "name": "Alice", "points": 3},
                {"id": "p2", "name": "Bob"}
            ]
        }))
        .unwrap();

        assert_eq!(state.status, GameStatus::Playing);
        assert_eq!(state.players.len(), 2);
        assert_eq!(state.players[0].points, 3);
        assert!(state.has_player("p2"));
    }

    #[test]
    fn test_roster_accepts_keyed_object() {
        let state: GameState = serde_json::from_value(json!({
            "status": "waiting",
            "players": {
                "p2": {"name": "Bob"},
                "p1": {"id": "p1", "name": "Alice", "isHost": true}
            }
        }))
        .unwrap();

        let ids: Vec<&str> = state.players.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
        assert!(state.player("p1").unwrap().is_host);
        assert_eq!(state.player("p2").unwrap().name, "Bob");
    }

    #[test]
    fn test_null_collections_decode_as_empty() {
        let state: GameState = serde_json::from_value(json!({
            "players": [{"id": "p1", "gems": null, "bonus": null, "reservedCards": null}]
        }))
        .unwrap();

        let player = &state.players[0];
        assert!(player.gems.is_empty());
        assert!(player.reserved_cards.is_empty());

        let empty: GameState = serde_json::from_value(json!({"players": null})).unwrap();
        assert!(empty.players.is_empty());
    }

    #[test]
    fn test_unmodelled_fields_survive_reencode() {
        let raw = json!({
            "status": "playing",
            "currentTurn": "p1",
            "players": [],
            "availableGems": {"red": 4, "gold": 3},
            "nobleCards": [{"id": "n1", "points": 3}]
        });

        let state: GameState = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(state.extra["availableGems"]["gold"], 3);

        let encoded = serde_json::to_value(&state).unwrap();
        assert_eq!(encoded["availableGems"], raw["availableGems"]);
        assert_eq!(encoded["nobleCards"], raw["nobleCards"]);
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let state: GameState = serde_json::from_value(json!({"status": "paused"})).unwrap();
        assert_eq!(state.status, GameStatus::Unknown);
    }

    #[test]
    fn test_bonuses_alias() {
        let player: PlayerState =
            serde_json::from_value(json!({"id": "p1", "bonuses": {"blue": 2}})).unwrap();
        assert_eq!(player.bonus.get("blue"), Some(&2));
    }

    #[test]
    fn test_room_members_come_from_game_state() {
        let room: Room = serde_json::from_value(json!({
            "id": "room-1",
            "name": "Duel",
            "gameState": {"players": [{"id": "p1", "name": "Alice"}]},
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(room.members().len(), 1);
        assert!(room.created_at.is_some());

        let bare: Room = serde_json::from_value(json!({"id": "room-2"})).unwrap();
        assert!(bare.members().is_empty());
    }
}
