//! Session state and the inbound message dispatcher
//!
//! `SessionState` is the client-local mirror of one player's view of one room.
//! `SessionState::apply` maps each inbound `ServerMessage` to a local mutation.
//! `SessionStore` shares one `SessionState` between the socket reader and the
//! callers of the session service.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use gemduel_shared::{
    ChatMessageData, GameActionData, GameState, HistorySnapshot, PlayerPresence, PlayerState,
    Room, ServerMessage,
};

/// The local player ("self") in the current room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfPlayer {
    pub id: String,
    pub name: String,
}

/// One chat line, stamped when the client received it
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub player_id: String,
    pub player_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// One entry of the game action log
#[derive(Debug, Clone, PartialEq)]
pub struct ActionLogEntry {
    pub player_id: String,
    pub player_name: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl ActionLogEntry {
    fn from_action(action: GameActionData, received_at: DateTime<Utc>) -> Self {
        Self {
            description: action.summary(),
            player_id: action.player_id,
            player_name: action.player_name,
            timestamp: action.timestamp.unwrap_or(received_at),
        }
    }
}

impl ChatEntry {
    fn from_history(chat: ChatMessageData, received_at: DateTime<Utc>) -> Self {
        Self {
            player_id: chat.player_id,
            player_name: chat.player_name,
            message: chat.message,
            timestamp: chat.timestamp.unwrap_or(received_at),
        }
    }
}

/// Client-local session state
///
/// `Default` is the initial, fully cleared state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub current_room: Option<Room>,
    pub current_player: Option<SelfPlayer>,
    pub game_state: Option<GameState>,
    pub is_connected: bool,
    pub chat_messages: Vec<ChatEntry>,
    pub game_history: Vec<ActionLogEntry>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache the room and self player after a successful create/join
    pub fn enter_room(&mut self, room: Room, player: SelfPlayer) {
        self.current_room = Some(room);
        self.current_player = Some(player);
    }

    /// Clear everything back to the initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Room id of the cached room, if any
    pub fn room_id(&self) -> Option<&str> {
        self.current_room.as_ref().map(|room| room.id.as_str())
    }

    /// Apply one inbound message, stamping client-side times with `Utc::now()`
    pub fn apply(&mut self, message: ServerMessage) {
        self.apply_at(message, Utc::now());
    }

    /// Apply one inbound message with an explicit receipt time
    pub fn apply_at(&mut self, message: ServerMessage, received_at: DateTime<Utc>) {
        tracing::debug!(kind = message.kind(), "Dispatching server message");

        match message {
            ServerMessage::GameStateUpdate { game_state } => match game_state {
                Some(state) => self.game_state = Some(state),
                None => tracing::debug!("game_state_update without gameState ignored"),
            },
            ServerMessage::ChatMessage {
                player_id,
                player_name,
                message,
            } => {
                if let Some(message) = message.filter(|m| !m.is_empty()) {
                    self.chat_messages.push(ChatEntry {
                        player_id,
                        player_name,
                        message,
                        timestamp: received_at,
                    });
                }
            }
            ServerMessage::GameAction { action } => {
                if let Some(action) = action {
                    self.game_history
                        .push(ActionLogEntry::from_action(action, received_at));
                }
            }
            ServerMessage::PlayerJoined { data } => {
                if let Some(presence) = data.filter(|p| !p.player_id.is_empty()) {
                    self.add_roster_player(presence);
                }
            }
            ServerMessage::PlayerLeft { data } => {
                if let Some(presence) = data.filter(|p| !p.player_id.is_empty()) {
                    self.remove_roster_player(&presence.player_id);
                }
            }
            ServerMessage::GameStart { game_state, data } => {
                match game_state.or_else(|| data.and_then(|room| room.game_state)) {
                    Some(state) => {
                        tracing::info!(status = ?state.status, "Game started");
                        self.game_state = Some(state);
                    }
                    None => tracing::warn!("game_start carried no game state"),
                }
            }
            ServerMessage::GameEnd { .. } => {
                tracing::info!("Game ended");
            }
            ServerMessage::Error { message } => {
                tracing::error!(
                    "Server error: {}",
                    message.as_deref().unwrap_or("<no message>")
                );
            }
            ServerMessage::RoomInfo { data } => {
                if let Some(room) = data {
                    self.current_room = Some(room);
                }
            }
            ServerMessage::HistorySnapshot { data } => {
                if let Some(snapshot) = data {
                    self.replace_history(snapshot, received_at);
                }
            }
            ServerMessage::Unknown => {
                tracing::debug!("Ignoring unknown server message type");
            }
        }
    }

    /// Insert a roster entry unless one with the same id already exists
    fn add_roster_player(&mut self, presence: PlayerPresence) {
        let state = self.game_state.get_or_insert_with(GameState::waiting);
        if state.has_player(&presence.player_id) {
            return;
        }
        tracing::debug!(player_id = %presence.player_id, "Player joined");
        state.players.push(PlayerState::new(
            presence.player_id,
            presence.player_name.unwrap_or_default(),
        ));
    }

    fn remove_roster_player(&mut self, player_id: &str) {
        if let Some(state) = self.game_state.as_mut() {
            state.players.retain(|p| p.id != player_id);
            tracing::debug!(player_id, "Player left");
        }
    }

    fn replace_history(&mut self, snapshot: HistorySnapshot, received_at: DateTime<Utc>) {
        self.chat_messages = snapshot
            .chat
            .into_iter()
            .map(|chat| ChatEntry::from_history(chat, received_at))
            .collect();
        self.game_history = snapshot
            .history
            .into_iter()
            .map(|action| ActionLogEntry::from_action(action, received_at))
            .collect();
    }
}

// =============================================================================
// SessionStore - shared handle
// =============================================================================

/// Shared, lockable handle to a `SessionState`
///
/// Lock poisoning is recovered from: every mutation leaves the state valid, so
/// a panic in one reader never blocks the session.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with shared access to the state
    pub fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run `f` with exclusive access to the state
    pub fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Clone of the whole state
    pub fn snapshot(&self) -> SessionState {
        self.read(SessionState::clone)
    }

    pub fn apply(&self, message: ServerMessage) {
        self.update(|state| state.apply(message));
    }
}
