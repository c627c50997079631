//! Session service - one player's participation in one room
//!
//! This service handles:
//! - Creating / joining / refreshing a room over REST
//! - Opening the room socket and announcing the player on it
//! - Folding inbound socket messages into the `SessionStore`
//! - Sending chat, game actions and the start request
//!
//! Sends are fire-and-forget; nothing is retried and a dropped socket stays
//! dropped until `connect_websocket` is called again.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use gemduel_shared::{
    ClientMessage, CreateRoomRequest, JoinRoomRequest, PlayerAction, RoomAssignment,
    ServerMessage,
};

use crate::application::error::SessionError;
use crate::infrastructure::config::PlayerConfig;
use crate::ports::outbound::{ApiError, ConnectionHandlers, GameConnectionPort, RoomApiPort};
use crate::state::{SelfPlayer, SessionState, SessionStore};

const CREATE_ROOM_FAILED: &str = "failed to create room";
const JOIN_ROOM_FAILED: &str = "failed to join room";
const FETCH_ROOM_FAILED: &str = "failed to load room";

/// Result of a REST room operation. Failures never raise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomOutcome {
    Success { room_id: String },
    Failure { message: String },
}

impl RoomOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RoomOutcome::Success { .. })
    }

    pub fn room_id(&self) -> Option<&str> {
        match self {
            RoomOutcome::Success { room_id } => Some(room_id),
            RoomOutcome::Failure { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            RoomOutcome::Success { .. } => None,
            RoomOutcome::Failure { message } => Some(message),
        }
    }

    fn failed(error: &ApiError, fallback: &str) -> Self {
        RoomOutcome::Failure {
            message: error.server_message().unwrap_or(fallback).to_string(),
        }
    }
}

type MessageListener = Arc<dyn Fn(&ServerMessage) + Send + Sync>;

/// Client session store and its actions
pub struct SessionService {
    api: Arc<dyn RoomApiPort>,
    connection: Arc<dyn GameConnectionPort>,
    config: PlayerConfig,
    store: SessionStore,
    listener: Arc<Mutex<Option<MessageListener>>>,
}

impl SessionService {
    pub fn new(
        api: Arc<dyn RoomApiPort>,
        connection: Arc<dyn GameConnectionPort>,
        config: PlayerConfig,
    ) -> Self {
        Self {
            api,
            connection,
            config,
            store: SessionStore::new(),
            listener: Arc::new(Mutex::new(None)),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Clone of the current session state
    pub fn snapshot(&self) -> SessionState {
        self.store.snapshot()
    }

    pub fn is_connected(&self) -> bool {
        self.store.read(|s| s.is_connected)
    }

    /// Observe every inbound message after it has been applied to the store
    pub fn set_on_message<F>(&self, callback: F)
    where
        F: Fn(&ServerMessage) + Send + Sync + 'static,
    {
        let mut listener = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        *listener = Some(Arc::new(callback));
    }

    // =========================================================================
    // REST
    // =========================================================================

    /// Create a room and become its first player
    pub async fn create_room(&self, room_name: &str, player_name: &str) -> RoomOutcome {
        let result = self
            .api
            .create_room(CreateRoomRequest::new(room_name, player_name))
            .await;
        self.settle_assignment(result, player_name, CREATE_ROOM_FAILED)
    }

    /// Join an existing room by name
    pub async fn join_room(&self, room_name: &str, player_name: &str) -> RoomOutcome {
        let result = self
            .api
            .join_room(JoinRoomRequest::new(room_name, player_name))
            .await;
        self.settle_assignment(result, player_name, JOIN_ROOM_FAILED)
    }

    /// Reload a room and refresh the cached copy
    pub async fn fetch_room(&self, room_id: &str) -> RoomOutcome {
        match self.api.get_room(room_id.to_string()).await {
            Ok(room) => {
                let room_id = room.id.clone();
                self.store.update(|s| s.current_room = Some(room));
                RoomOutcome::Success { room_id }
            }
            Err(e) => {
                tracing::warn!("{}: {}", FETCH_ROOM_FAILED, e);
                RoomOutcome::failed(&e, FETCH_ROOM_FAILED)
            }
        }
    }

    fn settle_assignment(
        &self,
        result: Result<RoomAssignment, ApiError>,
        player_name: &str,
        fallback: &str,
    ) -> RoomOutcome {
        match result {
            Ok(RoomAssignment { room, player_id }) => {
                let room_id = room.id.clone();
                tracing::info!(room_id = %room_id, player_id = %player_id, "Entered room");
                self.store.update(|s| {
                    s.enter_room(
                        room,
                        SelfPlayer {
                            id: player_id,
                            name: player_name.to_string(),
                        },
                    )
                });
                RoomOutcome::Success { room_id }
            }
            Err(e) => {
                tracing::warn!("{}: {}", fallback, e);
                RoomOutcome::failed(&e, fallback)
            }
        }
    }

    // =========================================================================
    // Socket
    // =========================================================================

    /// Open the room socket and announce this player on it
    ///
    /// Any socket left open by an earlier call is closed first.
    pub async fn connect_websocket(&self, room_id: &str) -> Result<(), SessionError> {
        let player = self
            .store
            .read(|s| s.current_player.clone())
            .ok_or(SessionError::NoPlayer)?;
        let url = self.config.room_socket_url(room_id)?;

        self.connection
            .connect(url.as_str(), self.handlers())
            .await?;

        self.connection
            .send(ClientMessage::PlayerJoin {
                player_id: player.id,
                player_name: player.name,
            })
            .await?;

        Ok(())
    }

    fn handlers(&self) -> ConnectionHandlers {
        let store = self.store.clone();
        let listener = Arc::clone(&self.listener);
        let state_store = self.store.clone();

        ConnectionHandlers::new(
            move |message| {
                // Lock released before the callback runs
                let callback = listener
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                match callback {
                    Some(callback) => {
                        store.apply(message.clone());
                        callback(&message);
                    }
                    None => store.apply(message),
                }
            },
            move |state| {
                tracing::debug!(?state, "Connection state changed");
                state_store.update(|s| s.is_connected = state.is_connected());
            },
        )
    }

    fn connected_player(&self) -> Option<SelfPlayer> {
        self.store.read(|s| {
            if s.is_connected {
                s.current_player.clone()
            } else {
                None
            }
        })
    }

    /// Send a chat line; silently dropped when not connected
    pub async fn send_chat_message(&self, text: &str) {
        let Some(player) = self.connected_player() else {
            tracing::debug!("Not connected, chat message dropped");
            return;
        };

        let message = ClientMessage::ChatMessage {
            player_id: player.id,
            player_name: player.name,
            message: text.trim().to_string(),
        };
        if let Err(e) = self.connection.send(message).await {
            tracing::warn!("Failed to send chat message: {}", e);
        }
    }

    /// Send a game action; silently dropped when not connected
    pub async fn perform_game_action(&self, action: PlayerAction) {
        let Some(player) = self.connected_player() else {
            tracing::debug!(action_type = %action.action_type, "Not connected, game action dropped");
            return;
        };

        let message = ClientMessage::game_action(&player.id, &player.name, action);
        if let Err(e) = self.connection.send(message).await {
            tracing::warn!("Failed to send game action: {}", e);
        }
    }

    /// Send a game action, raising when it cannot be sent
    pub async fn send_game_action(&self, action_type: &str, data: Value) -> Result<(), SessionError> {
        tracing::debug!(action_type, "Sending game action");

        let player = self.store.read(|s| {
            if !s.is_connected {
                Err(SessionError::NotConnected)
            } else {
                s.current_player.clone().ok_or(SessionError::NoPlayer)
            }
        });
        let player = match player {
            Ok(player) => player,
            Err(e) => {
                tracing::error!("Cannot send game action: {}", e);
                return Err(e);
            }
        };

        let message = ClientMessage::GameAction {
            player_id: player.id,
            player_name: player.name,
            action_type: action_type.to_string(),
            data,
        };
        self.connection.send(message).await.map_err(|e| {
            tracing::error!("Failed to send game action: {}", e);
            SessionError::from(e)
        })
    }

    /// Ask the server to start the game; silently dropped when not connected
    pub async fn start_game(&self) {
        if !self.is_connected() {
            tracing::debug!("Not connected, start request dropped");
            return;
        }
        if let Err(e) = self.connection.send(ClientMessage::StartGame).await {
            tracing::warn!("Failed to send start request: {}", e);
        }
    }

    /// Close the socket and clear every piece of session state
    pub async fn disconnect(&self) {
        self.connection.disconnect().await;
        self.store.update(SessionState::reset);
        tracing::info!("Session cleared");
    }

    /// Same as `disconnect`
    pub async fn reset(&self) {
        self.disconnect().await;
    }
}
