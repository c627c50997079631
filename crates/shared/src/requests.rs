//! Request bodies for the room REST API

use serde::{Deserialize, Serialize};

/// Body of `POST /api/rooms`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub room_name: String,
    pub player_name: String,
}

/// Body of `POST /api/rooms/join`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub room_name: String,
    pub player_name: String,
}

impl CreateRoomRequest {
    pub fn new(room_name: impl Into<String>, player_name: impl Into<String>) -> Self {
        Self {
            room_name: room_name.into(),
            player_name: player_name.into(),
        }
    }
}

impl JoinRoomRequest {
    pub fn new(room_name: impl Into<String>, player_name: impl Into<String>) -> Self {
        Self {
            room_name: room_name.into(),
            player_name: player_name.into(),
        }
    }
}
