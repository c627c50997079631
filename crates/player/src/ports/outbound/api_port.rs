//! Room API Port - Outbound port for the room REST endpoints
//!
//! Create, join and look up rooms. Implemented over HTTP by
//! `infrastructure::http_client::ApiAdapter`.

use gemduel_shared::{CreateRoomRequest, JoinRoomRequest, Room, RoomAssignment};

/// Errors from the room API
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect/timeout/transport)
    #[error("request failed: {0}")]
    RequestFailed(String),
    /// The response body could not be understood
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The server answered with `success: false` or an error status
    #[error("rejected by server ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl ApiError {
    /// Message the server gave when it rejected the request, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Port for the room REST API
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait::async_trait]
pub trait RoomApiPort: Send + Sync {
    /// `POST /api/rooms`
    async fn create_room(&self, request: CreateRoomRequest) -> Result<RoomAssignment, ApiError>;

    /// `POST /api/rooms/join`
    async fn join_room(&self, request: JoinRoomRequest) -> Result<RoomAssignment, ApiError>;

    /// `GET /api/rooms/{room_id}`
    async fn get_room(&self, room_id: String) -> Result<Room, ApiError>;
}
