//! Room API client over HTTP

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use gemduel_shared::{
    ApiResponse, CreateRoomRequest, JoinRoomRequest, Room, RoomAssignment,
};

use crate::ports::outbound::{ApiError, RoomApiPort};

/// Client for the room server's REST API
#[derive(Clone)]
pub struct ApiAdapter {
    client: Client,
    base_url: String,
}

impl ApiAdapter {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        read_envelope(response).await
    }

    /// `<base>/api/rooms/<room_id>`, with the id as one encoded path segment
    fn room_url(&self, room_id: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::RequestFailed(format!("invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::RequestFailed(format!("base URL {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "rooms", room_id]);
        Ok(url)
    }

    async fn get_json<T>(&self, url: Url) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        read_envelope(response).await
    }
}

async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::RequestFailed(e.to_string()))?;
    decode_envelope(status, &body)
}

/// Decode a `{success, message, data}` body returned with `status`
///
/// Error statuses usually still carry the envelope; when they don't, the raw
/// body becomes the rejection message.
pub fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    let is_success_status = (200..300).contains(&status);

    let envelope: ApiResponse<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if is_success_status => return Err(ApiError::InvalidResponse(e.to_string())),
        Err(_) => {
            return Err(ApiError::Rejected {
                status,
                message: body.trim().to_string(),
            })
        }
    };

    if !envelope.success || !is_success_status {
        return Err(ApiError::Rejected {
            status,
            message: envelope.message.unwrap_or_default(),
        });
    }

    envelope.into_result().map_err(ApiError::InvalidResponse)
}

#[async_trait]
impl RoomApiPort for ApiAdapter {
    async fn create_room(&self, request: CreateRoomRequest) -> Result<RoomAssignment, ApiError> {
        tracing::debug!(room = %request.room_name, "Creating room");
        self.post_json("/api/rooms", &request).await
    }

    async fn join_room(&self, request: JoinRoomRequest) -> Result<RoomAssignment, ApiError> {
        tracing::debug!(room = %request.room_name, "Joining room");
        self.post_json("/api/rooms/join", &request).await
    }

    async fn get_room(&self, room_id: String) -> Result<Room, ApiError> {
        let url = self.room_url(&room_id)?;
        self.get_json(url).await
    }
}
