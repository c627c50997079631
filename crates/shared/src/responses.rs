//! Response envelope of the room REST API
//!
//! Every endpoint answers `{success, message?, data?}`, including error statuses.

use serde::{Deserialize, Serialize};

use crate::types::Room;

/// Envelope wrapping every REST response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// Create a failure response
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Split into the payload or the server's message
    ///
    /// A `success` envelope without data counts as a failure.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(self
                .message
                .unwrap_or_else(|| "response carried no data".to_string())),
            (false, _) => Err(self.message.unwrap_or_default()),
        }
    }
}

/// Payload of a successful create/join: the room and the id assigned to us
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAssignment {
    pub room: Room,
    pub player_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_yields_assignment() {
        let response: ApiResponse<RoomAssignment> = serde_json::from_value(json!({
            "success": true,
            "data": {"room": {"id": "room-1", "name": "Duel"}, "playerId": "p1"}
        }))
        .unwrap();

        let assignment = response.into_result().unwrap();
        assert_eq!(assignment.room.id, "room-1");
        assert_eq!(assignment.player_id, "p1");
    }

    #[test]
    fn test_failure_envelope_yields_message() {
        let response: ApiResponse<RoomAssignment> =
            serde_json::from_value(json!({"success": false, "message": "room is full"})).unwrap();
        assert_eq!(response.into_result().unwrap_err(), "room is full");
    }

    fn decode_generic<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> ApiResponse<T> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_generic_decode_without_default_payload() {
        let missing: ApiResponse<RoomAssignment> =
            decode_generic(json!({"success": false, "message": "room not found"}));
        assert_eq!(missing.data, None);

        let null: ApiResponse<RoomAssignment> = decode_generic(json!({"success": true, "data": null}));
        assert_eq!(null.data, None);
    }

    #[test]
    fn test_success_without_data_is_error() {
        let response: ApiResponse<RoomAssignment> =
            serde_json::from_value(json!({"success": true})).unwrap();
        assert!(response.into_result().is_err());
    }
}
