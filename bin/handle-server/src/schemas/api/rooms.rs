use handle_vendor::Room;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A vendor room as exposed to the widget.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomBody {
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Shown as the first bot message when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Response body for `POST /api/createRoom`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRoomResponse {
    pub room: RoomBody,
}

impl From<Room> for RoomBody {
    fn from(room: Room) -> Self {
        Self {
            uuid: room.uuid,
            label: room.label,
            name: room.name,
            greeting_message: room.greeting_message,
            created_at: room.created_at,
        }
    }
}
