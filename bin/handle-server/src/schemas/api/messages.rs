use handle_vendor::{MessageRecord, OutgoingMessage, Resolution, RoomRef};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Error text for any missing or empty submission field.
pub const MISSING_FIELDS: &str =
    "Missing required fields: message, room, nickname, email, or phone_number";

/// Request body for `POST /api/sendMessage`.
///
/// Absent and `null` fields deserialize as empty strings, so missing, null
/// and empty are all rejected the same way by [`Validate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct SendMessageRequest {
    /// The user's message text.
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1))]
    pub message: String,
    /// Room UUID returned by `/api/createRoom`.
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1))]
    pub room: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1))]
    pub nickname: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1))]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1))]
    pub phone_number: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl SendMessageRequest {
    pub fn into_outgoing(self) -> OutgoingMessage {
        OutgoingMessage {
            body: self.message,
            nickname: self.nickname,
            email: self.email,
            phone_number: self.phone_number,
            room: RoomRef { uuid: self.room },
        }
    }
}

/// Answer for a message, from `/api/sendMessage` or `/api/messages/{uuid}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnswerResponse {
    /// The vendor's answer; `"No response received."` when polling ran out,
    /// empty from `/api/messages/{uuid}` while the answer is not ready.
    pub support_answer: String,
    /// Vendor message id, usable with `/api/messages/{uuid}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citations: Option<String>,
}

impl From<Resolution> for AnswerResponse {
    fn from(res: Resolution) -> Self {
        Self {
            support_answer: res.answer,
            message_uuid: Some(res.message_uuid),
            citations: res.citations,
        }
    }
}

impl From<MessageRecord> for AnswerResponse {
    fn from(record: MessageRecord) -> Self {
        Self {
            support_answer: record.answer().unwrap_or_default().to_owned(),
            message_uuid: Some(record.uuid),
            citations: record.citations,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_field_fails_validation() {
        let req: SendMessageRequest = serde_json::from_str(
            r#"{"message":"Hi","room":"r1","nickname":"Bob","email":"b@x.com"}"#,
        )
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone_number"));
    }

    #[test]
    fn null_field_fails_validation_instead_of_parsing() {
        let req: SendMessageRequest = serde_json::from_str(
            r#"{"message":"Hi","room":null,"nickname":"Bob","email":"b@x.com","phone_number":null}"#,
        )
        .unwrap();
        assert_eq!(req.phone_number, "");
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("room"));
        assert!(errors.field_errors().contains_key("phone_number"));
    }

    #[test]
    fn complete_request_validates_and_maps_room() {
        let req = SendMessageRequest {
            message: "Hi".into(),
            room: "r1".into(),
            nickname: "Bob".into(),
            email: "b@x.com".into(),
            phone_number: "+15551234567".into(),
        };
        assert!(req.validate().is_ok());
        let out = req.into_outgoing();
        assert_eq!(out.room.uuid, "r1");
        assert_eq!(out.body, "Hi");
    }

    #[test]
    fn pending_record_maps_to_empty_answer() {
        let record = MessageRecord { uuid: "m1".into(), ..Default::default() };
        let resp = AnswerResponse::from(record);
        assert_eq!(resp.support_answer, "");
        assert_eq!(resp.message_uuid.as_deref(), Some("m1"));
    }
}
