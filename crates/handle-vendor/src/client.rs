//! HTTP client for the vendor's REST API.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::VendorError;
use crate::retry::fetch_with_retry;
use crate::settings::RetryPolicy;
use crate::types::{MessageRecord, OutgoingMessage, Room, is_plain_id};

/// Production vendor host.
pub const DEFAULT_BASE_URL: &str = "https://dashboard.askhandle.com";

/// Sent on every vendor call so the vendor never sees a browser user agent.
const USER_AGENT: &str = "AskHandleClient/1.0";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The subset of the vendor API the proxy depends on.
///
/// Retry policies are passed per call so each layer keeps its own budget.
#[async_trait]
pub trait VendorApi: Send + Sync {
    /// Create a room. Single attempt, no retry.
    async fn create_room(&self) -> Result<Room, VendorError>;

    /// Submit a message to the write endpoint.
    async fn post_message(
        &self,
        message: &OutgoingMessage,
        retry: RetryPolicy,
    ) -> Result<MessageRecord, VendorError>;

    /// Read the current state of a message, bypassing caches.
    async fn get_message(&self, uuid: &str, retry: RetryPolicy)
        -> Result<MessageRecord, VendorError>;
}

/// [`VendorApi`] over HTTP, authenticated with the server-held token.
pub struct VendorClient {
    base_url: String,
    token: String,
    client: Client,
}

impl fmt::Debug for VendorClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VendorClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl VendorClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, VendorError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .header(CONTENT_TYPE, "application/json")
    }
}

#[async_trait]
impl VendorApi for VendorClient {
    async fn create_room(&self) -> Result<Room, VendorError> {
        let request = self.authorized(self.client.post(self.url("rooms/")));
        let room: Room = decode(fetch_with_retry(request, RetryPolicy::once()).await?).await?;
        if room.uuid.is_empty() {
            return Err(VendorError::InvalidResponse {
                message: "room response has no uuid".into(),
            });
        }
        debug!(room = %room.uuid, "vendor room created");
        Ok(room)
    }

    async fn post_message(
        &self,
        message: &OutgoingMessage,
        retry: RetryPolicy,
    ) -> Result<MessageRecord, VendorError> {
        let request = self
            .authorized(self.client.post(self.url("messages/")))
            .json(message);
        let record: MessageRecord = decode(fetch_with_retry(request, retry).await?).await?;
        if record.uuid.is_empty() {
            return Err(VendorError::InvalidResponse {
                message: "message response has no uuid".into(),
            });
        }
        debug!(message = %record.uuid, room = %message.room.uuid, "vendor accepted message");
        Ok(record)
    }

    async fn get_message(
        &self,
        uuid: &str,
        retry: RetryPolicy,
    ) -> Result<MessageRecord, VendorError> {
        if !is_plain_id(uuid) {
            return Err(VendorError::InvalidId(uuid.to_owned()));
        }
        let request = self
            .authorized(self.client.get(self.url(&format!("messages/{uuid}/"))))
            .header(CACHE_CONTROL, "no-store");
        decode(fetch_with_retry(request, retry).await?).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, VendorError> {
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::types::RoomRef;

    fn message() -> OutgoingMessage {
        OutgoingMessage {
            body: "Hi".into(),
            nickname: "Bob".into(),
            email: "b@x.com".into(),
            phone_number: "+15551234567".into(),
            room: RoomRef { uuid: "r1".into() },
        }
    }

    #[tokio::test]
    async fn post_message_sends_token_and_body_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/messages/"))
            .and(header("authorization", "Token secret"))
            .and(header("user-agent", USER_AGENT))
            .and(body_json(json!({
                "body": "Hi",
                "nickname": "Bob",
                "email": "b@x.com",
                "phone_number": "+15551234567",
                "room": { "uuid": "r1" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "uuid": "m1",
                "support_answer": ""
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = VendorClient::new(server.uri(), "secret").unwrap();
        let record = client
            .post_message(&message(), RetryPolicy::once())
            .await
            .unwrap();

        assert_eq!(record.uuid, "m1");
        assert_eq!(record.answer(), None);
    }

    #[tokio::test]
    async fn get_message_disables_caching() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/messages/m1/"))
            .and(header("cache-control", "no-store"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uuid": "m1",
                "support_answer": "42",
                "citations": "docs"
            })))
            .mount(&server)
            .await;

        let client = VendorClient::new(format!("{}/", server.uri()), "secret").unwrap();
        let record = client.get_message("m1", RetryPolicy::once()).await.unwrap();

        assert_eq!(record.answer(), Some("42"));
        assert_eq!(record.citations.as_deref(), Some("docs"));
    }

    #[tokio::test]
    async fn get_message_refuses_ids_that_leave_the_messages_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "uuid": "leak" })))
            .expect(0)
            .mount(&server)
            .await;

        let client = VendorClient::new(server.uri(), "secret").unwrap();
        for id in ["../rooms/r-other", "m1/../../rooms", ""] {
            let err = client.get_message(id, RetryPolicy::once()).await.unwrap_err();
            assert!(matches!(err, VendorError::InvalidId(_)), "{id}: {err}");
        }
    }

    #[tokio::test]
    async fn post_message_retries_then_gives_up() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/messages/"))
            .respond_with(ResponseTemplate::new(503))
            .expect(4)
            .mount(&server)
            .await;

        let client = VendorClient::new(server.uri(), "secret").unwrap();
        let err = client
            .post_message(&message(), RetryPolicy::new(3, Duration::from_millis(5)))
            .await
            .unwrap_err();

        assert!(matches!(err, VendorError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn create_room_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/rooms/"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = VendorClient::new(server.uri(), "secret").unwrap();
        assert!(client.create_room().await.is_err());
    }

    #[tokio::test]
    async fn create_room_parses_greeting() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/rooms/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "uuid": "r1",
                "label": "web",
                "name": "Support",
                "greeting_message": "Welcome!",
                "created_at": "2026-01-01T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let client = VendorClient::new(server.uri(), "secret").unwrap();
        let room = client.create_room().await.unwrap();
        assert_eq!(room.uuid, "r1");
        assert_eq!(room.greeting_message.as_deref(), Some("Welcome!"));
    }

    #[tokio::test]
    async fn missing_uuid_is_an_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "uuid": "" })))
            .mount(&server)
            .await;

        let client = VendorClient::new(server.uri(), "secret").unwrap();
        let err = client
            .post_message(&message(), RetryPolicy::once())
            .await
            .unwrap_err();
        assert!(matches!(err, VendorError::InvalidResponse { .. }));
    }

    #[test]
    fn debug_output_hides_token() {
        let client = VendorClient::new(DEFAULT_BASE_URL, "secret").unwrap();
        let shown = format!("{client:?}");
        assert!(!shown.contains("secret"));
        assert!(shown.contains("dashboard.askhandle.com"));
    }
}
