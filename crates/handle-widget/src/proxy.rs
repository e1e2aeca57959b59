//! HTTP client for the handle-server proxy API.

use std::time::Duration;

use async_trait::async_trait;
use handle_vendor::Room;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{WidgetError, WidgetResult};
use crate::fallback::AnswerSource;
use crate::session::Session;

/// Per-request limit for the short calls. `sendMessage` has none: the server
/// bounds it with its own submit and poll budgets.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of `POST /api/sendMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendMessage {
    pub message: String,
    pub room: String,
    pub nickname: String,
    pub email: String,
    pub phone_number: String,
}

impl SendMessage {
    pub fn new(message: impl Into<String>, session: &Session) -> Self {
        Self {
            message: message.into(),
            room: session.room_uuid.clone(),
            nickname: session.identity.nickname.clone(),
            email: session.identity.email.clone(),
            phone_number: session.identity.phone.clone(),
        }
    }
}

/// The server's answer to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerAnswer {
    #[serde(default)]
    pub support_answer: String,
    #[serde(default)]
    pub message_uuid: Option<String>,
    #[serde(default)]
    pub citations: Option<String>,
}

#[derive(Deserialize)]
struct RoomEnvelope {
    room: Room,
}

#[derive(Deserialize)]
struct QuestionsEnvelope {
    questions: Vec<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Message submission as seen by the chat controller.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn send_message(&self, message: &SendMessage) -> WidgetResult<ServerAnswer>;
}

#[derive(Debug, Clone)]
pub struct ProxyClient {
    base_url: String,
    client: Client,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> WidgetResult<Self> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/createRoom`.
    pub async fn create_room(&self) -> WidgetResult<Room> {
        let resp = self
            .client
            .post(self.url("createRoom"))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        let envelope: RoomEnvelope = decode(resp).await?;
        Ok(envelope.room)
    }

    /// `GET /api/defaultQuestions`.
    pub async fn default_questions(&self) -> WidgetResult<Vec<String>> {
        let resp = self
            .client
            .get(self.url("defaultQuestions"))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        let envelope: QuestionsEnvelope = decode(resp).await?;
        Ok(envelope.questions)
    }

    /// `GET /api/messages/{uuid}`: one read, empty answer while pending.
    pub async fn read_answer(&self, message_uuid: &str) -> WidgetResult<ServerAnswer> {
        let resp = self.read_request(message_uuid).send().await?;
        decode(resp).await
    }

    fn read_request(&self, message_uuid: &str) -> RequestBuilder {
        self.client
            .get(self.url(&format!("messages/{message_uuid}")))
            .timeout(REQUEST_TIMEOUT)
    }

    fn send_request(&self, message: &SendMessage) -> RequestBuilder {
        self.client.post(self.url("sendMessage")).json(message)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }
}

#[async_trait]
impl ChatGateway for ProxyClient {
    /// `POST /api/sendMessage`; the server holds the request until the
    /// answer is known or its poll budget runs out.
    async fn send_message(&self, message: &SendMessage) -> WidgetResult<ServerAnswer> {
        let resp = self.send_request(message).send().await?;
        let answer: ServerAnswer = decode(resp).await?;
        debug!(
            message = answer.message_uuid.as_deref().unwrap_or("-"),
            answered = !answer.support_answer.trim().is_empty(),
            "server replied"
        );
        Ok(answer)
    }
}

#[async_trait]
impl AnswerSource for ProxyClient {
    async fn check_answer(&self, message_uuid: &str) -> WidgetResult<Option<String>> {
        let answer = self.read_answer(message_uuid).await?;
        let text = answer.support_answer.trim();
        Ok((!text.is_empty()).then(|| text.to_owned()))
    }
}

/// Decode a success body, or turn an error status into [`WidgetError::Server`]
/// carrying the server's `{"error": ...}` message when there is one.
async fn decode<T: DeserializeOwned>(resp: Response) -> WidgetResult<T> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .map(|body| body.error)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_owned());
        return Err(WidgetError::Server { status: status.as_u16(), message });
    }
    Ok(serde_json::from_slice(&bytes)?)
}
