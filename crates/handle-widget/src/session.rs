//! Persisted chat session: room, identity and greeting.

use std::sync::Arc;

use handle_vendor::Room;
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::error::WidgetResult;
use crate::store::KeyValueStore;

/// Storage keys. The string forms are the names the browser widget uses, so
/// a store file can be read by either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumIter)]
pub enum SessionKey {
    #[strum(serialize = "askhandleRoomUUID")]
    RoomUuid,
    #[strum(serialize = "nickname")]
    Nickname,
    #[strum(serialize = "email")]
    Email,
    #[strum(serialize = "phone")]
    Phone,
    #[strum(serialize = "greeting_message")]
    GreetingMessage,
    #[strum(serialize = "formSubmitted")]
    FormSubmitted,
}

/// Who is chatting, as collected by the landing form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub nickname: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub room_uuid: String,
    pub identity: Identity,
    pub greeting_message: Option<String>,
}

/// Reads and writes the session through a [`KeyValueStore`].
#[derive(Clone)]
pub struct SessionState {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState").finish_non_exhaustive()
    }
}

impl SessionState {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Record a freshly created room and the submitted identity.
    ///
    /// The form-submitted flag is written last, so an interrupted write
    /// leaves no loadable session behind.
    pub fn begin(&self, room: &Room, identity: &Identity) -> WidgetResult<Session> {
        self.put(SessionKey::RoomUuid, &room.uuid)?;
        self.put(SessionKey::Nickname, &identity.nickname)?;
        self.put(SessionKey::Email, &identity.email)?;
        self.put(SessionKey::Phone, &identity.phone)?;

        let greeting = room
            .greeting_message
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_owned);
        match &greeting {
            Some(g) => self.put(SessionKey::GreetingMessage, g)?,
            None => self.store.remove(SessionKey::GreetingMessage.as_ref())?,
        }

        self.put(SessionKey::FormSubmitted, "true")?;
        info!(room = %room.uuid, "chat session started");

        Ok(Session {
            room_uuid: room.uuid.clone(),
            identity: identity.clone(),
            greeting_message: greeting,
        })
    }

    /// The stored session, if the form was submitted and a room exists.
    pub fn load(&self) -> Option<Session> {
        self.get(SessionKey::FormSubmitted)?;
        let room_uuid = self.get(SessionKey::RoomUuid)?;

        Some(Session {
            room_uuid,
            identity: Identity {
                nickname: self.get(SessionKey::Nickname).unwrap_or_default(),
                email: self.get(SessionKey::Email).unwrap_or_default(),
                phone: self.get(SessionKey::Phone).unwrap_or_default(),
            },
            greeting_message: self.get(SessionKey::GreetingMessage),
        })
    }

    pub fn greeting(&self) -> Option<String> {
        self.load()?.greeting_message
    }

    /// Forget everything; the next start shows the landing form again.
    pub fn leave(&self) -> WidgetResult<()> {
        for key in SessionKey::iter() {
            self.store.remove(key.as_ref())?;
        }
        debug!("chat session cleared");
        Ok(())
    }

    fn put(&self, key: SessionKey, value: &str) -> WidgetResult<()> {
        self.store.set(key.as_ref(), value)
    }

    /// Blank values count as absent.
    fn get(&self, key: SessionKey) -> Option<String> {
        self.store.get(key.as_ref()).filter(|v| !v.trim().is_empty())
    }
}
