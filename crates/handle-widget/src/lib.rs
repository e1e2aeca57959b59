//! Client side of the chat widget.
//!
//! Talks to `handle-server` through [`ProxyClient`], keeps the session in a
//! [`KeyValueStore`], and presents answers through a [`PresenterSink`] with a
//! word-by-word typing effect.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use handle_widget::*;
//!
//! let proxy = Arc::new(ProxyClient::new("http://localhost:3000")?);
//! let session = SessionState::new(Arc::new(FileStore::open("session.json")?));
//! let controller = ChatController::new(
//!     proxy.clone(),
//!     ClientPollFallback::new(proxy, FallbackSettings::default()),
//!     TypingPresenter::new(Arc::new(my_sink), TypingSettings::default()),
//!     session,
//! );
//! controller.submit("What are your opening hours?").await?;
//! ```

pub mod controller;
pub mod error;
pub mod fallback;
pub mod form;
pub mod presenter;
pub mod proxy;
pub mod render;
pub mod session;
pub mod store;

pub use controller::{ChatController, ComposerMode, Feedback, RETRY_PROMPT};
pub use error::{WidgetError, WidgetResult};
pub use fallback::{AnswerSource, ClientPollFallback, FallbackSettings, VendorAnswerSource};
pub use form::{FormRequirements, IdentityForm};
pub use presenter::{PresenterSink, SlotId, SlotPhase, TypingPass, TypingPresenter, TypingSettings};
pub use proxy::{ChatGateway, ProxyClient, SendMessage, ServerAnswer};
pub use render::{RenderedAnswer, render_markdown};
pub use session::{Identity, Session, SessionKey, SessionState};
pub use store::{FileStore, KeyValueStore, MemoryStore};
