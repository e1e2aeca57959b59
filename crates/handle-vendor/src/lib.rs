//! Client, retry and polling primitives for the hosted chat vendor.
//!
//! ```rust,ignore
//! use handle_vendor::{resolve_answer, OutgoingMessage, ResolutionSettings, RoomRef, VendorClient};
//!
//! let vendor = VendorClient::new(handle_vendor::DEFAULT_BASE_URL, "token").unwrap();
//! let message = OutgoingMessage {
//!     body: "Hello".into(),
//!     nickname: "Bob".into(),
//!     email: "b@x.com".into(),
//!     phone_number: "+15551234567".into(),
//!     room: RoomRef { uuid: "room-uuid".into() },
//! };
//! let resolution = resolve_answer(&vendor, &ResolutionSettings::default(), &message)
//!     .await
//!     .unwrap();
//! println!("{}", resolution.answer);
//! ```

pub mod client;
pub mod error;
pub mod poller;
pub mod resolve;
pub mod retry;
pub mod settings;
pub mod types;

pub use client::{DEFAULT_BASE_URL, VendorApi, VendorClient};
pub use error::VendorError;
pub use poller::{AnswerPoller, PollOutcome};
pub use resolve::{FALLBACK_ANSWER, Resolution, resolve_answer};
pub use retry::{fetch_with_retry, retry_fixed};
pub use settings::{ResolutionSettings, RetryPolicy};
pub use types::{MessageRecord, OutgoingMessage, Room, RoomRef, is_plain_id};
