//! Chat controller: the composer, the transcript slots and their lifecycle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use handle_vendor::FALLBACK_ANSWER;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{WidgetError, WidgetResult};
use crate::fallback::ClientPollFallback;
use crate::presenter::{SlotId, TypingPresenter};
use crate::proxy::{ChatGateway, SendMessage};
use crate::session::SessionState;

/// Shown in a slot whenever a submission fails; raw errors go to the log.
pub const RETRY_PROMPT: &str =
    "There was a problem processing your request. Please try again in a few seconds.";

/// What the composer's button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ComposerMode {
    Send,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Feedback {
    Up,
    Down,
}

struct Transcript {
    next_slot: SlotId,
    /// User message behind each bot slot, for refresh.
    messages: HashMap<SlotId, String>,
    next_run: u64,
    /// Latest run of each bot slot. Only that run may present into the slot;
    /// deleting the slot drops the entry.
    owners: HashMap<SlotId, u64>,
    /// Fallback polls of submissions still in flight, tagged by run.
    in_flight: HashMap<SlotId, (u64, CancellationToken)>,
}

impl Transcript {
    fn mode(&self) -> ComposerMode {
        if self.in_flight.is_empty() {
            ComposerMode::Send
        } else {
            ComposerMode::Stop
        }
    }
}

pub struct ChatController {
    gateway: Arc<dyn ChatGateway>,
    fallback: ClientPollFallback,
    presenter: TypingPresenter,
    session: SessionState,
    transcript: Mutex<Transcript>,
}

impl ChatController {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        fallback: ClientPollFallback,
        presenter: TypingPresenter,
        session: SessionState,
    ) -> Self {
        Self {
            gateway,
            fallback,
            presenter,
            session,
            transcript: Mutex::new(Transcript {
                next_slot: 1,
                next_run: 0,
                messages: HashMap::new(),
                owners: HashMap::new(),
                in_flight: HashMap::new(),
            }),
        }
    }

    pub fn mode(&self) -> ComposerMode {
        self.lock().mode()
    }

    pub fn presenter(&self) -> &TypingPresenter {
        &self.presenter
    }

    /// Put the room's greeting in a slot of its own, if there is one.
    pub fn greeting(&self) -> Option<SlotId> {
        let greeting = self.session.greeting()?;
        let slot = self.allocate();
        self.presenter.show_text(slot, &greeting);
        Some(slot)
    }

    /// Send `text` and present the answer in a new slot.
    ///
    /// Blank input is ignored. Returns once the slot has settled.
    pub async fn submit(&self, text: &str) -> WidgetResult<Option<SlotId>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        if self.session.load().is_none() {
            return Err(WidgetError::NoSession);
        }

        let slot = self.allocate();
        self.lock().messages.insert(slot, text.to_owned());
        self.run(slot, text).await?;
        Ok(Some(slot))
    }

    /// The composer button: stops in [`ComposerMode::Stop`], submits otherwise.
    pub async fn press_send(&self, text: &str) -> WidgetResult<Option<SlotId>> {
        if self.mode() == ComposerMode::Stop {
            self.stop();
            return Ok(None);
        }
        self.submit(text).await
    }

    /// Return the composer to [`ComposerMode::Send`] and cancel pending
    /// client-side polling. Typing already under way finishes.
    pub fn stop(&self) {
        let cancelled: Vec<_> = self.lock().in_flight.drain().collect();
        for (slot, (_, token)) in cancelled {
            token.cancel();
            info!(slot, "submission stopped");
        }
    }

    /// Send the slot's message again and present the new answer in place.
    pub async fn refresh(&self, slot: SlotId) -> WidgetResult<()> {
        let message = self
            .lock()
            .messages
            .get(&slot)
            .cloned()
            .ok_or(WidgetError::UnknownSlot(slot))?;
        self.run(slot, &message).await
    }

    pub fn delete(&self, slot: SlotId) {
        {
            let mut transcript = self.lock();
            transcript.messages.remove(&slot);
            transcript.owners.remove(&slot);
            if let Some((_, token)) = transcript.in_flight.remove(&slot) {
                token.cancel();
            }
        }
        self.presenter.remove(slot);
    }

    /// Plain text of a settled slot.
    pub fn copy_text(&self, slot: SlotId) -> Option<String> {
        self.presenter.text(slot)
    }

    pub fn feedback(&self, slot: SlotId, feedback: Feedback) {
        info!(slot, %feedback, "answer feedback");
    }

    /// Stop everything and forget the session.
    pub fn leave(&self) -> WidgetResult<()> {
        self.stop();
        self.session.leave()
    }

    async fn run(&self, slot: SlotId, message: &str) -> WidgetResult<()> {
        let session = self.session.load().ok_or(WidgetError::NoSession)?;
        let cancel = CancellationToken::new();
        let run = {
            let mut transcript = self.lock();
            transcript.next_run += 1;
            let run = transcript.next_run;
            transcript.owners.insert(slot, run);
            if let Some((_, previous)) = transcript.in_flight.insert(slot, (run, cancel.clone())) {
                previous.cancel();
            }
            self.presenter.begin(slot);
            run
        };

        let outcome = self.resolve(&SendMessage::new(message, &session), &cancel).await;

        // Presenting happens under the transcript lock so a concurrent
        // delete or refresh either sees the pass or wins before it starts.
        let pass = {
            let transcript = self.lock();
            if transcript.owners.get(&slot) != Some(&run) {
                debug!(slot, run, "answer dropped; slot was deleted or asked again");
                None
            } else {
                match outcome {
                    Ok((answer, citations)) => Some(self.presenter.type_answer(slot, &answer, citations)),
                    Err(e) => {
                        warn!(slot, error = %e, "message submission failed");
                        self.presenter.fail(slot, RETRY_PROMPT);
                        None
                    }
                }
            }
        };
        if let Some(pass) = pass {
            pass.settled().await;
        }

        let mut transcript = self.lock();
        if transcript.in_flight.get(&slot).is_some_and(|(owner, _)| *owner == run) {
            transcript.in_flight.remove(&slot);
        }
        Ok(())
    }

    /// The server's answer, the client fallback's, or the fallback text.
    async fn resolve(
        &self,
        message: &SendMessage,
        cancel: &CancellationToken,
    ) -> WidgetResult<(String, Option<String>)> {
        let reply = self.gateway.send_message(message).await?;
        let mut answer = reply.support_answer.trim().to_owned();

        if answer.is_empty() {
            if let Some(uuid) = reply.message_uuid.as_deref() {
                answer = self
                    .fallback
                    .poll_for_answer(uuid, cancel)
                    .await
                    .unwrap_or_default();
            }
        }
        if answer.is_empty() {
            answer = FALLBACK_ANSWER.to_owned();
        }
        Ok((answer, reply.citations))
    }

    fn allocate(&self) -> SlotId {
        let mut transcript = self.lock();
        let slot = transcript.next_slot;
        transcript.next_slot += 1;
        slot
    }

    fn lock(&self) -> MutexGuard<'_, Transcript> {
        self.transcript.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
