//! Typing presenter: reveals answers word by word into transcript slots.
//!
//! Each slot moves `Idle → LoadingIndicatorVisible → Typing → Settled`. A
//! typing pass runs as its own tokio task. Starting anything new on a slot
//! aborts the slot's running task and bumps its pass counter; every sink
//! write happens under the slot lock after checking that counter, so a pass
//! that lost the race can never write.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, trace};

use crate::render::render_markdown;

/// Transcript position of one bot reply.
pub type SlotId = u64;

/// Separator written after every typed word.
pub const NBSP: char = '\u{00A0}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum SlotPhase {
    #[default]
    Idle,
    LoadingIndicatorVisible,
    Typing,
    Settled,
}

/// Where the presenter draws.
///
/// Calls are made while the presenter holds its slot lock; implementations
/// must not call back into the presenter.
pub trait PresenterSink: Send + Sync {
    fn indicator(&self, slot: SlotId, visible: bool);
    /// Remove whatever the slot currently shows.
    fn clear(&self, slot: SlotId);
    fn append(&self, slot: SlotId, text: &str);
    /// Replace the typed text with the final rich content.
    fn settle(&self, slot: SlotId, html: &str);
    /// Show plain text in place of any content (errors, greeting).
    fn plain(&self, slot: SlotId, text: &str);
    fn feedback(&self, slot: SlotId, visible: bool);
    fn citations(&self, slot: SlotId, citations: &str);
    fn remove(&self, slot: SlotId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingSettings {
    /// Delay before each word.
    pub cadence: Duration,
}

impl Default for TypingSettings {
    fn default() -> Self {
        Self { cadence: Duration::from_millis(50) }
    }
}

#[derive(Default)]
struct SlotEntry {
    phase: SlotPhase,
    pass: u64,
    task: Option<AbortHandle>,
    /// Plain text of what the slot shows once settled.
    text: String,
}

impl SlotEntry {
    /// Abort the running pass and claim the slot for a new one.
    fn supersede(&mut self) -> u64 {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.pass += 1;
        self.pass
    }
}

struct Shared {
    sink: Arc<dyn PresenterSink>,
    slots: Mutex<HashMap<SlotId, SlotEntry>>,
}

impl Shared {
    /// Run `write` against the slot if `pass` still owns it.
    fn write_if_current(
        &self,
        slot: SlotId,
        pass: u64,
        write: impl FnOnce(&mut SlotEntry, &dyn PresenterSink),
    ) -> bool {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        match slots.get_mut(&slot) {
            Some(entry) if entry.pass == pass && entry.phase == SlotPhase::Typing => {
                write(entry, self.sink.as_ref());
                true
            }
            _ => false,
        }
    }
}

/// Handle to a running typing pass.
#[derive(Debug)]
pub struct TypingPass {
    handle: JoinHandle<bool>,
}

impl TypingPass {
    /// Wait for the pass; `false` when it was superseded before settling.
    pub async fn settled(self) -> bool {
        matches!(self.handle.await, Ok(true))
    }
}

#[derive(Clone)]
pub struct TypingPresenter {
    shared: Arc<Shared>,
    settings: TypingSettings,
}

impl std::fmt::Debug for TypingPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingPresenter")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl TypingPresenter {
    pub fn new(sink: Arc<dyn PresenterSink>, settings: TypingSettings) -> Self {
        Self {
            shared: Arc::new(Shared { sink, slots: Mutex::new(HashMap::new()) }),
            settings,
        }
    }

    pub fn phase(&self, slot: SlotId) -> SlotPhase {
        self.lock().get(&slot).map(|e| e.phase).unwrap_or_default()
    }

    /// Plain text of a settled slot.
    pub fn text(&self, slot: SlotId) -> Option<String> {
        self.lock()
            .get(&slot)
            .filter(|e| e.phase == SlotPhase::Settled)
            .map(|e| e.text.clone())
    }

    /// Show the busy indicator while an answer is being fetched.
    pub fn begin(&self, slot: SlotId) {
        let sink = &self.shared.sink;
        let mut slots = self.lock();
        let entry = slots.entry(slot).or_default();
        entry.supersede();
        entry.phase = SlotPhase::LoadingIndicatorVisible;
        entry.text.clear();
        sink.clear(slot);
        sink.feedback(slot, false);
        sink.indicator(slot, true);
    }

    /// Start typing `markdown` into the slot, replacing any running pass.
    ///
    /// Must be called from within a tokio runtime.
    pub fn type_answer(&self, slot: SlotId, markdown: &str, citations: Option<String>) -> TypingPass {
        let rendered = render_markdown(markdown);
        let words: Vec<String> = rendered.words().map(|w| format!("{w}{NBSP}")).collect();
        let cadence = self.settings.cadence;
        let shared = Arc::clone(&self.shared);

        let mut slots = self.lock();
        let entry = slots.entry(slot).or_default();
        let pass = entry.supersede();
        entry.phase = SlotPhase::Typing;
        entry.text = rendered.text.clone();
        self.shared.sink.indicator(slot, false);
        self.shared.sink.clear(slot);
        debug!(slot, pass, words = words.len(), "typing pass started");

        let handle = tokio::spawn(async move {
            for word in &words {
                tokio::time::sleep(cadence).await;
                if !shared.write_if_current(slot, pass, |_, sink| sink.append(slot, word)) {
                    trace!(slot, pass, "typing pass superseded");
                    return false;
                }
            }
            shared.write_if_current(slot, pass, |entry, sink| {
                entry.phase = SlotPhase::Settled;
                entry.task = None;
                sink.settle(slot, &rendered.html);
                sink.feedback(slot, true);
                if let Some(citations) = citations.as_deref().filter(|c| !c.trim().is_empty()) {
                    sink.citations(slot, citations);
                }
            })
        });
        entry.task = Some(handle.abort_handle());
        TypingPass { handle }
    }

    /// Settle the slot on an error message, without feedback.
    pub fn fail(&self, slot: SlotId, message: &str) {
        self.show_text(slot, message);
    }

    /// Settle the slot on plain text immediately.
    pub fn show_text(&self, slot: SlotId, text: &str) {
        let sink = &self.shared.sink;
        let mut slots = self.lock();
        let entry = slots.entry(slot).or_default();
        entry.supersede();
        entry.phase = SlotPhase::Settled;
        entry.text = text.to_owned();
        sink.indicator(slot, false);
        sink.feedback(slot, false);
        sink.plain(slot, text);
    }

    /// Drop the slot and stop anything still writing to it.
    pub fn remove(&self, slot: SlotId) {
        let mut slots = self.lock();
        if let Some(mut entry) = slots.remove(&slot) {
            entry.supersede();
            self.shared.sink.remove(slot);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SlotId, SlotEntry>> {
        self.shared.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
