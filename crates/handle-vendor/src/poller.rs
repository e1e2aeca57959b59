//! Server-side answer polling.
//!
//! The vendor generates answers asynchronously. [`AnswerPoller`] re-reads a
//! message until its `support_answer` is populated or the poll budget runs
//! out. A read that still fails after its own retries is logged and counted
//! but never aborts the loop.

use tracing::{debug, warn};

use crate::client::VendorApi;
use crate::settings::ResolutionSettings;
use crate::types::MessageRecord;

/// Result of a polling run. Exhaustion is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A non-empty answer was observed on read number `polls`.
    Answered {
        record: MessageRecord,
        polls: u32,
        failed_polls: u32,
    },
    /// `polls` reads were made and none carried an answer.
    Exhausted { polls: u32, failed_polls: u32 },
}

impl PollOutcome {
    pub fn polls(&self) -> u32 {
        match self {
            PollOutcome::Answered { polls, .. } | PollOutcome::Exhausted { polls, .. } => *polls,
        }
    }

    pub fn failed_polls(&self) -> u32 {
        match self {
            PollOutcome::Answered { failed_polls, .. }
            | PollOutcome::Exhausted { failed_polls, .. } => *failed_polls,
        }
    }
}

pub struct AnswerPoller<'a> {
    vendor: &'a dyn VendorApi,
    settings: &'a ResolutionSettings,
}

impl<'a> AnswerPoller<'a> {
    pub fn new(vendor: &'a dyn VendorApi, settings: &'a ResolutionSettings) -> Self {
        Self { vendor, settings }
    }

    /// Poll message `uuid` until answered or `poll_budget` reads have been made.
    pub async fn poll(&self, uuid: &str) -> PollOutcome {
        let mut failed_polls = 0;

        for attempt in 1..=self.settings.poll_budget {
            tokio::time::sleep(self.settings.poll_delay).await;

            match self.vendor.get_message(uuid, self.settings.poll_retry).await {
                Ok(record) => {
                    if record.answer().is_some() {
                        debug!(message = %uuid, polls = attempt, "answer ready");
                        return PollOutcome::Answered {
                            record,
                            polls: attempt,
                            failed_polls,
                        };
                    }
                    debug!(message = %uuid, attempt, "answer not ready");
                }
                Err(e) => {
                    failed_polls += 1;
                    warn!(message = %uuid, attempt, error = %e, "polling read failed");
                }
            }
        }

        PollOutcome::Exhausted {
            polls: self.settings.poll_budget,
            failed_polls,
        }
    }
}
