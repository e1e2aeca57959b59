//! Submit a message and resolve its answer.

use tracing::info;

use crate::client::VendorApi;
use crate::error::VendorError;
use crate::poller::{AnswerPoller, PollOutcome};
use crate::settings::ResolutionSettings;
use crate::types::OutgoingMessage;

/// Answer returned when the poll budget runs out.
pub const FALLBACK_ANSWER: &str = "No response received.";

/// What the caller gets back once a message was accepted by the vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Trimmed vendor answer, or [`FALLBACK_ANSWER`].
    pub answer: String,
    pub message_uuid: String,
    pub citations: Option<String>,
    /// Reads made after the write; zero on the inline fast path.
    pub polls: u32,
    pub failed_polls: u32,
    /// `true` when `answer` is the fallback text.
    pub timed_out: bool,
}

/// Submit `message`, then poll until an answer exists or the budget is spent.
///
/// Only a failed submission is an error. Once the vendor has accepted the
/// message the caller always receives a [`Resolution`].
pub async fn resolve_answer(
    vendor: &dyn VendorApi,
    settings: &ResolutionSettings,
    message: &OutgoingMessage,
) -> Result<Resolution, VendorError> {
    let written = vendor.post_message(message, settings.submit).await?;

    if let Some(answer) = written.answer() {
        info!(message = %written.uuid, "answer returned inline");
        return Ok(Resolution {
            answer: answer.to_owned(),
            citations: written.citations.clone(),
            message_uuid: written.uuid,
            polls: 0,
            failed_polls: 0,
            timed_out: false,
        });
    }

    let outcome = AnswerPoller::new(vendor, settings).poll(&written.uuid).await;
    info!(
        message = %written.uuid,
        polls = outcome.polls(),
        failed_polls = outcome.failed_polls(),
        answered = matches!(outcome, PollOutcome::Answered { .. }),
        "answer polling finished"
    );

    Ok(match outcome {
        PollOutcome::Answered { record, polls, failed_polls } => Resolution {
            answer: record.answer().unwrap_or(FALLBACK_ANSWER).to_owned(),
            citations: record.citations,
            message_uuid: written.uuid,
            polls,
            failed_polls,
            timed_out: false,
        },
        PollOutcome::Exhausted { polls, failed_polls } => Resolution {
            answer: FALLBACK_ANSWER.to_owned(),
            citations: None,
            message_uuid: written.uuid,
            polls,
            failed_polls,
            timed_out: true,
        },
    })
}

#[cfg(test)]
mod test {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::poller::test::{ScriptedVendor, outage, record};
    use crate::types::RoomRef;

    fn hi() -> OutgoingMessage {
        OutgoingMessage {
            body: "Hi".into(),
            nickname: "Bob".into(),
            email: "b@x.com".into(),
            phone_number: "+15551234567".into(),
            room: RoomRef { uuid: "r1".into() },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn inline_answer_skips_polling() {
        let vendor = ScriptedVendor::new(Ok(record("Hi there!")), vec![]);
        let settings = ResolutionSettings::default();

        let res = resolve_answer(&vendor, &settings, &hi()).await.unwrap();

        assert_eq!(res.answer, "Hi there!");
        assert_eq!(res.polls, 0);
        assert!(!res.timed_out);
        assert_eq!(vendor.gets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn answer_on_third_poll_wastes_two() {
        let vendor = ScriptedVendor::new(
            Ok(record("")),
            vec![Ok(record("")), Ok(record("")), Ok(record("42"))],
        );
        let settings = ResolutionSettings::default();

        let res = resolve_answer(&vendor, &settings, &hi()).await.unwrap();

        assert_eq!(res.answer, "42");
        assert_eq!(res.polls, 3);
        assert_eq!(vendor.gets.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_budget_yields_fallback_text() {
        let vendor = ScriptedVendor::new(Ok(record("")), vec![]);
        let settings = ResolutionSettings::default();

        let res = resolve_answer(&vendor, &settings, &hi()).await.unwrap();

        assert_eq!(res.answer, FALLBACK_ANSWER);
        assert!(res.timed_out);
        assert_eq!(res.polls, 10);
        assert_eq!(vendor.gets.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_submission_is_an_error_and_never_polls() {
        let vendor = ScriptedVendor::new(Err(outage()), vec![]);
        let settings = ResolutionSettings::default();

        let err = resolve_answer(&vendor, &settings, &hi()).await.unwrap_err();

        assert_eq!(err.to_string(), "HTTP error 502: Bad Gateway");
        assert_eq!(vendor.posts.load(Ordering::SeqCst), 1);
        assert_eq!(vendor.gets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn citations_follow_the_answer() {
        let mut answered = record("See docs");
        answered.citations = Some("https://example.com/docs".into());
        let vendor = ScriptedVendor::new(Ok(record("")), vec![Ok(answered)]);
        let settings = ResolutionSettings::default();

        let res = resolve_answer(&vendor, &settings, &hi()).await.unwrap();

        assert_eq!(res.citations.as_deref(), Some("https://example.com/docs"));
    }
}
