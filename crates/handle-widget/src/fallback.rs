//! Client-side answer polling.
//!
//! Used when the server's reply came back with an empty answer. The loop has
//! its own budget, independent of the server's, and stops early on a
//! non-empty answer or when its token is cancelled.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use handle_vendor::{RetryPolicy, VendorApi};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::WidgetResult;

/// One read of a message's answer.
#[async_trait]
pub trait AnswerSource: Send + Sync {
    /// The answer, or `None` while it is not ready.
    async fn check_answer(&self, message_uuid: &str) -> WidgetResult<Option<String>>;
}

/// Reads the vendor directly. Needs the vendor credential on the client.
pub struct VendorAnswerSource {
    vendor: Arc<dyn VendorApi>,
    retry: RetryPolicy,
}

impl VendorAnswerSource {
    pub fn new(vendor: Arc<dyn VendorApi>, retry: RetryPolicy) -> Self {
        Self { vendor, retry }
    }
}

#[async_trait]
impl AnswerSource for VendorAnswerSource {
    async fn check_answer(&self, message_uuid: &str) -> WidgetResult<Option<String>> {
        let record = self.vendor.get_message(message_uuid, self.retry).await?;
        Ok(record.answer().map(str::to_owned))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackSettings {
    pub max_attempts: u32,
    /// Wait between two checks.
    pub delay: Duration,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Clone)]
pub struct ClientPollFallback {
    source: Arc<dyn AnswerSource>,
    settings: FallbackSettings,
}

impl ClientPollFallback {
    pub fn new(source: Arc<dyn AnswerSource>, settings: FallbackSettings) -> Self {
        Self { source, settings }
    }

    /// Check up to `max_attempts` times, `delay` apart.
    ///
    /// Returns the trimmed answer, or `None` when the budget runs out or
    /// `cancel` fires. Failed checks count as "not ready".
    pub async fn poll_for_answer(&self, message_uuid: &str, cancel: &CancellationToken) -> Option<String> {
        for attempt in 1..=self.settings.max_attempts {
            let checked = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(message = message_uuid, attempt, "answer polling cancelled");
                    return None;
                }
                checked = self.source.check_answer(message_uuid) => checked,
            };

            match checked {
                Ok(Some(answer)) if !answer.trim().is_empty() => {
                    debug!(message = message_uuid, attempt, "answer received");
                    return Some(answer.trim().to_owned());
                }
                Ok(_) => debug!(message = message_uuid, attempt, "answer not ready"),
                Err(e) => warn!(message = message_uuid, attempt, error = %e, "answer check failed"),
            }

            if attempt == self.settings.max_attempts {
                break;
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(message = message_uuid, attempt, "answer polling cancelled");
                    return None;
                }
                _ = tokio::time::sleep(self.settings.delay) => {}
            }
        }
        debug!(message = message_uuid, attempts = self.settings.max_attempts, "answer polling gave up");
        None
    }
}

#[cfg(test)]
mod test {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use handle_vendor::VendorClient;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::WidgetError;

    #[derive(Default)]
    struct ScriptedSource {
        replies: Mutex<VecDeque<WidgetResult<Option<String>>>>,
        checks: AtomicU32,
    }

    impl ScriptedSource {
        fn new(replies: Vec<WidgetResult<Option<String>>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                checks: AtomicU32::new(0),
            })
        }

        fn checks(&self) -> u32 {
            self.checks.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnswerSource for ScriptedSource {
        async fn check_answer(&self, _message_uuid: &str) -> WidgetResult<Option<String>> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            self.replies.lock().unwrap().pop_front().unwrap_or(Ok(None))
        }
    }

    fn fallback(source: Arc<ScriptedSource>) -> ClientPollFallback {
        ClientPollFallback::new(source, FallbackSettings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn answer_on_third_check() {
        let source = ScriptedSource::new(vec![
            Ok(None),
            Err(WidgetError::Server { status: 502, message: "Bad Gateway".into() }),
            Ok(Some("  late answer \n".into())),
        ]);
        let started = tokio::time::Instant::now();

        let answer = fallback(source.clone()).poll_for_answer("m1", &CancellationToken::new()).await;

        assert_eq!(answer.as_deref(), Some("late answer"));
        assert_eq!(source.checks(), 3);
        assert!(started.elapsed() < Duration::from_millis(2100));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_budget() {
        let source = ScriptedSource::new(vec![Ok(Some("   ".into()))]);
        let started = tokio::time::Instant::now();

        let answer = fallback(source.clone()).poll_for_answer("m1", &CancellationToken::new()).await;

        assert_eq!(answer, None);
        assert_eq!(source.checks(), 10);
        assert!(started.elapsed() < Duration::from_millis(9100));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_at_next_wait() {
        let source = ScriptedSource::new(vec![]);
        let cancel = CancellationToken::new();
        let poller = fallback(source.clone());

        let task = {
            let cancel = cancel.clone();
            tokio::spawn(async move { poller.poll_for_answer("m1", &cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(1500)).await;
        cancel.cancel();

        assert_eq!(task.await.unwrap(), None);
        assert_eq!(source.checks(), 2);
    }

    #[tokio::test]
    async fn vendor_source_reads_the_vendor_directly() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/messages/m1/"))
            .and(header("Authorization", "Token secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uuid": "m1",
                "support_answer": " direct "
            })))
            .expect(1)
            .mount(&server)
            .await;

        let vendor = Arc::new(VendorClient::new(server.uri(), "secret").unwrap());
        let source = VendorAnswerSource::new(vendor, RetryPolicy::once());

        assert_eq!(source.check_answer("m1").await.unwrap().as_deref(), Some("direct"));
    }

    #[tokio::test]
    async fn already_cancelled_makes_no_check() {
        let source = ScriptedSource::new(vec![Ok(Some("x".into()))]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(fallback(source.clone()).poll_for_answer("m1", &cancel).await, None);
        assert_eq!(source.checks(), 0);
    }
}
