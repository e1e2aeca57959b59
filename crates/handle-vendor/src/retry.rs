//! Bounded, fixed-delay retrying.
//!
//! [`retry_fixed`] is the generic loop; [`fetch_with_retry`] applies it to a
//! single HTTP request, treating any non-2xx status as a failed attempt.

use std::fmt::Display;
use std::future::Future;

use reqwest::{RequestBuilder, Response};
use tracing::debug;

use crate::error::VendorError;
use crate::settings::RetryPolicy;

/// Run `op` until it succeeds or `policy.max_retries` retries have failed.
///
/// The delay between attempts is always `policy.delay`. The error of the
/// last attempt is returned unchanged once the budget is spent.
pub async fn retry_fixed<F, Fut, T, E>(
    policy: RetryPolicy,
    operation: &str,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut failed: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                failed += 1;
                if failed > policy.max_retries {
                    return Err(err);
                }
                debug!(
                    operation,
                    attempt = failed,
                    max_retries = policy.max_retries,
                    error = %err,
                    "attempt failed; retrying"
                );
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

/// Send `request`, retrying transport failures and non-success statuses.
pub async fn fetch_with_retry(
    request: RequestBuilder,
    policy: RetryPolicy,
) -> Result<Response, VendorError> {
    if request.try_clone().is_none() {
        return Err(VendorError::RequestNotCloneable);
    }

    retry_fixed(policy, "vendor request", || {
        let attempt = request.try_clone();
        async move {
            let resp = attempt.ok_or(VendorError::RequestNotCloneable)?.send().await?;
            if resp.status().is_success() {
                Ok(resp)
            } else {
                Err(VendorError::from_status(resp.status()))
            }
        }
    })
    .await
}
