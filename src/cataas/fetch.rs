use super::{CatApi, FetchError};
use crate::config::{FETCH_BACKOFF_MS, FETCH_MAX_RETRIES};
use bytes::Bytes;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::RetryIf;
use tracing::warn;

/// Bounded retry schedule for image fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_retries: u32,
    /// Fixed pause between two attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: FETCH_MAX_RETRIES,
            backoff: Duration::from_millis(FETCH_BACKOFF_MS),
        }
    }
}

/// Fetch `url`, retrying HTTP 500 and transport faults.
///
/// Attempts run one after another. A 200 answer returns its body at once.
/// HTTP 500 and transport faults wait `policy.backoff` and try again while
/// attempts remain; any other status fails immediately. When the attempts
/// run out the last error is returned, so repeated 500s end as
/// `FetchError::Status(500)`.
///
/// # Errors
///
/// Returns the terminal [`FetchError`] described above.
///
/// # Examples
///
/// ```no_run
/// use cataas_bot::cataas::{fetch_with_retry, CatUrls, HttpCatApi, RetryPolicy};
///
/// # async fn example() -> Result<(), cataas_bot::cataas::FetchError> {
/// let api = HttpCatApi::new();
/// let url = CatUrls::default().cat(Some("cute"));
/// let image = fetch_with_retry(&api, &url, RetryPolicy::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn fetch_with_retry<A>(
    api: &A,
    url: &str,
    policy: RetryPolicy,
) -> Result<Bytes, FetchError>
where
    A: CatApi + ?Sized,
{
    if policy.max_retries == 0 {
        return Err(FetchError::Status(500));
    }

    let attempts = AtomicU32::new(0);
    let counter = &attempts;
    let strategy = FixedInterval::new(policy.backoff).take(policy.max_retries as usize - 1);

    let result = RetryIf::spawn(
        strategy,
        move || {
            let attempt = counter.fetch_add(1, Ordering::Relaxed) + 1;
            async move {
                let outcome = fetch_once(api, url).await;
                if let Err(ref e) = outcome {
                    if e.is_transient() && attempt < policy.max_retries {
                        warn!(
                            "Fetch attempt {}/{} for {} failed: {}. Retrying.",
                            attempt, policy.max_retries, url, e
                        );
                    }
                }
                outcome
            }
        },
        FetchError::is_transient,
    )
    .await;

    if let Err(ref e) = result {
        warn!(
            "Fetch of {} gave up after {} attempt(s): {}",
            url,
            attempts.load(Ordering::Relaxed),
            e
        );
    }
    result
}

async fn fetch_once<A>(api: &A, url: &str) -> Result<Bytes, FetchError>
where
    A: CatApi + ?Sized,
{
    let response = api.get(url).await?;
    if response.status == 200 {
        Ok(response.body)
    } else {
        Err(FetchError::Status(response.status))
    }
}
