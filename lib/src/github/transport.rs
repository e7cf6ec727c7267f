//! Rate-limited HTTP transport for the GitHub API.
//!
//! All outbound calls go through [`Transport::send`], which enforces a
//! minimum spacing between dispatch instants and handles GitHub's
//! quota-exhaustion signal (403 with `x-ratelimit-*` headers) with a
//! bounded wait and a single retry.

use super::types::TrackerError;
use chrono::Utc;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Minimum spacing between the start of one outbound call and the next.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(1000);

/// Longest quota-reset wait worth sitting out before retrying.
const MAX_RESET_WAIT: Duration = Duration::from_secs(300);

/// Margin added to the reset wait so the retry lands after the reset.
const RESET_SAFETY_MARGIN: Duration = Duration::from_secs(1);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CLIENT_USER_AGENT: &str = "relwatch";

/// GitHub API error response body.
#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: String,
}

/// Outcome of inspecting a 403 response's quota headers.
#[derive(Debug, PartialEq, Eq)]
enum QuotaSignal {
    /// Quota exhausted, reset near enough to wait out
    WaitThenRetry(Duration),
    /// Quota exhausted, reset too far away (or unreported)
    Exhausted(Option<Duration>),
    /// Not a quota signal; treat the 403 like any other failure status
    NotExhausted,
}

/// HTTP transport that serializes dispatches and survives quota resets.
///
/// Cheap to clone; clones share the pacing state.
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: Client,
    token: Option<String>,
    last_dispatch: Arc<Mutex<Option<Instant>>>,
}

impl Transport {
    pub(crate) fn new(token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            token,
            last_dispatch: Arc::new(Mutex::new(None)),
        }
    }

    /// Send a GET request, pacing dispatches and retrying once across a
    /// near quota reset.
    ///
    /// ## Errors
    ///
    /// - `TrackerError::Http` - connection or protocol failure
    /// - `TrackerError::RateLimited` - quota exhausted, reset too far to wait
    /// - `TrackerError::Status` - any other non-success response
    pub(crate) async fn send(&self, url: Url) -> Result<Response, TrackerError> {
        let response = self.dispatch(url.clone()).await?;
        if response.status() != StatusCode::FORBIDDEN {
            return check_status(response).await;
        }

        // Attempt -> WaitThenRetry -> one more attempt, bounded by construction.
        match classify_quota(&response) {
            QuotaSignal::WaitThenRetry(wait) => {
                warn!(
                    wait_secs = wait.as_secs(),
                    "rate limit exhausted, waiting for quota reset"
                );
                sleep(wait + RESET_SAFETY_MARGIN).await;
                let retried = self.dispatch(url).await?;
                if retried.status() == StatusCode::FORBIDDEN {
                    // The single retry is spent. A quota still showing
                    // exhausted is terminal no matter how near the reset is.
                    match classify_quota(&retried) {
                        QuotaSignal::WaitThenRetry(reset) => {
                            return Err(TrackerError::RateLimited {
                                reset_in: Some(reset),
                            });
                        }
                        QuotaSignal::Exhausted(reset_in) => {
                            return Err(TrackerError::RateLimited { reset_in });
                        }
                        QuotaSignal::NotExhausted => {}
                    }
                }
                check_status(retried).await
            }
            QuotaSignal::Exhausted(reset_in) => Err(TrackerError::RateLimited { reset_in }),
            QuotaSignal::NotExhausted => check_status(response).await,
        }
    }

    /// Dispatch one request, sleeping first if the previous dispatch was
    /// less than [`MIN_REQUEST_INTERVAL`] ago.
    ///
    /// The pacing lock is held across the catch-up sleep, so concurrent
    /// dispatches serialize at least one interval apart.
    async fn dispatch(&self, url: Url) -> Result<Response, TrackerError> {
        {
            let mut last = self.last_dispatch.lock().await;
            if let Some(previous) = *last {
                let since = previous.elapsed();
                if since < MIN_REQUEST_INTERVAL {
                    debug!(
                        wait_ms = (MIN_REQUEST_INTERVAL - since).as_millis() as u64,
                        "pacing outbound request"
                    );
                    sleep(MIN_REQUEST_INTERVAL - since).await;
                }
            }
            *last = Some(Instant::now());
        }

        let mut request = self
            .http
            .get(url)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .header(ACCEPT, "application/vnd.github+json")
            .timeout(REQUEST_TIMEOUT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        Ok(request.send().await?)
    }
}

/// Map a non-success response to a `Status` error carrying the code and
/// GitHub's error message (or the raw body when it isn't the usual shape).
async fn check_status(response: Response) -> Result<Response, TrackerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<GitHubErrorBody>(&body) {
        Ok(parsed) => parsed.message,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };

    Err(TrackerError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Inspect a 403 response's `x-ratelimit-remaining` / `x-ratelimit-reset`
/// headers and decide whether the reset is worth waiting out.
fn classify_quota(response: &Response) -> QuotaSignal {
    let remaining = header_value(response, "x-ratelimit-remaining");
    if remaining.as_deref() != Some("0") {
        return QuotaSignal::NotExhausted;
    }

    let reset_in = header_value(response, "x-ratelimit-reset")
        .and_then(|raw| raw.parse::<i64>().ok())
        .map(|epoch| {
            let until_reset = epoch - Utc::now().timestamp();
            Duration::from_secs(until_reset.max(0) as u64)
        });

    match reset_in {
        Some(wait) if wait <= MAX_RESET_WAIT => QuotaSignal::WaitThenRetry(wait),
        other => QuotaSignal::Exhausted(other),
    }
}

fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}
