//! Minimal JSON-over-HTTP client with signed requests and rate-limit waiting.
//!
//! - Request options: headers, `Auth`, query params, timeout, retries
//! - Requests can be signed per attempt through a [`RequestSigner`] (OAuth 1.0a needs a
//!   fresh nonce and timestamp on every send)
//! - Network errors and 5xx responses are retried with exponential backoff
//! - HTTP 429 is handled by the client's [`RateLimitPolicy`]: either sleep until the
//!   window resets (`x-rate-limit-reset` / `Retry-After`) and try again, or fail
//! - Optional *raw* response logging via `TWEETIE_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```no_run
//! # async fn demo() -> Result<(), tweetie_http::HttpError> {
//! let client = tweetie_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", tweetie_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Security: the `Authorization` header is never logged, and well-known secret query
//! parameters are replaced with `<redacted>`.

use reqwest::Client;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::env;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::time::sleep;

pub use reqwest::header::HeaderValue;
pub use reqwest::{Method, StatusCode, Url};

const RAW_ENV: &str = "TWEETIE_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const RATE_LIMIT_RESET: &str = "x-rate-limit-reset";
/// Floor applied to a rate-limit wait when the service gives no hint.
const RATE_LIMIT_FLOOR: Duration = Duration::from_millis(1100);

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if key.eq_ignore_ascii_case("authorization") {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (key, val)
        })
        .collect()
}

fn is_secret_param(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "access_token"
            | "authorization"
            | "auth"
            | "key"
            | "api_key"
            | "token"
            | "secret"
            | "oauth_token"
            | "oauth_signature"
            | "bearer"
    )
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("request signing failed: {0}")]
    Signing(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("rate limited, retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },
    #[error("server returned error {status}: {message} (code={code:?}), request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        /// Service-specific error code from the body, when present.
        code: Option<i64>,
        request_id: String,
    },
}

impl HttpError {
    /// Status of an API error, `None` for transport-level failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            HttpError::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            _ => None,
        }
    }
}

/// Produces an `Authorization` header for one concrete request attempt.
///
/// `url` carries no query string; `params` holds the query pairs that will be sent.
pub trait RequestSigner: Send + Sync {
    fn authorization(
        &self,
        method: &Method,
        url: &Url,
        params: &[(&str, &str)],
    ) -> Result<HeaderValue, HttpError>;
}

/// Authentication strategies supported by the client.
#[derive(Clone, Copy, Default)]
pub enum Auth<'a> {
    /// Header computed by the signer on every attempt.
    Signed(&'a dyn RequestSigner),
    #[default]
    None,
}

impl std::fmt::Debug for Auth<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::Signed(_) => f.write_str("Signed(<signer>)"),
            Auth::None => f.write_str("None"),
        }
    }
}

/// What to do when the service answers HTTP 429.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitPolicy {
    /// Surface [`HttpError::RateLimited`] immediately.
    Fail,
    /// Sleep until the window resets, then resend. Waiting does not consume the retry
    /// budget. With `max_wait` set, a longer requested wait fails instead.
    Wait {
        notify: bool,
        max_wait: Option<Duration>,
    },
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        RateLimitPolicy::Wait {
            notify: true,
            max_wait: None,
        }
    }
}

/// Per-request tuning knobs.
///
/// ```
/// use tweetie_http::RequestOpts;
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     query: Some(vec![("screen_name", Cow::Borrowed("alice"))]),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.retries.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Auth<'a>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
}

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
    pub rate_limit: RateLimitPolicy,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use tweetie_http::{HttpClient, HttpError, RateLimitPolicy};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// assert_eq!(client.max_retries, 0);
    /// assert_eq!(client.rate_limit, RateLimitPolicy::default());
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        // `join` drops the last segment unless the base ends with '/'.
        let base = if base.ends_with('/') {
            Cow::Borrowed(base)
        } else {
            Cow::Owned(format!("{base}/"))
        };
        let base = Url::parse(&base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("tweetie/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
            max_retries: 0,
            rate_limit: RateLimitPolicy::default(),
        })
    }

    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    pub fn with_rate_limit_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limit = policy;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// GET JSON with per-request options.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json(Method::GET, path, opts).await
    }

    async fn request_json<T>(
        &self,
        method: Method,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;

        let pairs: Vec<(&str, &str)> = opts
            .query
            .as_ref()
            .map(|q| q.iter().map(|(k, v)| (*k, v.as_ref())).collect())
            .unwrap_or_default();
        let redacted_q: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(k, v)| (*k, if is_secret_param(k) { "<redacted>" } else { *v }))
            .collect();

        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let max_retries = opts.retries.unwrap_or(self.max_retries);
        let mut attempt = 0usize;
        let mut rate_limit_waits = 0u32;

        loop {
            let mut rb = self
                .inner
                .request(method.clone(), url.clone())
                .timeout(timeout);
            if !pairs.is_empty() {
                rb = rb.query(&pairs);
            }
            if let Some(hdrs) = &opts.headers {
                rb = rb.headers(hdrs.clone());
            }
            let auth_kind = match opts.auth {
                Auth::Signed(signer) => {
                    rb = rb.header(
                        reqwest::header::AUTHORIZATION,
                        signer.authorization(&method, &url, &pairs)?,
                    );
                    "signed"
                }
                Auth::None => "none",
            };

            let req_id = format!(
                "r{:x}",
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_nanos()
            );

            tracing::debug!(
                req_id=%req_id,
                attempt=attempt + 1,
                max_retries,
                rate_limit_waits,
                method=%method,
                host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
                query=?redacted_q,
                timeout_ms=timeout.as_millis() as u64,
                auth_kind,
                "http.request.start"
            );

            let t0 = std::time::Instant::now();
            let sent = match rb.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    let headers = resp.headers().clone();
                    resp.bytes().await.map(|b| (status, headers, b))
                }
                Err(err) => Err(err),
            };
            let (status, headers, bytes) = match sent {
                Ok(parts) => parts,
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff(attempt);
                        tracing::warn!(
                            req_id=%req_id,
                            attempt,
                            max_retries,
                            backoff_ms=delay.as_millis() as u64,
                            message=%message,
                            "http.retrying.network"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    tracing::warn!(req_id=%req_id, attempt, message=%message, "http.network_error");
                    return Err(HttpError::Network(message));
                }
            };
            let dur_ms = t0.elapsed().as_millis() as u64;

            let request_id = headers
                .get("x-request-id")
                .or_else(|| headers.get("x-transaction-id"))
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string();
            let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

            tracing::debug!(
                req_id=%req_id,
                %status,
                duration_ms=dur_ms,
                body_len=bytes.len(),
                x_request_id=%request_id,
                rate_limit.limit=?header_str("x-rate-limit-limit"),
                rate_limit.remaining=?header_str("x-rate-limit-remaining"),
                rate_limit.reset=?header_str(RATE_LIMIT_RESET),
                "http.response.headers"
            );

            if raw_enabled() {
                let truncated = bytes.len() > RAW_MAX_BODY;
                let text = String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]);
                tracing::info!(
                    target: "http.raw",
                    %req_id,
                    %status,
                    duration_ms=dur_ms,
                    headers=?redact_headers(&headers),
                    body=%text,
                    truncated
                );
            }

            let snippet = snip_body(&bytes);

            if status.is_success() {
                return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                    tracing::warn!(
                        req_id=%req_id,
                        serde_line=%e.line(),
                        serde_col=%e.column(),
                        serde_err=%e,
                        body_snippet=%snippet,
                        "http.response.decode_error"
                    );
                    HttpError::Decode(e.to_string(), snippet)
                });
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let hinted = rate_limit_delay(&headers, SystemTime::now());
                match self.rate_limit {
                    RateLimitPolicy::Fail => {
                        tracing::warn!(req_id=%req_id, retry_after=?hinted, "http.rate_limited");
                        return Err(HttpError::RateLimited {
                            retry_after_secs: hinted.map(|d| d.as_secs()),
                        });
                    }
                    RateLimitPolicy::Wait { notify, max_wait } => {
                        let delay = hinted.unwrap_or(RATE_LIMIT_FLOOR);
                        if max_wait.is_some_and(|cap| delay > cap) {
                            tracing::warn!(
                                req_id=%req_id,
                                wait_secs=delay.as_secs(),
                                max_wait_secs=?max_wait.map(|d| d.as_secs()),
                                "http.rate_limited.wait_exceeds_budget"
                            );
                            return Err(HttpError::RateLimited {
                                retry_after_secs: Some(delay.as_secs()),
                            });
                        }
                        rate_limit_waits += 1;
                        if notify {
                            tracing::warn!(
                                req_id=%req_id,
                                wait_secs=delay.as_secs_f64(),
                                rate_limit_waits,
                                "rate limit reached, sleeping until the window resets"
                            );
                        } else {
                            tracing::debug!(
                                req_id=%req_id,
                                wait_ms=delay.as_millis() as u64,
                                "http.rate_limited.waiting"
                            );
                        }
                        sleep(delay).await;
                        continue;
                    }
                }
            }

            let (message, code) = extract_error(&bytes);

            if status.is_server_error() && attempt < max_retries {
                attempt += 1;
                let delay = backoff(attempt);
                tracing::warn!(
                    req_id=%req_id,
                    %status,
                    attempt,
                    max_retries,
                    backoff_ms=delay.as_millis() as u64,
                    message=%message,
                    "http.retrying"
                );
                sleep(delay).await;
                continue;
            }

            tracing::warn!(
                req_id=%req_id,
                %status,
                message=%message,
                ?code,
                x_request_id=%request_id,
                body_snippet=%snippet,
                "http.error"
            );
            return Err(HttpError::Api {
                status,
                message,
                code,
                request_id,
            });
        }
    }
}

fn backoff(attempt: usize) -> Duration {
    let shift = attempt.saturating_sub(1).min(16) as u32;
    Duration::from_millis(200u64.saturating_mul(1 << shift))
}

/// Wait requested by a 429 response: `Retry-After` seconds first, then the epoch
/// reset timestamp (plus one second of slack).
fn rate_limit_delay(h: &HeaderMap, now: SystemTime) -> Option<Duration> {
    let header_u64 = |name: &str| {
        h.get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
    };

    if let Some(secs) = header_u64(RETRY_AFTER.as_str()) {
        return Some(Duration::from_secs(secs));
    }
    let reset = header_u64(RATE_LIMIT_RESET)?;
    let now = now.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    Some(Duration::from_secs(reset.saturating_sub(now) + 1))
}

/// Pull a human message and optional numeric code out of an error body.
fn extract_error(body: &[u8]) -> (String, Option<i64>) {
    // {"errors":[{"code":50,"message":"User not found."}]}
    #[derive(Deserialize)]
    struct Errors {
        errors: Vec<ErrItem>,
    }
    #[derive(Deserialize)]
    struct ErrItem {
        #[serde(default)]
        code: Option<i64>,
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        title: String,
    }

    // {"error":"Not authorized."} or {"message":"..."} or {"detail":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(errs) = serde_json::from_slice::<Errors>(body) {
        if let Some(first) = errs.errors.into_iter().next() {
            let message = [first.message, first.detail, first.title]
                .into_iter()
                .find(|s| !s.is_empty())
                .unwrap_or_default();
            return (message, first.code);
        }
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        if let Some(message) = [m.message, m.detail, m.error]
            .into_iter()
            .find(|s| !s.is_empty())
        {
            return (message, None);
        }
    }
    (snip_body(body), None)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        let mut cut = 500;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}
