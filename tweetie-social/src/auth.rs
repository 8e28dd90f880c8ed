//! OAuth 1.0a request signing and construction of the authenticated client.
//!
//! Nothing here touches the network: bad credentials surface on the first request
//! as [`SocialError::Unauthorized`].

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::RngCore;
use sha1::Sha1;
use tweetie_config::{ApiSettings, TweetieConfig};
use tweetie_http::{HeaderValue, HttpClient, HttpError, Method, RateLimitPolicy, RequestSigner, Url};

use crate::credentials::{Credentials, load_keys};
use crate::error::SocialError;
use crate::twitter::TwitterApi;

/// RFC 3986 unreserved characters stay as-is, everything else is escaped.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// HMAC-SHA1 signer holding the consumer pair and, once installed, the access token pair.
#[derive(Clone)]
pub struct OAuthSigner {
    consumer_key: String,
    consumer_secret: String,
    access_token: Option<(String, String)>,
}

impl std::fmt::Debug for OAuthSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthSigner")
            .field("consumer_key", &self.consumer_key)
            .field("has_access_token", &self.access_token.is_some())
            .finish()
    }
}

impl OAuthSigner {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            access_token: None,
        }
    }

    pub fn set_access_token(&mut self, token: impl Into<String>, secret: impl Into<String>) {
        self.access_token = Some((token.into(), secret.into()));
    }

    /// Build the `Authorization` value for fixed timestamp and nonce.
    pub fn header_value(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        timestamp: u64,
        nonce: &str,
    ) -> Result<String, HttpError> {
        let timestamp = timestamp.to_string();
        let mut oauth_params: Vec<(&str, &str)> = vec![
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_version", "1.0"),
        ];
        if let Some((token, _)) = &self.access_token {
            oauth_params.push(("oauth_token", token.as_str()));
        }

        let mut all: Vec<(String, String)> = oauth_params
            .iter()
            .chain(params.iter())
            .map(|(k, v)| (encode(k), encode(v)))
            .collect();
        all.sort();

        let param_string = all
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let base_string = format!(
            "{}&{}&{}",
            method.to_ascii_uppercase(),
            encode(url),
            encode(&param_string)
        );
        let token_secret = self
            .access_token
            .as_ref()
            .map(|(_, secret)| secret.as_str())
            .unwrap_or("");
        let signing_key = format!("{}&{}", encode(&self.consumer_secret), encode(token_secret));

        let mut mac = Hmac::<Sha1>::new_from_slice(signing_key.as_bytes())
            .map_err(|e| HttpError::Signing(e.to_string()))?;
        mac.update(base_string.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        let header = oauth_params
            .iter()
            .copied()
            .chain(std::iter::once(("oauth_signature", signature.as_str())))
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {header}"))
    }
}

impl RequestSigner for OAuthSigner {
    fn authorization(
        &self,
        method: &Method,
        url: &Url,
        params: &[(&str, &str)],
    ) -> Result<HeaderValue, HttpError> {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| HttpError::Signing(format!("clock before epoch: {e}")))?
            .as_secs();
        let value = self.header_value(method.as_str(), url.as_str(), params, timestamp, &nonce())?;
        HeaderValue::from_str(&value).map_err(|e| HttpError::Signing(e.to_string()))
    }
}

fn encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

fn nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn rate_limit_policy(settings: &ApiSettings) -> RateLimitPolicy {
    if settings.wait_on_rate_limit {
        RateLimitPolicy::Wait {
            notify: settings.wait_on_rate_limit_notify,
            max_wait: settings.max_rate_limit_wait(),
        }
    } else {
        RateLimitPolicy::Fail
    }
}

/// Build a client from already-loaded credentials.
pub fn authenticate_with(
    credentials: Credentials,
    settings: &ApiSettings,
) -> Result<TwitterApi, SocialError> {
    let Credentials {
        consumer_key,
        consumer_secret,
        access_token,
        access_token_secret,
    } = credentials;

    let mut signer = OAuthSigner::new(consumer_key, consumer_secret);
    signer.set_access_token(access_token, access_token_secret);

    let http = HttpClient::new(&settings.base_url)?
        .with_timeout(settings.timeout())
        .with_retries(settings.max_retries)
        .with_rate_limit_policy(rate_limit_policy(settings));

    tracing::debug!(
        base_url = %settings.base_url,
        policy = ?http.rate_limit,
        "twitter client ready"
    );
    Ok(TwitterApi::new(http, signer))
}

/// Load credentials from `path` and build a client with default settings
/// (wait on rate limit, notify, no wait bound).
pub fn authenticate(path: impl AsRef<Path>) -> Result<TwitterApi, SocialError> {
    authenticate_with(load_keys(path)?, &ApiSettings::default())
}

/// Same as [`authenticate`] but reads the path and client settings from configuration.
pub fn authenticate_from_config(config: &TweetieConfig) -> Result<TwitterApi, SocialError> {
    authenticate_with(load_keys(&config.credentials_file)?, &config.api)
}
