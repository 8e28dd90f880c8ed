use std::path::PathBuf;

use thiserror::Error;
use tweetie_http::HttpError;

/// The credentials file could not be turned into four fields.
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("failed to read credentials file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "{origin}: expected 4 \", \"-separated fields (consumer key, consumer secret, access token, access token secret), found {fields}"
    )]
    Malformed { origin: String, fields: usize },
}

/// Everything a fetch can fail with.
#[derive(Debug, Error)]
pub enum SocialError {
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    /// Credentials rejected, or the account's posts are not visible to them.
    #[error("not authorized: {message}")]
    Unauthorized { message: String },

    #[error("user {screen_name} not found: {message}")]
    NotFound { screen_name: String, message: String },

    /// Suspended or otherwise unavailable account.
    #[error("access to {screen_name} forbidden: {message}")]
    Forbidden { screen_name: String, message: String },

    #[error(transparent)]
    Http(#[from] HttpError),
}

impl SocialError {
    /// Map a transport error onto the lookup taxonomy for `screen_name`.
    pub(crate) fn from_lookup(err: HttpError, screen_name: &str) -> Self {
        use tweetie_http::StatusCode;

        match err {
            HttpError::Api {
                status, message, ..
            } if status == StatusCode::UNAUTHORIZED => SocialError::Unauthorized { message },
            HttpError::Api {
                status, message, ..
            } if status == StatusCode::NOT_FOUND => SocialError::NotFound {
                screen_name: screen_name.to_string(),
                message,
            },
            HttpError::Api {
                status, message, ..
            } if status == StatusCode::FORBIDDEN => SocialError::Forbidden {
                screen_name: screen_name.to_string(),
                message,
            },
            other => SocialError::Http(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tweetie_http::StatusCode;

    fn api(status: StatusCode) -> HttpError {
        HttpError::Api {
            status,
            message: "nope".into(),
            code: None,
            request_id: "-".into(),
        }
    }

    #[test]
    fn lookup_statuses_are_classified() {
        assert!(matches!(
            SocialError::from_lookup(api(StatusCode::UNAUTHORIZED), "alice"),
            SocialError::Unauthorized { .. }
        ));
        assert!(matches!(
            SocialError::from_lookup(api(StatusCode::NOT_FOUND), "alice"),
            SocialError::NotFound { ref screen_name, .. } if screen_name == "alice"
        ));
        assert!(matches!(
            SocialError::from_lookup(api(StatusCode::FORBIDDEN), "alice"),
            SocialError::Forbidden { .. }
        ));
        assert!(matches!(
            SocialError::from_lookup(api(StatusCode::BAD_GATEWAY), "alice"),
            SocialError::Http(HttpError::Api { .. })
        ));
        assert!(matches!(
            SocialError::from_lookup(HttpError::Network("reset".into()), "alice"),
            SocialError::Http(HttpError::Network(_))
        ));
    }
}
