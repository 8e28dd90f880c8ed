//! Timeline and follow-graph retrieval with per-post sentiment scores.
//!
//! The flow is `credentials` → `auth` → one of the fetchers:
//!
//! - [`load_keys`] reads `key, secret, token, token_secret` from the first line of a file
//! - [`authenticate`] turns those into a [`TwitterApi`] that signs every request with
//!   OAuth 1.0a and sleeps through rate-limit windows
//! - [`fetch_tweets`] returns up to [`FETCH_LIMIT`] recent posts, each scored by a single
//!   VADER analyzer built once per call
//! - [`fetch_following`] returns up to [`FETCH_LIMIT`] followed accounts
//!
//! The fetchers only talk to the [`SocialApi`] trait, so tests and alternative clients
//! can plug in without touching the record mapping.
pub mod api;
pub mod auth;
pub mod credentials;
pub mod cursor;
pub mod error;
pub mod following;
pub mod records;
pub mod sentiment;
pub mod timeline;
pub mod twitter;

pub use api::{
    Entities, HashtagEntity, MentionEntity, Page, PageRequest, RawPost, RawProfile, SocialApi,
    UrlEntity,
};
pub use auth::{OAuthSigner, authenticate, authenticate_from_config, authenticate_with};
pub use credentials::{Credentials, load_keys};
pub use cursor::FETCH_LIMIT;
pub use error::{CredentialsError, SocialError};
pub use following::fetch_following;
pub use records::{PostRecord, ProfileRecord, TimelineResult};
pub use sentiment::{PolarityAnalyzer, VaderAnalyzer};
pub use timeline::{fetch_tweets, fetch_tweets_with};
pub use twitter::TwitterApi;
