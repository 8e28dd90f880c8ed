//! Twitter REST v1.1 client used as the production [`SocialApi`].
//!
//! Every request is OAuth 1.0a signed by the shared HTTP client, which also owns the
//! rate-limit policy. Timelines page backwards with `max_id`; friend lists follow the
//! opaque `cursor` values the API hands back.
use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tweetie_http::{Auth, HttpClient, RequestOpts};

use crate::api::{Page, PageRequest, SocialApi};
use crate::auth::OAuthSigner;
use crate::error::SocialError;
use crate::twitter::types::{FriendsPage, Status, User};

const USERS_SHOW: &str = "1.1/users/show.json";
const USER_TIMELINE: &str = "1.1/statuses/user_timeline.json";
const FRIENDS_LIST: &str = "1.1/friends/list.json";

/// Largest `count` accepted by the timeline and friends endpoints.
pub const MAX_PAGE_SIZE: usize = 200;

/// Authenticated handle. Cheap to clone; immutable after construction.
#[derive(Clone)]
pub struct TwitterApi {
    http: HttpClient,
    signer: Arc<OAuthSigner>,
}

impl std::fmt::Debug for TwitterApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterApi")
            .field("base_url", &self.http.base_url().as_str())
            .field("rate_limit", &self.http.rate_limit)
            .finish_non_exhaustive()
    }
}

impl TwitterApi {
    pub fn new(http: HttpClient, signer: OAuthSigner) -> Self {
        Self {
            http,
            signer: Arc::new(signer),
        }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        screen_name: &str,
        query: Vec<(&str, Cow<'_, str>)>,
    ) -> Result<T, SocialError> {
        self.http
            .get_json(
                path,
                RequestOpts {
                    auth: Auth::Signed(self.signer.as_ref()),
                    query: Some(query),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| SocialError::from_lookup(e, screen_name))
    }
}

fn page_count(page: &PageRequest) -> String {
    page.count.clamp(1, MAX_PAGE_SIZE).to_string()
}

#[async_trait]
impl SocialApi for TwitterApi {
    type Post = Status;
    type Account = User;

    async fn get_user(&self, screen_name: &str) -> Result<User, SocialError> {
        self.get(
            USERS_SHOW,
            screen_name,
            vec![
                ("screen_name", screen_name.into()),
                ("include_entities", "false".into()),
            ],
        )
        .await
    }

    async fn user_timeline(
        &self,
        screen_name: &str,
        page: PageRequest,
    ) -> Result<Page<Status>, SocialError> {
        let mut query = vec![
            ("screen_name", Cow::Borrowed(screen_name)),
            ("count", page_count(&page).into()),
            ("tweet_mode", "extended".into()),
        ];
        if let Some(max_id) = page.cursor {
            query.push(("max_id", max_id.into()));
        }

        let items: Vec<Status> = self.get(USER_TIMELINE, screen_name, query).await?;
        // max_id is inclusive, so the next page starts just below the oldest id seen.
        let next_cursor = items
            .iter()
            .map(|s| s.id)
            .min()
            .and_then(|oldest| oldest.checked_sub(1))
            .map(|id| id.to_string());

        tracing::debug!(
            screen_name,
            fetched = items.len(),
            next_max_id = ?next_cursor,
            "timeline page"
        );
        Ok(Page { items, next_cursor })
    }

    async fn friends(
        &self,
        screen_name: &str,
        page: PageRequest,
    ) -> Result<Page<User>, SocialError> {
        let query = vec![
            ("screen_name", Cow::Borrowed(screen_name)),
            ("count", page_count(&page).into()),
            ("cursor", page.cursor.unwrap_or_else(|| "-1".into()).into()),
            ("skip_status", "true".into()),
            ("include_user_entities", "false".into()),
        ];

        let FriendsPage {
            users,
            next_cursor_str,
        } = self.get(FRIENDS_LIST, screen_name, query).await?;
        let next_cursor = match next_cursor_str.as_str() {
            "" | "0" => None,
            _ => Some(next_cursor_str),
        };

        tracing::debug!(
            screen_name,
            fetched = users.len(),
            next_cursor = ?next_cursor,
            "friends page"
        );
        Ok(Page {
            items: users,
            next_cursor,
        })
    }
}
