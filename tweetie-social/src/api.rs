//! The capability set the fetchers need from a social-media client.
//!
//! Records are built from [`RawPost`] and [`RawProfile`] only, so a different client
//! (or a test double) can be swapped in without touching the mapping.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SocialError;

/// Hashtags, links and mentions attached to a post.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Entities {
    #[serde(default)]
    pub hashtags: Vec<HashtagEntity>,
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
    #[serde(default)]
    pub user_mentions: Vec<MentionEntity>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HashtagEntity {
    pub text: String,
    #[serde(default)]
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UrlEntity {
    /// The t.co link as it appears in the text.
    pub url: String,
    #[serde(default)]
    pub expanded_url: Option<String>,
    #[serde(default)]
    pub display_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MentionEntity {
    pub screen_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
}

/// A post as delivered by the remote service.
pub trait RawPost {
    fn id(&self) -> u64;
    fn created_at(&self) -> DateTime<Utc>;
    fn retweet_count(&self) -> u64;
    fn text(&self) -> &str;
    fn entities(&self) -> &Entities;
}

/// An account as delivered by the remote service.
pub trait RawProfile {
    fn name(&self) -> &str;
    fn screen_name(&self) -> &str;
    fn followers_count(&self) -> u64;
    /// Lifetime number of posts.
    fn statuses_count(&self) -> u64;
    fn created_at(&self) -> DateTime<Utc>;
    fn profile_image_url(&self) -> &str;
}

/// Position in a paginated listing. `cursor: None` asks for the first page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor: Option<String>,
    /// Items wanted on this page; clients may clamp it to their own maximum.
    pub count: usize,
}

/// One page of results plus the cursor for the next one (`None` when exhausted).
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait SocialApi: Send + Sync {
    type Post: RawPost + Send;
    type Account: RawProfile + Send;

    async fn get_user(&self, screen_name: &str) -> Result<Self::Account, SocialError>;

    /// Most recent posts first.
    async fn user_timeline(
        &self,
        screen_name: &str,
        page: PageRequest,
    ) -> Result<Page<Self::Post>, SocialError>;

    /// Accounts `screen_name` follows.
    async fn friends(
        &self,
        screen_name: &str,
        page: PageRequest,
    ) -> Result<Page<Self::Account>, SocialError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_default_missing_lists_and_fields() {
        let entities: Entities = serde_json::from_value(serde_json::json!({
            "urls": [{"url": "https://t.co/a"}],
            "user_mentions": [{"screen_name": "bob"}]
        }))
        .unwrap();

        assert!(entities.hashtags.is_empty());
        assert_eq!(entities.urls[0].expanded_url, None);
        assert_eq!(entities.user_mentions[0].id, None);
    }
}
