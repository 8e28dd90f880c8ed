//! Wire types for the Twitter REST v1.1 endpoints we call.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{Entities, RawPost, RawProfile};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub id: u64,
    #[serde(with = "twitter_date")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub retweet_count: u64,
    /// `full_text` when requested with `tweet_mode=extended`.
    #[serde(default, alias = "full_text")]
    pub text: String,
    #[serde(default)]
    pub entities: Entities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub screen_name: String,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub statuses_count: u64,
    #[serde(with = "twitter_date")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub profile_image_url: String,
}

/// Body of `friends/list.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct FriendsPage {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub next_cursor_str: String,
}

impl RawPost for Status {
    fn id(&self) -> u64 {
        self.id
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn retweet_count(&self) -> u64 {
        self.retweet_count
    }
    fn text(&self) -> &str {
        &self.text
    }
    fn entities(&self) -> &Entities {
        &self.entities
    }
}

impl RawProfile for User {
    fn name(&self) -> &str {
        &self.name
    }
    fn screen_name(&self) -> &str {
        &self.screen_name
    }
    fn followers_count(&self) -> u64 {
        self.followers_count
    }
    fn statuses_count(&self) -> u64 {
        self.statuses_count
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn profile_image_url(&self) -> &str {
        &self.profile_image_url
    }
}

/// `Wed Oct 10 20:19:24 +0000 2018`
pub(crate) mod twitter_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    const FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_str(&raw, FORMAT)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| D::Error::custom(format!("bad timestamp {raw:?}: {e}")))
    }
}
