//! Flat, serialisable records handed back to callers.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{HashtagEntity, RawPost, RawProfile};
use crate::sentiment::PolarityAnalyzer;

/// One post with its sentiment score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: u64,
    pub created: DateTime<Utc>,
    /// Retweet count at fetch time.
    pub retweeted: u64,
    pub text: String,
    pub hashtags: Vec<HashtagEntity>,
    /// The `url` field of each URL entity (the shortened link as it appears in the text).
    pub urls: Vec<String>,
    /// Screen names of mentioned accounts.
    pub mentions: Vec<String>,
    /// VADER compound polarity in `[-1.0, 1.0]`.
    pub score: f64,
}

impl PostRecord {
    pub fn from_raw<P, A>(post: &P, analyzer: &A) -> Self
    where
        P: RawPost + ?Sized,
        A: PolarityAnalyzer + ?Sized,
    {
        let entities = post.entities();
        Self {
            id: post.id(),
            created: post.created_at(),
            retweeted: post.retweet_count(),
            text: post.text().to_owned(),
            hashtags: entities.hashtags.clone(),
            urls: entities.urls.iter().map(|u| u.url.clone()).collect(),
            mentions: entities
                .user_mentions
                .iter()
                .map(|m| m.screen_name.clone())
                .collect(),
            score: analyzer.compound(post.text()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub name: String,
    pub screen_name: String,
    pub followers: u64,
    /// Account creation date (UTC).
    pub created: NaiveDate,
    pub image: String,
}

impl ProfileRecord {
    pub fn from_raw<P: RawProfile + ?Sized>(profile: &P) -> Self {
        Self {
            name: profile.name().to_owned(),
            screen_name: profile.screen_name().to_owned(),
            followers: profile.followers_count(),
            created: profile.created_at().date_naive(),
            image: profile.profile_image_url().to_owned(),
        }
    }
}

/// Output of [`fetch_tweets`](crate::fetch_tweets).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineResult {
    /// The screen name exactly as requested.
    pub user: String,
    /// Lifetime post count from the profile, not `tweets.len()`.
    pub count: u64,
    pub tweets: Vec<PostRecord>,
}
