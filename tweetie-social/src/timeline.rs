//! Recent posts of one account, each with a sentiment score.
use futures::TryStreamExt;

use crate::api::{RawProfile, SocialApi};
use crate::cursor::{FETCH_LIMIT, paginate};
use crate::error::SocialError;
use crate::records::{PostRecord, TimelineResult};
use crate::sentiment::{PolarityAnalyzer, VaderAnalyzer};

/// Fetch up to [`FETCH_LIMIT`] of `name`'s most recent posts, scored with VADER.
///
/// `count` in the result is the account's lifetime post count, while `tweets` holds at
/// most [`FETCH_LIMIT`] records in the order the API returned them. Any error aborts
/// the whole call.
pub async fn fetch_tweets<S>(api: &S, name: &str) -> Result<TimelineResult, SocialError>
where
    S: SocialApi + ?Sized,
{
    fetch_tweets_with(api, name, VaderAnalyzer::new).await
}

/// [`fetch_tweets`] with a caller-supplied analyzer.
///
/// `make_analyzer` runs once, only after the profile lookup succeeded, and its analyzer
/// scores every post of the call.
pub async fn fetch_tweets_with<S, A, F>(
    api: &S,
    name: &str,
    make_analyzer: F,
) -> Result<TimelineResult, SocialError>
where
    S: SocialApi + ?Sized,
    A: PolarityAnalyzer,
    F: FnOnce() -> A,
{
    let profile = api.get_user(name).await?;
    let count = profile.statuses_count();
    let analyzer = make_analyzer();

    let mut posts = paginate(FETCH_LIMIT, |page| api.user_timeline(name, page));
    let mut tweets = Vec::new();
    while let Some(post) = posts.try_next().await? {
        tweets.push(PostRecord::from_raw(&post, &analyzer));
    }

    tracing::info!(
        user = name,
        lifetime_posts = count,
        fetched = tweets.len(),
        "timeline fetched"
    );
    Ok(TimelineResult {
        user: name.to_owned(),
        count,
        tweets,
    })
}
