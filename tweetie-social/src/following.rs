//! Accounts a user follows.
use futures::TryStreamExt;

use crate::api::SocialApi;
use crate::cursor::{FETCH_LIMIT, paginate};
use crate::error::SocialError;
use crate::records::ProfileRecord;

/// Up to [`FETCH_LIMIT`] accounts `name` follows, in API order.
///
/// A failure on any page discards the accounts gathered so far.
pub async fn fetch_following<S>(api: &S, name: &str) -> Result<Vec<ProfileRecord>, SocialError>
where
    S: SocialApi + ?Sized,
{
    let following: Vec<ProfileRecord> = paginate(FETCH_LIMIT, |page| api.friends(name, page))
        .map_ok(|account| ProfileRecord::from_raw(&account))
        .try_collect()
        .await?;

    tracing::info!(user = name, fetched = following.len(), "following fetched");
    Ok(following)
}
