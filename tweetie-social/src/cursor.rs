//! Flatten a paginated listing into one lazy, capped stream of items.
use std::future::Future;

use futures::stream::BoxStream;

use crate::api::{Page, PageRequest};
use crate::error::SocialError;

/// Maximum number of posts or accounts a single fetch returns.
pub const FETCH_LIMIT: usize = 100;

/// Yield at most `limit` items, requesting pages until the limit is reached, a page
/// comes back empty, or there is no next cursor.
///
/// The first error ends the stream. Each page asks for the number of items still
/// missing, so a limit of 100 is normally served by one request.
pub fn paginate<'a, T, F, Fut>(limit: usize, mut fetch_page: F) -> BoxStream<'a, Result<T, SocialError>>
where
    T: Send + 'a,
    F: FnMut(PageRequest) -> Fut + Send + 'a,
    Fut: Future<Output = Result<Page<T>, SocialError>> + Send + 'a,
{
    Box::pin(async_stream::stream! {
        let mut cursor: Option<String> = None;
        let mut yielded = 0usize;
        let mut pages = 0usize;

        while yielded < limit {
            let request = PageRequest {
                cursor: cursor.take(),
                count: limit - yielded,
            };
            let page = match fetch_page(request).await {
                Ok(page) => page,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            pages += 1;

            let Page { items, next_cursor } = page;
            if items.is_empty() {
                break;
            }
            let wanted = limit - yielded;
            for item in items.into_iter().take(wanted) {
                yielded += 1;
                yield Ok(item);
            }

            match next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::trace!(pages, yielded, limit, "pagination finished");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use std::sync::Mutex;

    /// Serves `0..total` in pages of at most `page_size`, using the offset as cursor.
    fn numbers(
        total: usize,
        page_size: usize,
        requests: &Mutex<Vec<PageRequest>>,
    ) -> impl FnMut(PageRequest) -> futures::future::Ready<Result<Page<usize>, SocialError>> + Send + '_
    {
        move |req: PageRequest| {
            requests.lock().unwrap().push(req.clone());
            let start = req.cursor.as_deref().map_or(0, |c| c.parse().unwrap());
            let end = (start + req.count.min(page_size)).min(total);
            futures::future::ready(Ok(Page {
                items: (start..end).collect(),
                next_cursor: (end < total).then(|| end.to_string()),
            }))
        }
    }

    #[tokio::test]
    async fn stops_at_the_limit_across_pages() {
        let requests = Mutex::new(Vec::new());
        let got: Vec<usize> = paginate(100, numbers(1_000, 30, &requests))
            .try_collect()
            .await
            .unwrap();

        assert_eq!(got, (0..100).collect::<Vec<_>>());
        let counts: Vec<usize> = requests.lock().unwrap().iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![100, 70, 40, 10]);
    }

    #[tokio::test]
    async fn short_listing_ends_when_cursor_runs_out() {
        let requests = Mutex::new(Vec::new());
        let got: Vec<usize> = paginate(100, numbers(42, 20, &requests))
            .try_collect()
            .await
            .unwrap();

        assert_eq!(got.len(), 42);
        assert_eq!(requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn empty_first_page_yields_nothing() {
        let requests = Mutex::new(Vec::new());
        let got: Vec<usize> = paginate(100, numbers(0, 20, &requests))
            .try_collect()
            .await
            .unwrap();
        assert!(got.is_empty());
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn oversized_page_is_truncated() {
        let stream = paginate(3, |_req| async {
            Ok(Page {
                items: vec!["a", "b", "c", "d", "e"],
                next_cursor: Some("more".to_string()),
            })
        });
        let got: Vec<&str> = stream.try_collect().await.unwrap();
        assert_eq!(got, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn error_mid_stream_aborts() {
        let mut calls = 0;
        let stream = paginate(100, move |_req| {
            calls += 1;
            let result = if calls == 1 {
                Ok(Page {
                    items: vec![1, 2],
                    next_cursor: Some("next".to_string()),
                })
            } else {
                Err(SocialError::Unauthorized {
                    message: "expired".into(),
                })
            };
            futures::future::ready(result)
        });
        let err = stream.try_collect::<Vec<i32>>().await.unwrap_err();
        assert!(matches!(err, SocialError::Unauthorized { .. }));
    }
}
