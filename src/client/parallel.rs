//! Parallel fetching for the offset-paginated history endpoint.
//!
//! The first history response carries `total`, which determines every
//! remaining offset up front; this module fans those requests out with
//! bounded concurrency.

use std::future::Future;
use std::pin::Pin;

use futures::stream::{FuturesUnordered, StreamExt};
use log::debug;

use crate::error::Result;

/// Type alias for boxed futures used in parallel fetching
type PageFuture<T> = Pin<Box<dyn Future<Output = (usize, Result<Vec<T>>)> + Send>>;

/// Fetch all remaining history pages in parallel after the first one.
///
/// `remaining_offsets` comes from [`crate::client::pagination::remaining_offsets`];
/// `fetch_page` fetches the page starting at a given offset. At most
/// `max_concurrent` requests run at a time.
///
/// Returns the items from all remaining pages in arrival order; callers that
/// need a stable order should sort afterwards.
///
/// # Example
///
/// ```ignore
/// let first = client.scan_history(Some(&params)).await?;
/// let mut all = first.scans;
///
/// let remaining = fetch_remaining_pages(
///     remaining_offsets(first.total, page_size, 0),
///     |offset| {
///         let c = client.clone();
///         async move {
///             let params = HistoryParams::new().limit(page_size).offset(offset);
///             c.scan_history(Some(&params)).await.map(|p| p.scans)
///         }
///     },
///     8,
/// ).await?;
/// all.extend(remaining);
/// ```
pub async fn fetch_remaining_pages<T, F, Fut>(
    remaining_offsets: Vec<usize>,
    fetch_page: F,
    max_concurrent: usize,
) -> Result<Vec<T>>
where
    T: Send + 'static,
    F: Fn(usize) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    if remaining_offsets.is_empty() {
        return Ok(Vec::new());
    }

    debug!(
        "Fetching {} remaining pages with max {} concurrent",
        remaining_offsets.len(),
        max_concurrent
    );

    let mut all_items = Vec::new();
    let mut futures: FuturesUnordered<PageFuture<T>> = FuturesUnordered::new();
    let mut pending_offsets = remaining_offsets.into_iter();

    // Helper to create a boxed future
    let make_future = |offset: usize, f: &F| -> PageFuture<T> {
        let fut = f(offset);
        Box::pin(async move {
            let result = fut.await;
            (offset, result)
        })
    };

    // Seed initial batch up to max_concurrent
    for offset in pending_offsets.by_ref().take(max_concurrent) {
        debug!("Spawning initial request for offset {}", offset);
        futures.push(make_future(offset, &fetch_page));
    }

    // Process results and spawn new requests to maintain concurrency
    while let Some((offset, result)) = futures.next().await {
        let items = result?;
        debug!("Offset {} returned {} items", offset, items.len());
        all_items.extend(items);

        if let Some(next_offset) = pending_offsets.next() {
            debug!("Spawning request for offset {}", next_offset);
            futures.push(make_future(next_offset, &fetch_page));
        }
    }

    debug!("Fetched {} total items from remaining pages", all_items.len());
    Ok(all_items)
}
