use std::future::Future;

use crate::datasource::TimeWindow;
use crate::error::FetchError;

/// Records that carry an epoch-millisecond timestamp usable as a page cursor
pub trait Timestamped {
    fn timestamp_ms(&self) -> i64;
}

/// Fetches all records in `window` by advancing a time cursor page by page.
///
/// `fetch_page` receives the cursor and returns the records in
/// `[cursor, window.end_ms]`. A page shorter than `page_size` is the last
/// one; a full page moves the cursor to one millisecond past its last
/// record. Any page error aborts the whole fetch and discards what was
/// accumulated.
pub async fn fetch_until_exhausted<T, F, Fut>(
    window: TimeWindow,
    page_size: usize,
    mut fetch_page: F,
) -> Result<Vec<T>, FetchError>
where
    T: Timestamped,
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = Result<Vec<T>, FetchError>>,
{
    let mut all_items = Vec::new();
    let mut cursor = window.start_ms;

    while cursor <= window.end_ms {
        let items = fetch_page(cursor).await?;

        let Some(last_timestamp) = items.last().map(Timestamped::timestamp_ms) else {
            break;
        };
        let items_count = items.len();

        all_items.extend(items);

        if items_count < page_size {
            break;
        }

        let Some(next_cursor) = last_timestamp.checked_add(1).filter(|next| *next > cursor) else {
            tracing::warn!(cursor, last_timestamp, "Full page did not advance the cursor, stopping");
            break;
        };
        cursor = next_cursor;
    }

    Ok(all_items)
}
