// Cursor pagination over remote collections.
//
// Followers, author feeds and repo records all page the same way: hand
// back the last cursor, get items plus the next cursor, stop when the
// cursor runs out. A failed page aborts the whole walk and drops what was
// collected, so callers never act on a partial listing.

use std::future::Future;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::bluesky::error::RemoteError;
use crate::bluesky::models::Page;

/// Page size requested from every listing endpoint (the API maximum).
pub const PAGE_SIZE: u8 = 100;

/// Why a pagination walk ended without a result.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A page request failed. Items from earlier pages were discarded.
    #[error("listing failed on page {page} ({discarded} items discarded): {source}")]
    Failed {
        page: usize,
        discarded: usize,
        #[source]
        source: RemoteError,
    },

    #[error("listing cancelled after {pages} pages")]
    Cancelled { pages: usize },
}

/// Walk a cursor-based collection until it is exhausted or `max_pages`
/// pages have been read. `max_pages == 0` means no cap.
pub async fn paginate<T, F, Fut>(
    max_pages: usize,
    token: &CancellationToken,
    mut fetch_page: F,
) -> Result<Vec<T>, FetchError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, RemoteError>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        if max_pages > 0 && pages >= max_pages {
            break;
        }
        if token.is_cancelled() {
            return Err(FetchError::Cancelled { pages });
        }

        let page = fetch_page(cursor.clone())
            .await
            .map_err(|source| FetchError::Failed {
                page: pages + 1,
                discarded: items.len(),
                source,
            })?;
        pages += 1;

        let page_len = page.items.len();
        items.extend(page.items);
        debug!(page = pages, page_len, total = items.len(), "Fetched page");

        let Some(next) = page.cursor.filter(|c| !c.is_empty()) else {
            break;
        };
        if cursor.as_deref() == Some(next.as_str()) {
            warn!(cursor = next.as_str(), "Cursor did not advance, stopping");
            break;
        }
        cursor = Some(next);
    }

    Ok(items)
}
