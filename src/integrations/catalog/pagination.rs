// src/integrations/catalog/pagination.rs
//
// Generic bulk retrieval over a limit/offset-paged query.

use std::future::Future;

use crate::error::AppResult;

use super::client::Page;

/// Page size requested from the remote on bulk listings.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Fetch every result of a paged query.
///
/// Invokes `fetch_page(offset, limit)` with increasing offsets until a
/// short page (`result_count < result_limit`) signals the end of data.
/// Any single-page failure is propagated immediately and the accumulated
/// partial results are discarded; there is no partial success reporting.
///
/// Panics if `page_size` is zero, which would loop forever.
pub async fn fetch_all<T, F, Fut>(page_size: u64, mut fetch_page: F) -> AppResult<Vec<T>>
where
    F: FnMut(u64, u64) -> Fut,
    Fut: Future<Output = AppResult<Page<T>>>,
{
    assert!(page_size > 0, "page_size must be positive");

    let mut results = Vec::new();
    let mut offset = 0u64;

    loop {
        let page = fetch_page(offset, page_size).await?;
        let is_last = page.result_count < page.result_limit;

        results.extend(page.data);

        if is_last {
            return Ok(results);
        }
        offset += page_size;
    }
}
