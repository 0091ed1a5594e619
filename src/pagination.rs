//! Offset pagination over the CoreLedger list envelope.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Page size used by [`ResourceApi::list_all`](crate::apis::ResourceApi::list_all).
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// List envelope wrapping every collection returned by the API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ListResponse<T> {
    /// Number of items matching the query across all pages.
    #[serde(default)]
    pub total_count: u64,
    /// Number of items in this page.
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Window of a list request.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// Materializes a full collection by fetching successive pages.
///
/// `fetch` is called with `offset` advanced by the `count` of the previous page until
/// `total_count` items have been collected or the server returns an empty page.
pub async fn collect_all<T, F, Fut>(page_size: u64, mut fetch: F) -> Result<Vec<T>, Error>
where
    F: FnMut(Page) -> Fut,
    Fut: Future<Output = Result<ListResponse<T>, Error>>,
{
    let mut items = Vec::new();
    let mut offset = 0;

    loop {
        let page = fetch(Page::new(page_size, offset)).await?;
        if page.data.is_empty() {
            break;
        }

        // Servers omitting `count` still make progress
        let count = if page.count > 0 {
            page.count
        } else {
            page.data.len() as u64
        };
        let total_count = page.total_count;

        items.extend(page.data);
        offset += count;

        tracing::debug!(offset, total_count, "Fetched page");

        if items.len() as u64 >= total_count {
            break;
        }
    }

    Ok(items)
}
