//! Product synchronization into the local cache.

use thiserror::Error;

use tillpoint_cache::{CacheError, ProductCache};

use crate::client::ApiClient;
use crate::error::ApiError;

/// Error type for a synchronization run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Fetching the listing failed.
    #[error("product sync request failed: {0}")]
    Api(#[from] ApiError),

    /// Writing the cache failed.
    #[error("product cache update failed: {0}")]
    Cache(#[from] CacheError),
}

/// Fetch the product listing and upsert it into the local cache.
///
/// Returns the number of products written. The backend paginates its
/// listing; a single page is fetched and a shortfall against the advertised
/// total is logged rather than chased.
pub async fn sync_all_products(
    client: &ApiClient,
    cache: &ProductCache,
) -> Result<usize, SyncError> {
    let page = client.list_products().await?;
    if (page.items.len() as u64) < page.total {
        tracing::warn!(
            fetched = page.items.len(),
            total = page.total,
            "product listing returned fewer items than advertised"
        );
    }

    let count = cache.upsert_all(&page.items)?;
    tracing::info!(count, "products synchronized to local cache");
    Ok(count)
}
