//! Page fetcher trait.

use async_trait::async_trait;

use crate::error::FetchResult;
use crate::types::FetchedPage;

/// Fetches a single page and reports where redirects ended up.
///
/// A failed fetch is an ordinary outcome for the engine: the page is then
/// treated as "not a product page", so implementations should return an
/// error rather than retry for long.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`, following redirects.
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage>;

    /// Name of this fetcher for logging.
    fn name(&self) -> &str {
        "fetcher"
    }
}
