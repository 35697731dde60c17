//! Search provider trait.

use async_trait::async_trait;

use crate::error::SearchResult;
use crate::types::SearchCandidate;

/// Ranked web search.
///
/// An empty `Ok` vector means the query genuinely had no hits; rate limiting
/// and provider failures are reported as `Err` so callers can tell the two
/// apart.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a query and return candidates in provider rank order.
    async fn search(&self, query: &str) -> SearchResult<Vec<SearchCandidate>>;

    /// Name of this provider for logging.
    fn name(&self) -> &str {
        "search"
    }
}
