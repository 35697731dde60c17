//! Page loading with redirect aliases and an HTML cache.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::FetchResult;
use crate::traits::{
    fetcher::PageFetcher,
    store::{namespace, ResponseCache},
};
use crate::types::PageContent;

/// Loads pages through the fetcher, remembering redirects and HTML.
///
/// A URL is looked up in three steps: the alias table maps a previously
/// requested URL onto the canonical URL it redirected to, the page cache
/// serves HTML by canonical URL, and only then is the network touched.
#[derive(Clone)]
pub struct PageLoader {
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<dyn ResponseCache>,
}

impl PageLoader {
    pub fn new(fetcher: Arc<dyn PageFetcher>, cache: Arc<dyn ResponseCache>) -> Self {
        Self { fetcher, cache }
    }

    /// Load a page and extract its visible text.
    pub async fn load(&self, url: &str) -> FetchResult<PageContent> {
        let url = normalize_url(url);
        let canonical = self
            .cache
            .get(namespace::ALIASES, &url)
            .await?
            .unwrap_or_else(|| url.clone());

        if let Some(html) = self.cache.get(namespace::PAGES, &canonical).await? {
            debug!(url = %url, canonical = %canonical, "Page from cache");
            return Ok(PageContent::from_html(canonical, html));
        }

        info!(url = %url, fetcher = self.fetcher.name(), "Fetching page");
        let page = match self.fetcher.fetch(&url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %url, error = %e, "Fetch failed");
                return Err(e);
            }
        };

        let final_url = normalize_url(&page.final_url);
        if final_url != url {
            debug!(url = %url, final_url = %final_url, "Recording redirect");
            self.cache.put(namespace::ALIASES, &url, &final_url).await?;
        }
        self.cache.put(namespace::PAGES, &final_url, &page.html).await?;

        let content = PageContent::from_html(final_url, page.html);
        debug!(url = %content.canonical_url, preview = %content.preview(30), "Extracted text");
        Ok(content)
    }
}

/// Remove every space from a URL.
pub fn normalize_url(url: &str) -> String {
    url.replace(' ', "")
}
