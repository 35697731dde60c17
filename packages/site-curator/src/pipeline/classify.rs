//! Page classification.
//!
//! Runs the cheap local checks first and only then spends oracle calls:
//!
//! ```text
//! url ─▶ skip? ─▶ load ─▶ url filter ─▶ unavailable? ─▶ check_url ─▶ check_product_page
//!         │        │          │              │              │ catalog         │
//!         ▼        ▼          ▼              ▼              ▼                 ▼
//!     NotProduct NotProduct NotProduct   Unavailable  find_in_catalog   Product / Catalog / NotProduct
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::filters::{strip_trailing_slash, TextFilters};
use crate::pipeline::{loader::normalize_url, OracleClient, PageLoader};
use crate::types::{
    ClassificationVerdict, CuratorConfig, PageClassification, PageVerdict, ProductQuery,
    UrlVerdict,
};

/// Decides what kind of page a URL points to.
#[derive(Clone)]
pub struct PageClassifier {
    loader: PageLoader,
    oracle: OracleClient,
    filters: TextFilters,
    config: Arc<CuratorConfig>,
}

impl PageClassifier {
    pub fn new(loader: PageLoader, oracle: OracleClient, config: Arc<CuratorConfig>) -> Self {
        Self {
            loader,
            oracle,
            filters: TextFilters::new(&config.keywords),
            config,
        }
    }

    /// Oracle client shared with the classifier.
    pub fn oracle(&self) -> &OracleClient {
        &self.oracle
    }

    /// Local filters shared with the classifier.
    pub fn filters(&self) -> &TextFilters {
        &self.filters
    }

    /// Classify the page at `url` as a candidate product page of
    /// `brand`'s `product`.
    ///
    /// Fetch failures come back as `NotProduct`; only oracle and cache
    /// failures are errors.
    pub async fn classify(
        &self,
        product: &str,
        brand: &str,
        url: Option<&str>,
    ) -> Result<PageClassification> {
        let Some(url) = url else {
            return Ok(PageClassification::not_product(None));
        };
        let url = normalize_url(url);

        if self.config.is_skipped_extension(&url) {
            debug!(url = %url, "Skipping non-HTML document");
            return Ok(PageClassification::not_product(Some(url)));
        }

        let page = match self.loader.load(&url).await {
            Ok(page) => page,
            Err(e) => {
                debug!(url = %url, error = %e, "Unloadable page treated as not a product");
                return Ok(PageClassification::not_product(Some(url)));
            }
        };

        let canonical = strip_trailing_slash(&page.canonical_url).to_string();
        let verdict = self
            .decide(product, brand, &canonical, &page.visible_text)
            .await?;

        info!(url = %canonical, verdict = verdict.label(), "Classified page");
        Ok(PageClassification::new(Some(canonical), verdict))
    }

    /// Classify the candidate URL of a query.
    pub async fn classify_query(&self, query: &ProductQuery) -> Result<PageClassification> {
        self.classify(&query.product, &query.brand, query.url.as_deref())
            .await
    }

    async fn decide(
        &self,
        product: &str,
        brand: &str,
        url: &str,
        text: &str,
    ) -> Result<ClassificationVerdict> {
        if !self.filters.looks_like_product_url(url, text, brand) {
            return Ok(ClassificationVerdict::NotProduct);
        }

        if self.filters.is_unavailable(text) {
            let found: BTreeMap<String, usize> = self
                .filters
                .unavailable_signals(text)
                .into_iter()
                .filter(|(_, n)| *n > 0)
                .collect();
            info!(url = %url, keywords = ?found, "Unavailable keywords found");
            return Ok(ClassificationVerdict::Unavailable);
        }

        match self.oracle.check_url(product, url).await? {
            UrlVerdict::NotProduct => return Ok(ClassificationVerdict::NotProduct),
            UrlVerdict::Catalog => {
                return Ok(match self.oracle.find_in_catalog(product, url, text).await? {
                    Some(model) => ClassificationVerdict::Catalog(model),
                    None => {
                        warn!(url = %url, "Catalog page without a product name");
                        ClassificationVerdict::NotProduct
                    }
                });
            }
            UrlVerdict::Product | UrlVerdict::Unsure => {}
        }

        Ok(match self.oracle.check_product_page(product, url, text).await? {
            PageVerdict::Product => ClassificationVerdict::Product,
            PageVerdict::Catalog(model) => ClassificationVerdict::Catalog(model),
            PageVerdict::NotProduct => ClassificationVerdict::NotProduct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryCache;
    use crate::testing::{MockFetcher, MockOracle};
    use crate::traits::oracle::QueryKind;
    use crate::types::{FetchedPage, RetryPolicy};

    const URL: &str = "http://acme.com/blender/x100";
    const PRODUCT_HTML: &str = "<h1>X100</h1><p>Full specifications and price</p>";

    fn classifier(fetcher: MockFetcher, oracle: Arc<MockOracle>) -> PageClassifier {
        let cache = Arc::new(MemoryCache::new());
        let config = Arc::new(CuratorConfig::default().with_retry(RetryPolicy::immediate(0)));
        PageClassifier::new(
            PageLoader::new(Arc::new(fetcher), cache.clone()),
            OracleClient::new(oracle, cache, config.retry, config.max_prompt_chars),
            config,
        )
    }

    fn fetcher(html: &str) -> MockFetcher {
        MockFetcher::new().with_page(FetchedPage::new(URL, URL, html))
    }

    #[tokio::test]
    async fn test_missing_url_is_not_product() {
        let oracle = Arc::new(MockOracle::new());
        let c = classifier(MockFetcher::new(), oracle.clone());

        let result = c.classify("blender", "Acme", None).await.unwrap();
        assert_eq!(result, PageClassification::not_product(None));
        assert!(oracle.calls().is_empty());
    }

    #[tokio::test]
    async fn test_pdf_is_skipped_without_fetching() {
        let fetcher = MockFetcher::new();
        let oracle = Arc::new(MockOracle::new());
        let c = classifier(fetcher, oracle.clone());

        let result = c
            .classify("blender", "Acme", Some("https://acme.com/manual.pdf"))
            .await
            .unwrap();
        assert_eq!(result.verdict, ClassificationVerdict::NotProduct);
        assert!(oracle.calls().is_empty());
    }

    #[tokio::test]
    async fn test_product_page() {
        let oracle = Arc::new(
            MockOracle::new()
                .with_answer(QueryKind::CheckUrl, URL, "True\nofficial page")
                .with_answer(QueryKind::CheckProductPage, URL, "True"),
        );
        let c = classifier(fetcher(PRODUCT_HTML), oracle);

        let result = c.classify("blender", "Acme", Some(URL)).await.unwrap();
        assert_eq!(result.verdict, ClassificationVerdict::Product);
        assert_eq!(result.url.as_deref(), Some(URL));
    }

    #[tokio::test]
    async fn test_url_catalog_extracts_model() {
        let oracle = Arc::new(
            MockOracle::new()
                .with_answer(QueryKind::CheckUrl, URL, "Catalog\nlineup")
                .with_answer(QueryKind::FindInCatalog, URL, "X200."),
        );
        let c = classifier(fetcher(PRODUCT_HTML), oracle.clone());

        let result = c.classify("blender", "Acme", Some(URL)).await.unwrap();
        assert_eq!(result.verdict, ClassificationVerdict::Catalog("X200".into()));
        assert_eq!(oracle.call_count(QueryKind::CheckProductPage), 0);
    }

    #[tokio::test]
    async fn test_text_catalog_suggestion() {
        let oracle = Arc::new(
            MockOracle::new()
                .with_answer(QueryKind::CheckUrl, URL, "Unsure")
                .with_answer(QueryKind::CheckProductPage, URL, "False\nX300"),
        );
        let c = classifier(fetcher(PRODUCT_HTML), oracle);

        let result = c.classify("blender", "Acme", Some(URL)).await.unwrap();
        assert_eq!(result.verdict, ClassificationVerdict::Catalog("X300".into()));
    }

    #[tokio::test]
    async fn test_url_filter_failure_skips_oracle() {
        let oracle = Arc::new(MockOracle::new());
        let c = classifier(fetcher("<p>About our company</p>"), oracle.clone());

        let result = c.classify("blender", "Acme", Some(URL)).await.unwrap();
        assert_eq!(result.verdict, ClassificationVerdict::NotProduct);
        assert!(oracle.calls().is_empty());
    }

    #[tokio::test]
    async fn test_negative_url_check() {
        let oracle = Arc::new(MockOracle::new().with_answer(QueryKind::CheckUrl, URL, "False"));
        let c = classifier(fetcher(PRODUCT_HTML), oracle.clone());

        let result = c.classify("blender", "Acme", Some(URL)).await.unwrap();
        assert_eq!(result.verdict, ClassificationVerdict::NotProduct);
        assert_eq!(oracle.call_count(QueryKind::CheckProductPage), 0);
    }

    #[tokio::test]
    async fn test_trailing_slash_is_dropped_from_canonical_url() {
        let with_slash = "https://acme.com/x100/";
        let oracle = Arc::new(
            MockOracle::new()
                .with_answer(QueryKind::CheckUrl, "https://acme.com/x100", "True")
                .with_answer(QueryKind::CheckProductPage, "https://acme.com/x100", "True"),
        );
        let fetcher =
            MockFetcher::new().with_page(FetchedPage::new(with_slash, with_slash, PRODUCT_HTML));
        let c = classifier(fetcher, oracle);

        let result = c.classify("blender", "Acme", Some(with_slash)).await.unwrap();
        assert_eq!(result.url.as_deref(), Some("https://acme.com/x100"));
        assert!(result.verdict.is_product());
    }
}
