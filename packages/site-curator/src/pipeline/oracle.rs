//! Cached, retried oracle calls with typed verdicts.
//!
//! Every answer is cached by (query kind, URL) before it is interpreted, and
//! a cached answer is never re-asked. Raw answer text stops here: callers only
//! see the verdict enums.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{OracleError, Result};
use crate::pipeline::prompts;
use crate::traits::{
    oracle::{Oracle, OracleRequest, QueryKind},
    store::ResponseCache,
};
use crate::types::{ModelNameVerdict, PageVerdict, RetryPolicy, UrlVerdict};

/// How a single attempt ended.
#[derive(Debug)]
enum Attempt {
    Ok(String),
    Retryable(String),
    Truncate,
    Fatal(OracleError),
}

impl From<std::result::Result<String, OracleError>> for Attempt {
    fn from(result: std::result::Result<String, OracleError>) -> Self {
        match result {
            Ok(text) => Self::Ok(text),
            Err(OracleError::ContextOverflow) => Self::Truncate,
            Err(OracleError::Transient(reason)) => Self::Retryable(reason),
            Err(e) => Self::Fatal(e),
        }
    }
}

/// Oracle wrapper adding caching, retries and verdict parsing.
#[derive(Clone)]
pub struct OracleClient {
    oracle: Arc<dyn Oracle>,
    cache: Arc<dyn ResponseCache>,
    retry: RetryPolicy,
    max_prompt_chars: usize,
}

impl OracleClient {
    pub fn new(
        oracle: Arc<dyn Oracle>,
        cache: Arc<dyn ResponseCache>,
        retry: RetryPolicy,
        max_prompt_chars: usize,
    ) -> Self {
        Self {
            oracle,
            cache,
            retry,
            max_prompt_chars,
        }
    }

    /// Does `url` look like an official single-product page for `product`?
    pub async fn check_url(&self, product: &str, url: &str) -> Result<UrlVerdict> {
        let prompt = prompts::format_check_url_prompt(product, url);
        let answer = self.ask(QueryKind::CheckUrl, url, prompt).await?;
        let verdict = parse_url_verdict(&answer);
        info!(url = %url, verdict = ?verdict, "URL check");
        Ok(verdict)
    }

    /// Is the page text an official single-product page for `product`?
    pub async fn check_product_page(
        &self,
        product: &str,
        url: &str,
        text: &str,
    ) -> Result<PageVerdict> {
        let prompt = prompts::format_check_product_page_prompt(product, text);
        let answer = self.ask(QueryKind::CheckProductPage, url, prompt).await?;
        let verdict = parse_page_verdict(&answer);
        info!(url = %url, verdict = ?verdict, "Page check");
        Ok(verdict)
    }

    /// Name one product listed on a catalog page. `None` if the answer is empty.
    pub async fn find_in_catalog(
        &self,
        product: &str,
        url: &str,
        text: &str,
    ) -> Result<Option<String>> {
        let prompt = prompts::format_find_in_catalog_prompt(product, text);
        let answer = self.ask(QueryKind::FindInCatalog, url, prompt).await?;
        let model = parse_catalog_model(&answer);
        info!(url = %url, model = ?model, "Catalog model");
        Ok(model)
    }

    /// Does a URL prefix belong to `brand`?
    pub async fn check_url_brand(&self, brand: &str, url: &str) -> Result<bool> {
        let prompt = prompts::format_check_url_brand_prompt(brand, url);
        let answer = self.ask(QueryKind::CheckUrlBrand, url, prompt).await?;
        let matches = answer.starts_with("true");
        info!(url = %url, brand = %brand, matches, "Brand check");
        Ok(matches)
    }

    /// What is the real model name of the page at `url`?
    pub async fn update_model_name(
        &self,
        product: &str,
        brand: &str,
        model: &str,
        title: &str,
        url: &str,
    ) -> Result<ModelNameVerdict> {
        let prompt = prompts::format_update_model_name_prompt(product, brand, model, title, url);
        let answer = self.ask(QueryKind::UpdateModelName, url, prompt).await?;
        let verdict = parse_model_name(&answer);
        info!(url = %url, verdict = ?verdict, "Model name");
        Ok(verdict)
    }

    /// Cached, retried call returning the normalized answer text.
    async fn ask(&self, kind: QueryKind, url: &str, prompt: String) -> Result<String> {
        let namespace = kind.cache_namespace();

        if let Some(raw) = self.cache.get(&namespace, url).await? {
            debug!(kind = %kind, url = %url, "Oracle answer from cache");
            return Ok(normalize(kind, &raw));
        }

        debug!(kind = %kind, url = %url, oracle = self.oracle.name(), "Oracle request");
        let raw = self
            .call_with_retry(OracleRequest::new(kind, url, prompt))
            .await?;
        self.cache.put(&namespace, url, &raw).await?;

        Ok(normalize(kind, &raw))
    }

    async fn call_with_retry(&self, mut request: OracleRequest) -> Result<String> {
        let mut retries = 0;
        let mut truncated = false;

        loop {
            let attempt = Attempt::from(self.oracle.query(&request).await);

            match attempt {
                Attempt::Ok(text) => return Ok(text),

                Attempt::Truncate if !truncated => {
                    warn!(
                        kind = %request.kind,
                        url = %request.url,
                        max_chars = self.max_prompt_chars,
                        "Prompt too long, truncating"
                    );
                    request.prompt = truncate_chars(&request.prompt, self.max_prompt_chars);
                    truncated = true;
                }

                Attempt::Truncate => return Err(OracleError::ContextOverflow.into()),

                Attempt::Retryable(reason) if retries < self.retry.max_retries => {
                    let delay = self.retry.delay(retries);
                    warn!(
                        kind = %request.kind,
                        url = %request.url,
                        retry = retries + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %reason,
                        "Oracle call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retries += 1;
                }

                Attempt::Retryable(reason) => {
                    return Err(OracleError::Exhausted {
                        attempts: retries + 1,
                        last: reason,
                    }
                    .into())
                }

                Attempt::Fatal(e) => return Err(e.into()),
            }
        }
    }
}

/// Strip quote characters and surrounding whitespace; lower-case verdict words.
fn normalize(kind: QueryKind, raw: &str) -> String {
    let text = raw.replace('\'', "");
    let text = text.trim();
    if kind.preserves_case() {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}

/// First word of the first line, lower-cased, without trailing punctuation.
fn verdict_word(line: &str) -> String {
    line.split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c: char| c.is_ascii_punctuation())
        .to_lowercase()
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}

fn trim_model(name: &str) -> Option<String> {
    let name = name.trim();
    let name = name.strip_suffix('.').unwrap_or(name).trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Parse a `check_url` answer. Anything unrecognized lets the page through.
pub fn parse_url_verdict(answer: &str) -> UrlVerdict {
    match verdict_word(first_line(answer)).as_str() {
        "false" => UrlVerdict::NotProduct,
        "catalog" => UrlVerdict::Catalog,
        "unsure" => UrlVerdict::Unsure,
        _ => UrlVerdict::Product,
    }
}

/// Parse a `check_product_page` answer.
///
/// `true` on the first line is a product page. Otherwise a product name on a
/// following line marks a catalog; without one the page is not a product.
pub fn parse_page_verdict(answer: &str) -> PageVerdict {
    let mut lines = answer.lines();
    let head = verdict_word(lines.next().unwrap_or(""));
    if head == "true" {
        return PageVerdict::Product;
    }

    match lines.map(str::trim).find(|l| !l.is_empty()).and_then(trim_model) {
        Some(model) => PageVerdict::Catalog(model),
        None => PageVerdict::NotProduct,
    }
}

/// Parse a `find_in_catalog` answer.
pub fn parse_catalog_model(answer: &str) -> Option<String> {
    trim_model(first_line(answer))
}

/// Parse an `update_model_name` answer.
pub fn parse_model_name(answer: &str) -> ModelNameVerdict {
    let line = first_line(answer);
    if line.is_empty() || line.to_lowercase().contains("title uninformative") {
        return ModelNameVerdict::Uninformative;
    }
    ModelNameVerdict::Named(line.to_string())
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryCache;
    use crate::testing::MockOracle;

    fn client(oracle: Arc<MockOracle>, cache: Arc<MemoryCache>) -> OracleClient {
        OracleClient::new(oracle, cache, RetryPolicy::immediate(5), 40)
    }

    #[test]
    fn test_url_verdicts() {
        assert_eq!(parse_url_verdict("false\nthird-party"), UrlVerdict::NotProduct);
        assert_eq!(parse_url_verdict("catalog. lineup page"), UrlVerdict::Catalog);
        assert_eq!(parse_url_verdict("unsure"), UrlVerdict::Unsure);
        assert_eq!(parse_url_verdict("true\nofficial page"), UrlVerdict::Product);
        assert_eq!(parse_url_verdict(""), UrlVerdict::Product);
    }

    #[test]
    fn test_page_verdicts() {
        assert_eq!(parse_page_verdict("True"), PageVerdict::Product);
        assert_eq!(parse_page_verdict("False"), PageVerdict::NotProduct);
        assert_eq!(
            parse_page_verdict("False\nX200 Pro."),
            PageVerdict::Catalog("X200 Pro".into())
        );
        assert_eq!(
            parse_page_verdict("False\n\n  X200"),
            PageVerdict::Catalog("X200".into())
        );
        assert_eq!(parse_page_verdict("maybe"), PageVerdict::NotProduct);
    }

    #[test]
    fn test_model_name_verdicts() {
        assert_eq!(
            parse_model_name("X100 Pro\nThe title says so"),
            ModelNameVerdict::Named("X100 Pro".into())
        );
        assert_eq!(
            parse_model_name("Title uninformative"),
            ModelNameVerdict::Uninformative
        );
        assert_eq!(parse_catalog_model("SuperBlend 3000."), Some("SuperBlend 3000".into()));
        assert_eq!(parse_catalog_model("  "), None);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[tokio::test]
    async fn test_answers_are_cached() {
        let oracle = Arc::new(
            MockOracle::new().with_answer(QueryKind::CheckUrl, "https://acme.com/x100", "'True'"),
        );
        let cache = Arc::new(MemoryCache::new());
        let client = client(oracle.clone(), cache.clone());

        let first = client.check_url("blender", "https://acme.com/x100").await.unwrap();
        let second = client.check_url("blender", "https://acme.com/x100").await.unwrap();

        assert_eq!(first, UrlVerdict::Product);
        assert_eq!(first, second);
        assert_eq!(oracle.call_count(QueryKind::CheckUrl), 1);
        assert_eq!(cache.count("oracle/check_url"), 1);
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let oracle = Arc::new(
            MockOracle::new()
                .with_answer(QueryKind::CheckUrlBrand, "acme.com/x", "True")
                .with_transient_failures(3),
        );
        let client = client(oracle.clone(), Arc::new(MemoryCache::new()));

        assert!(client.check_url_brand("Acme", "acme.com/x").await.unwrap());
        assert_eq!(oracle.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_exhausted_retries_fail_loudly() {
        let oracle = Arc::new(
            MockOracle::new()
                .with_answer(QueryKind::CheckUrlBrand, "acme.com/x", "True")
                .with_transient_failures(10),
        );
        let cache = Arc::new(MemoryCache::new());
        let client = client(oracle.clone(), cache.clone());

        let err = client.check_url_brand("Acme", "acme.com/x").await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::CuratorError::Oracle(OracleError::Exhausted { attempts: 6, .. })
        ));
        assert_eq!(oracle.calls().len(), 6);
        assert_eq!(cache.count("oracle/check_url_brand"), 0);
    }

    #[tokio::test]
    async fn test_overlong_prompt_is_truncated_once() {
        let oracle = Arc::new(
            MockOracle::new()
                .with_answer(QueryKind::FindInCatalog, "https://acme.com/all", "X200")
                .with_max_prompt_chars(40),
        );
        let client = client(oracle.clone(), Arc::new(MemoryCache::new()));

        let model = client
            .find_in_catalog("blender", "https://acme.com/all", &"x".repeat(500))
            .await
            .unwrap();

        assert_eq!(model.as_deref(), Some("X200"));
        let calls = oracle.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].prompt_chars, 40);
    }

    #[tokio::test]
    async fn test_second_overflow_is_fatal() {
        let oracle = Arc::new(
            MockOracle::new()
                .with_answer(QueryKind::FindInCatalog, "https://acme.com/all", "X200")
                .with_max_prompt_chars(10),
        );
        let client = client(oracle.clone(), Arc::new(MemoryCache::new()));

        let err = client
            .find_in_catalog("blender", "https://acme.com/all", &"x".repeat(500))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            crate::error::CuratorError::Oracle(OracleError::ContextOverflow)
        ));
        assert_eq!(oracle.calls().len(), 2);
    }
}
