//! Testing utilities including mock collaborators.
//!
//! The mocks answer from tables set up by the test, record every call for
//! call-count assertions, and can inject failures.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult, OracleError, OracleResult, SearchError, SearchResult};
use crate::traits::{
    fetcher::PageFetcher,
    oracle::{Oracle, OracleRequest, QueryKind},
    searcher::SearchProvider,
};
use crate::types::{FetchedPage, SearchCandidate};

/// Record of a call made to the mock oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockOracleCall {
    pub kind: QueryKind,
    pub url: String,
    pub prompt_chars: usize,
}

/// A mock oracle answering from a (kind, URL) table.
///
/// Unknown questions fall back to a per-kind default, then fail fatally so a
/// missing answer shows up as a loud test failure.
#[derive(Default)]
pub struct MockOracle {
    answers: Arc<RwLock<HashMap<(QueryKind, String), String>>>,
    defaults: Arc<RwLock<HashMap<QueryKind, String>>>,
    transient_failures: Arc<RwLock<usize>>,
    max_prompt_chars: Option<usize>,
    calls: Arc<RwLock<Vec<MockOracleCall>>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `kind` questions about `url` with `answer`.
    pub fn with_answer(
        self,
        kind: QueryKind,
        url: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        self.answers
            .write()
            .unwrap()
            .insert((kind, url.into()), answer.into());
        self
    }

    /// Answer every otherwise unknown `kind` question with `answer`.
    pub fn with_default(self, kind: QueryKind, answer: impl Into<String>) -> Self {
        self.defaults.write().unwrap().insert(kind, answer.into());
        self
    }

    /// Fail the next `n` calls with a transient error.
    pub fn with_transient_failures(self, n: usize) -> Self {
        *self.transient_failures.write().unwrap() = n;
        self
    }

    /// Report a context overflow for prompts longer than `chars`.
    pub fn with_max_prompt_chars(mut self, chars: usize) -> Self {
        self.max_prompt_chars = Some(chars);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockOracleCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of calls of one kind.
    pub fn call_count(&self, kind: QueryKind) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.kind == kind)
            .count()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn query(&self, request: &OracleRequest) -> OracleResult<String> {
        let prompt_chars = request.prompt.chars().count();
        self.calls.write().unwrap().push(MockOracleCall {
            kind: request.kind,
            url: request.url.clone(),
            prompt_chars,
        });

        {
            let mut failures = self.transient_failures.write().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(OracleError::Transient("injected failure".into()));
            }
        }

        if self.max_prompt_chars.is_some_and(|max| prompt_chars > max) {
            return Err(OracleError::ContextOverflow);
        }

        let answer = self
            .answers
            .read()
            .unwrap()
            .get(&(request.kind, request.url.clone()))
            .cloned()
            .or_else(|| self.defaults.read().unwrap().get(&request.kind).cloned());

        answer.ok_or_else(|| {
            OracleError::Fatal(format!("no mock answer for {} {}", request.kind, request.url))
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock fetcher serving pages by requested URL.
///
/// Unknown URLs fail with HTTP 404.
#[derive(Default)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, FetchedPage>>>,
    fetched: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `page` for its requested URL.
    pub fn with_page(self, page: FetchedPage) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(page.requested_url.clone(), page);
        self
    }

    /// Serve `html` at `url` without a redirect.
    pub fn with_html(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        self.with_page(FetchedPage::new(url.clone(), url, html))
    }

    /// URLs fetched so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.read().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.read().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.fetched.write().unwrap().push(url.to_string());

        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock search provider answering from a query table.
///
/// Unknown queries return no results.
#[derive(Default)]
pub struct MockSearch {
    results: Arc<RwLock<HashMap<String, Vec<SearchCandidate>>>>,
    rate_limited: Arc<RwLock<bool>>,
    queries: Arc<RwLock<Vec<String>>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `candidates` for `query`.
    pub fn with_results(self, query: impl Into<String>, candidates: Vec<SearchCandidate>) -> Self {
        self.results
            .write()
            .unwrap()
            .insert(query.into(), candidates);
        self
    }

    /// Answer every query with HTTP 429.
    pub fn rate_limited(self) -> Self {
        *self.rate_limited.write().unwrap() = true;
        self
    }

    /// Queries received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.read().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str) -> SearchResult<Vec<SearchCandidate>> {
        self.queries.write().unwrap().push(query.to_string());

        if *self.rate_limited.read().unwrap() {
            return Err(SearchError::RateLimited { status: 429 });
        }

        Ok(self
            .results
            .read()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
