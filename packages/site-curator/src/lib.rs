//! Product Site Curation Engine
//!
//! Builds and curates datasets that map {product, brand, model} triples to
//! verified manufacturer product-page URLs. For each candidate URL the engine
//! decides whether the page is an official single-product page, a catalog
//! page, an unavailable product, or irrelevant, and recovers a better URL
//! through web search when the given one is unusable.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use site_curator::{Curator, CuratorConfig, FileCache, GoogleSearch, HttpFetcher, OpenAIOracle};
//!
//! let curator = Curator::new(
//!     Arc::new(HttpFetcher::new()),
//!     Arc::new(OpenAIOracle::from_env()?),
//!     Arc::new(GoogleSearch::from_env()?),
//!     Arc::new(FileCache::new(".curator-cache")),
//!     CuratorConfig::default(),
//! );
//!
//! let rows = site_curator::dataset::read_rows(path, None)?;
//! let result = curator.reconciler().reconcile(rows, 6).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator abstractions (PageFetcher, Oracle, SearchProvider, ResponseCache)
//! - [`types`] - Queries, pages, verdicts, configuration
//! - [`filters`] - Local keyword heuristics
//! - [`pipeline`] - Classification, resolution and reconciliation
//! - [`dataset`] - CSV rows, versioning, audit trails
//! - [`stores`] - Cache implementations
//! - [`backends`] - HTTP, OpenAI and Google implementations
//! - [`security`] - Credential handling
//! - [`testing`] - Mock collaborators

pub mod backends;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod filters;
pub mod pipeline;
pub mod security;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

pub use backends::{GoogleSearch, HttpFetcher, OpenAIOracle};
pub use engine::Curator;
pub use error::{
    CacheError, CuratorError, DatasetError, FetchError, OracleError, Result, SearchError,
};
pub use filters::TextFilters;
pub use pipeline::{
    snapshot_pages, DatasetReconciler, ModelNamer, OracleClient, PageClassifier, PageLoader,
    Reconciliation, SearchResolver, SnapshotReport,
};
pub use security::{OracleCredentials, SearchCredentials, SecretString};
pub use stores::{FileCache, MemoryCache};
pub use traits::{
    fetcher::PageFetcher,
    oracle::{Oracle, OracleRequest, QueryKind},
    searcher::SearchProvider,
    store::ResponseCache,
};
pub use types::{
    ClassificationVerdict, CuratorConfig, DatasetRow, FetchedPage, KeywordSet, ModelNameVerdict,
    PageClassification, PageContent, PageVerdict, ProductQuery, ResolutionOutcome, RetryPolicy,
    SearchCandidate, UrlVerdict,
};
