//! Domain types shared across the engine.

pub mod config;
pub mod dataset;
pub mod page;
pub mod query;
pub mod verdict;

pub use config::{CuratorConfig, KeywordSet, RetryPolicy};
pub use dataset::DatasetRow;
pub use page::{FetchedPage, PageContent};
pub use query::{ProductQuery, ResolutionOutcome, SearchCandidate};
pub use verdict::{ClassificationVerdict, ModelNameVerdict, PageClassification, PageVerdict, UrlVerdict};
