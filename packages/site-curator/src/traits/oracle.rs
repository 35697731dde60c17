//! Classification oracle trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::OracleResult;

/// The fixed set of questions the engine asks the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Does the URL look like an official single-product page?
    CheckUrl,
    /// Is the page text an official single-product page?
    CheckProductPage,
    /// Name one product listed on a catalog page.
    FindInCatalog,
    /// Does the URL belong to the brand?
    CheckUrlBrand,
    /// What is the real model name given a page title?
    UpdateModelName,
}

impl QueryKind {
    pub const ALL: [QueryKind; 5] = [
        Self::CheckUrl,
        Self::CheckProductPage,
        Self::FindInCatalog,
        Self::CheckUrlBrand,
        Self::UpdateModelName,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckUrl => "check_url",
            Self::CheckProductPage => "check_product_page",
            Self::FindInCatalog => "find_in_catalog",
            Self::CheckUrlBrand => "check_url_brand",
            Self::UpdateModelName => "update_model_name",
        }
    }

    /// Cache namespace holding answers of this kind.
    pub fn cache_namespace(&self) -> String {
        format!("{}/{}", super::store::namespace::ORACLE_PREFIX, self.as_str())
    }

    /// Whether the answer keeps its case.
    ///
    /// Verdict words are compared lower-cased; answers that carry a product
    /// name keep the oracle's spelling.
    pub fn preserves_case(&self) -> bool {
        matches!(
            self,
            Self::FindInCatalog | Self::CheckProductPage | Self::UpdateModelName
        )
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered oracle question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    pub kind: QueryKind,

    /// URL the question is about (also the cache key)
    pub url: String,

    /// Full prompt text
    pub prompt: String,
}

impl OracleRequest {
    pub fn new(kind: QueryKind, url: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            prompt: prompt.into(),
        }
    }
}

/// External text-classification service.
///
/// Implementations make exactly one attempt per call and map failures onto
/// [`crate::error::OracleError`] variants; caching and retries live in
/// [`crate::pipeline::OracleClient`].
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Ask one question and return the raw answer text.
    async fn query(&self, request: &OracleRequest) -> OracleResult<String>;

    /// Name of this oracle for logging.
    fn name(&self) -> &str {
        "oracle"
    }
}
