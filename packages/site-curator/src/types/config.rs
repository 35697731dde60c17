//! Configuration types for classification and resolution.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Keyword lists driving the local page heuristics.
///
/// These are deployment-specific; the defaults suit consumer-appliance
/// manufacturer sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSet {
    /// At least one must appear in the page text of a product page.
    pub product_keywords: Vec<String>,

    /// None may appear in a product-page URL (marketplaces, aggregators).
    pub discard_keywords: Vec<String>,

    /// Any occurrence in the page text marks the product unavailable.
    pub unavailable_keywords: Vec<String>,

    /// Marketplace domains that also sell their own brand.
    ///
    /// A URL on one of these is only acceptable when the brand name itself
    /// contains the marketplace name.
    pub marketplace_domains: Vec<String>,
}

impl Default for KeywordSet {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }

        Self {
            product_keywords: owned(&[
                "buy",
                "spec",
                "price",
                "feature",
                "overview",
                "add to cart",
                "where to buy",
                "dimensions",
            ]),
            discard_keywords: owned(&[
                "ebay.",
                "walmart.",
                "bestbuy.",
                "target.com",
                "homedepot.",
                "lowes.",
                "costco.",
                "newegg.",
                "alibaba.",
                "aliexpress.",
                "youtube.",
                "reddit.",
                "wikipedia.",
                "facebook.",
                "google.",
            ]),
            unavailable_keywords: owned(&[
                "discontinued",
                "no longer available",
                "page not found",
                "product not found",
                "page you requested could not be found",
            ]),
            marketplace_domains: owned(&["amazon"]),
        }
    }
}

/// Retry schedule for oracle calls.
///
/// The delay before retry `n` (0-based) is `unit * backoff_base^n`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base: f64,
    #[serde(with = "duration_ms")]
    pub unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_base: 1.5,
            unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy that retries without sleeping (for tests).
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff_base: 1.5,
            unit: Duration::ZERO,
        }
    }

    /// Delay before the given 0-based retry.
    pub fn delay(&self, retry: u32) -> Duration {
        self.unit.mul_f64(self.backoff_base.powi(retry as i32))
    }
}

/// Configuration for the classification and resolution pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratorConfig {
    /// Keyword lists for the local heuristics.
    #[serde(default)]
    pub keywords: KeywordSet,

    /// URL suffixes that are never HTML pages (checked case-insensitively).
    pub skip_extensions: Vec<String>,

    /// Maximum number of chained catalog hops during search resolution.
    ///
    /// Default: 3.
    pub max_depth: u32,

    /// Number of dataset rows evaluated concurrently.
    ///
    /// Default: 6.
    pub concurrency: usize,

    /// Oracle retry schedule.
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Character budget a prompt is truncated to after a context overflow.
    pub max_prompt_chars: usize,

    /// Purchase-intent verb prefixed to search queries.
    pub search_query_verb: String,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            keywords: KeywordSet::default(),
            skip_extensions: vec![
                ".pdf".to_string(),
                ".doc".to_string(),
                ".docx".to_string(),
                ".xls".to_string(),
                ".xlsx".to_string(),
                ".zip".to_string(),
            ],
            max_depth: 3,
            concurrency: 6,
            retry: RetryPolicy::default(),
            // 16 385 tokens at roughly four characters per token
            max_prompt_chars: 16_385 * 4,
            search_query_verb: "buy".to_string(),
        }
    }
}

impl CuratorConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the keyword lists.
    pub fn with_keywords(mut self, keywords: KeywordSet) -> Self {
        self.keywords = keywords;
        self
    }

    /// Set the catalog recursion bound.
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the row concurrency.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the oracle retry schedule.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the prompt truncation budget.
    pub fn with_max_prompt_chars(mut self, chars: usize) -> Self {
        self.max_prompt_chars = chars;
        self
    }

    /// Whether a URL points at a known non-HTML document.
    pub fn is_skipped_extension(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        self.skip_extensions.iter().any(|ext| url.ends_with(ext.as_str()))
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
