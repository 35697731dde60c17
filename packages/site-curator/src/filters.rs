//! Local page heuristics.
//!
//! Pure string checks over a URL and the visible text of a page. Nothing in
//! here performs I/O; the classifier runs these before spending oracle calls.

use std::collections::BTreeMap;

use crate::types::KeywordSet;

/// Keyword-driven URL and text filters.
#[derive(Debug, Clone)]
pub struct TextFilters {
    keywords: KeywordSet,
}

impl TextFilters {
    /// Create filters over the given keyword lists.
    ///
    /// Keywords are lower-cased once here so every check is case-insensitive.
    pub fn new(keywords: &KeywordSet) -> Self {
        fn lower(words: &[String]) -> Vec<String> {
            words.iter().map(|w| w.to_lowercase()).collect()
        }

        Self {
            keywords: KeywordSet {
                product_keywords: lower(&keywords.product_keywords),
                discard_keywords: lower(&keywords.discard_keywords),
                unavailable_keywords: lower(&keywords.unavailable_keywords),
                marketplace_domains: lower(&keywords.marketplace_domains),
            },
        }
    }

    /// Whether a fetched page plausibly is a product page of `brand`.
    ///
    /// Requires a path beyond the host, at least one product keyword in the
    /// text, no discard keyword in the URL, and no foreign marketplace.
    pub fn looks_like_product_url(&self, url: &str, text: &str, brand: &str) -> bool {
        let url = strip_trailing_slash(url);
        if !has_path(url) {
            return false;
        }

        let text = text.to_lowercase();
        let has_keyword = self
            .keywords
            .product_keywords
            .iter()
            .any(|kw| text.contains(kw.as_str()));

        has_keyword && self.url_allowed(url, brand)
    }

    /// Search-candidate pre-filter: path present, not discarded, no foreign
    /// marketplace. Expects a link with its trailing slash already removed.
    pub fn candidate_allowed(&self, link: &str, brand: &str) -> bool {
        has_path(link) && self.url_allowed(link, brand)
    }

    /// Occurrence count per unavailable keyword (case-insensitive).
    pub fn unavailable_signals(&self, text: &str) -> BTreeMap<String, usize> {
        let text = text.to_lowercase();
        self.keywords
            .unavailable_keywords
            .iter()
            .map(|kw| (kw.clone(), count_occurrences(&text, kw)))
            .collect()
    }

    /// Whether the page text reports the product as unavailable.
    pub fn is_unavailable(&self, text: &str) -> bool {
        let counts = self.unavailable_signals(text);
        let found = counts.values().filter(|&&n| n > 0).count();
        let total: usize = counts.values().sum();
        // Both halves are kept: a distinct keyword hit and a nonzero total.
        found > 0 && total > 0
    }

    fn url_allowed(&self, url: &str, brand: &str) -> bool {
        let url = url.to_lowercase();
        let brand = brand.to_lowercase();

        if self
            .keywords
            .discard_keywords
            .iter()
            .any(|kw| url.contains(kw.as_str()))
        {
            return false;
        }

        self.keywords
            .marketplace_domains
            .iter()
            .all(|market| !url.contains(market.as_str()) || brand.contains(market.as_str()))
    }
}

/// Remove a single trailing `/`.
pub fn strip_trailing_slash(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

/// Whether the URL has at least one path segment after the host.
pub fn has_path(url: &str) -> bool {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.contains('/')
}

fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}
