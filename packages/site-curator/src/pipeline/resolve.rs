//! Search-based resolution of a product to its official page.
//!
//! Searches for `"{verb} {brand} {model} {product}"` and classifies the hits
//! in rank order. A catalog hit naming a different model restarts the search
//! for that model, up to `max_depth` hops; the first available product page
//! wins.

use deunicode::deunicode;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{Result, SearchError};
use crate::filters::strip_trailing_slash;
use crate::pipeline::PageClassifier;
use crate::traits::{
    searcher::SearchProvider,
    store::{namespace, ResponseCache},
};
use crate::types::{ClassificationVerdict, CuratorConfig, ResolutionOutcome, SearchCandidate};

/// Finds a product page through web search.
#[derive(Clone)]
pub struct SearchResolver {
    classifier: PageClassifier,
    search: Arc<dyn SearchProvider>,
    cache: Arc<dyn ResponseCache>,
    config: Arc<CuratorConfig>,
}

impl SearchResolver {
    pub fn new(
        classifier: PageClassifier,
        search: Arc<dyn SearchProvider>,
        cache: Arc<dyn ResponseCache>,
        config: Arc<CuratorConfig>,
    ) -> Self {
        Self {
            classifier,
            search,
            cache,
            config,
        }
    }

    /// Classifier used for every candidate.
    pub fn classifier(&self) -> &PageClassifier {
        &self.classifier
    }

    /// Resolve `model` of `brand`'s `product` to a verified product page.
    ///
    /// Catalog hops are followed as a loop: each hop replaces the model and
    /// searches again, abandoning the remaining hits of the previous search.
    /// A catalog that names the model just searched for, or one found once
    /// `max_depth` hops have been taken, is skipped like any other miss.
    pub async fn resolve(
        &self,
        product: &str,
        brand: &str,
        model: &str,
    ) -> Result<ResolutionOutcome> {
        let mut model = model.to_string();
        let mut depth: u32 = 0;

        'search: loop {
            let query = self.query(product, brand, &model);
            let candidates = self.search(&query).await?;
            if candidates.is_empty() {
                info!(query = %query, "No search results");
            }

            for candidate in candidates {
                let link = strip_trailing_slash(&candidate.link);

                if !self.classifier.filters().candidate_allowed(link, brand) {
                    debug!(link = %link, "Candidate filtered out");
                    continue;
                }

                if !self.belongs_to_brand(brand, link).await? {
                    debug!(link = %link, brand = %brand, "Candidate not from brand");
                    continue;
                }

                let classification = self
                    .classifier
                    .classify(product, brand, Some(link))
                    .await?;

                match classification.verdict {
                    ClassificationVerdict::Product => {
                        let url = classification.url.unwrap_or_else(|| link.to_string());
                        info!(model = %model, url = %url, depth, "Resolved product page");
                        return Ok(ResolutionOutcome::found(
                            model,
                            url,
                            Some(candidate.title),
                        ));
                    }
                    ClassificationVerdict::Catalog(next) => {
                        if next == model || depth >= self.config.max_depth {
                            debug!(
                                link = %link,
                                catalog_model = %next,
                                depth,
                                "Catalog hop not taken"
                            );
                            continue;
                        }
                        info!(from = %model, to = %next, depth = depth + 1, "Following catalog");
                        model = next;
                        depth += 1;
                        continue 'search;
                    }
                    ClassificationVerdict::Unavailable | ClassificationVerdict::NotProduct => {}
                }
            }

            info!(model = %model, depth, "No matching product page in search results");
            return Ok(ResolutionOutcome::not_found(model));
        }
    }

    fn query(&self, product: &str, brand: &str, model: &str) -> String {
        format!(
            "{} {} {} {}",
            self.config.search_query_verb, brand, model, product
        )
    }

    /// Run a search through the response cache.
    ///
    /// Provider failures count as zero results; only successful responses are
    /// cached.
    async fn search(&self, query: &str) -> Result<Vec<SearchCandidate>> {
        if let Some(cached) = self.cache.get(namespace::SEARCH, query).await? {
            match serde_json::from_str::<Vec<SearchCandidate>>(&cached) {
                Ok(candidates) => {
                    debug!(query = %query, "Search results from cache");
                    return Ok(candidates);
                }
                Err(e) => warn!(query = %query, error = %e, "Ignoring unreadable cached search"),
            }
        }

        match self.search.search(query).await {
            Ok(candidates) => {
                let json = serde_json::to_string(&candidates)
                    .map_err(crate::error::CacheError::from)?;
                self.cache.put(namespace::SEARCH, query, &json).await?;
                info!(query = %query, results = candidates.len(), "Search complete");
                Ok(candidates)
            }
            Err(SearchError::RateLimited { status }) => {
                warn!(query = %query, status, "Search rate limited");
                Ok(Vec::new())
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Search failed");
                Ok(Vec::new())
            }
        }
    }

    async fn belongs_to_brand(&self, brand: &str, link: &str) -> Result<bool> {
        let prefix = host_and_first_segment(link);
        if brand_in_prefix(brand, prefix) {
            return Ok(true);
        }
        self.classifier.oracle().check_url_brand(brand, prefix).await
    }
}

/// `host/first-segment` of a link, e.g. `www.acme.com/blenders`.
fn host_and_first_segment(link: &str) -> &str {
    let rest = link.split_once("://").map_or(link, |(_, rest)| rest);
    match rest.match_indices('/').nth(1) {
        Some((idx, _)) => &rest[..idx],
        None => rest,
    }
}

/// Whether the brand's plain spelling appears in a link prefix.
fn brand_in_prefix(brand: &str, prefix: &str) -> bool {
    let needle: String = deunicode(brand)
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .to_lowercase();
    let haystack: String = prefix
        .chars()
        .filter(|c| !matches!(c, '-' | '_'))
        .collect::<String>()
        .to_lowercase();
    haystack.contains(&needle)
}
