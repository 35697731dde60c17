//! Google Custom Search provider.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{SearchError, SearchResult};
use crate::security::SearchCredentials;
use crate::traits::searcher::SearchProvider;
use crate::types::SearchCandidate;

const ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Search provider backed by the Custom Search JSON API.
pub struct GoogleSearch {
    http_client: reqwest::Client,
    credentials: SearchCredentials,
    endpoint: String,
}

impl GoogleSearch {
    pub fn new(credentials: SearchCredentials) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            credentials,
            endpoint: ENDPOINT.to_string(),
        }
    }

    /// Create from `GOOGLE_API_KEY` and `GOOGLE_CSE_ID`.
    pub fn from_env() -> SearchResult<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY")
            .map_err(|_| SearchError::Config("GOOGLE_API_KEY not set".into()))?;
        let engine_id = std::env::var("GOOGLE_CSE_ID")
            .map_err(|_| SearchError::Config("GOOGLE_CSE_ID not set".into()))?;
        Ok(Self::new(SearchCredentials::new(api_key, engine_id)))
    }

    /// Set a custom endpoint (for proxies).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    link: Option<String>,
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    async fn search(&self, query: &str) -> SearchResult<Vec<SearchCandidate>> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[
                ("key", self.credentials.api_key.expose()),
                ("cx", self.credentials.engine_id.as_str()),
                ("q", query),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Http(Box::new(e)))?;

        let status = response.status().as_u16();
        if matches!(status, 403 | 429) {
            warn!(status, query = %query, "Google API rate limit exceeded");
            return Err(SearchError::RateLimited { status });
        }
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Api(format!("HTTP {}: {}", status, body)));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Api(format!("unreadable response: {}", e)))?;

        let candidates = into_candidates(body);
        debug!(query = %query, results = candidates.len(), "Google search");
        Ok(candidates)
    }

    fn name(&self) -> &str {
        "google"
    }
}

fn into_candidates(body: SearchResponse) -> Vec<SearchCandidate> {
    body.items
        .into_iter()
        .filter_map(|item| item.link.map(|link| SearchCandidate::new(item.title, link)))
        .filter(|c| !c.link.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_without_items_is_empty() {
        let body: SearchResponse = serde_json::from_str(r#"{"kind":"customsearch#search"}"#).unwrap();
        assert!(into_candidates(body).is_empty());
    }

    #[test]
    fn test_items_keep_rank_order() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"items":[
                {"title":"Acme X100","link":"https://acme.com/x100"},
                {"title":"No link"},
                {"title":"Review","link":"https://reviews.com/x100"}
            ]}"#,
        )
        .unwrap();

        let candidates = into_candidates(body);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].link, "https://acme.com/x100");
        assert_eq!(candidates[1].title, "Review");
    }
}
