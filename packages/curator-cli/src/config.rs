use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use site_curator::{
    Curator, CuratorConfig, FileCache, GoogleSearch, HttpFetcher, KeywordSet, OpenAIOracle,
    OracleClient, PageLoader, ResponseCache,
};

/// Runner configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    pub cache_dir: PathBuf,
    pub dataset_dir: PathBuf,
}

impl Settings {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        Self {
            cache_dir: env::var("CURATOR_CACHE_DIR")
                .unwrap_or_else(|_| ".curator-cache".to_string())
                .into(),
            dataset_dir: env::var("CURATOR_DATASET_DIR")
                .unwrap_or_else(|_| "dataset".to_string())
                .into(),
        }
    }

    pub fn cache(&self) -> Arc<dyn ResponseCache> {
        Arc::new(FileCache::new(&self.cache_dir))
    }

    /// Full engine: fetcher, oracle and search provider.
    pub fn curator(&self, config: CuratorConfig) -> Result<Curator> {
        let oracle = OpenAIOracle::from_env().context("OpenAI configuration")?;
        let search = GoogleSearch::from_env().context("Google search configuration")?;

        Ok(Curator::new(
            Arc::new(HttpFetcher::new()),
            Arc::new(oracle),
            Arc::new(search),
            self.cache(),
            config,
        ))
    }

    /// Page loader alone, for runs that never ask the oracle.
    pub fn loader(&self) -> PageLoader {
        PageLoader::new(Arc::new(HttpFetcher::new()), self.cache())
    }

    /// Page loader and oracle client sharing one cache, for runs without search.
    pub fn loader_and_oracle(&self, config: &CuratorConfig) -> Result<(PageLoader, OracleClient)> {
        let oracle = OpenAIOracle::from_env().context("OpenAI configuration")?;
        let cache = self.cache();

        Ok((
            PageLoader::new(Arc::new(HttpFetcher::new()), cache.clone()),
            OracleClient::new(
                Arc::new(oracle),
                cache,
                config.retry,
                config.max_prompt_chars,
            ),
        ))
    }
}

/// Engine configuration, with keyword lists optionally replaced from a JSON file.
pub fn curator_config(keywords: Option<&Path>) -> Result<CuratorConfig> {
    let config = CuratorConfig::default();
    let Some(path) = keywords else {
        return Ok(config);
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read keyword file {}", path.display()))?;
    let keywords: KeywordSet = serde_json::from_str(&text)
        .with_context(|| format!("Invalid keyword file {}", path.display()))?;

    tracing::info!(path = %path.display(), "Loaded keyword lists");
    Ok(config.with_keywords(keywords))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_without_keyword_file() {
        let config = curator_config(None).unwrap();
        assert_eq!(config.keywords, KeywordSet::default());
    }

    #[test]
    fn test_keyword_file_replaces_lists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keywords.json");
        std::fs::write(
            &path,
            r#"{
                "product_keywords": ["kaufen"],
                "discard_keywords": ["ebay."],
                "unavailable_keywords": ["nicht mehr erhaeltlich"],
                "marketplace_domains": []
            }"#,
        )
        .unwrap();

        let config = curator_config(Some(&path)).unwrap();
        assert_eq!(config.keywords.product_keywords, vec!["kaufen".to_string()]);
        assert!(config.keywords.marketplace_domains.is_empty());
    }

    #[test]
    fn test_invalid_keyword_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keywords.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(curator_config(Some(&path)).is_err());
    }
}
