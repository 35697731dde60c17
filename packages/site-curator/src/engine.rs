//! Engine assembly.

use std::sync::Arc;

use crate::pipeline::{
    DatasetReconciler, ModelNamer, OracleClient, PageClassifier, PageLoader, SearchResolver,
};
use crate::traits::{
    fetcher::PageFetcher, oracle::Oracle, searcher::SearchProvider, store::ResponseCache,
};
use crate::types::CuratorConfig;

/// All engine components wired to one set of collaborators.
///
/// # Example
///
/// ```rust,ignore
/// use site_curator::{Curator, CuratorConfig, FileCache};
///
/// let curator = Curator::new(fetcher, oracle, search, Arc::new(FileCache::new(".curator-cache")), CuratorConfig::default());
/// let result = curator.reconciler().reconcile(rows, 6).await?;
/// ```
#[derive(Clone)]
pub struct Curator {
    config: Arc<CuratorConfig>,
    loader: PageLoader,
    oracle: OracleClient,
    resolver: SearchResolver,
    reconciler: DatasetReconciler,
}

impl Curator {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        oracle: Arc<dyn Oracle>,
        search: Arc<dyn SearchProvider>,
        cache: Arc<dyn ResponseCache>,
        config: CuratorConfig,
    ) -> Self {
        let config = Arc::new(config);
        let loader = PageLoader::new(fetcher, cache.clone());
        let oracle = OracleClient::new(oracle, cache.clone(), config.retry, config.max_prompt_chars);
        let classifier = PageClassifier::new(loader.clone(), oracle.clone(), config.clone());
        let resolver = SearchResolver::new(classifier, search, cache, config.clone());
        let reconciler = DatasetReconciler::new(resolver.clone());

        Self {
            config,
            loader,
            oracle,
            resolver,
            reconciler,
        }
    }

    pub fn config(&self) -> &CuratorConfig {
        &self.config
    }

    pub fn loader(&self) -> &PageLoader {
        &self.loader
    }

    pub fn classifier(&self) -> &PageClassifier {
        self.resolver.classifier()
    }

    pub fn resolver(&self) -> &SearchResolver {
        &self.resolver
    }

    pub fn reconciler(&self) -> &DatasetReconciler {
        &self.reconciler
    }

    /// Model-name refresher sharing this engine's loader and oracle.
    pub fn namer(&self) -> ModelNamer {
        ModelNamer::new(self.loader.clone(), self.oracle.clone())
    }
}
