//! Model-name refresh from page titles.

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::pipeline::{OracleClient, PageLoader};
use crate::types::{DatasetRow, ModelNameVerdict};

/// Replaces model names with the name the product page itself uses.
#[derive(Clone)]
pub struct ModelNamer {
    loader: PageLoader,
    oracle: OracleClient,
}

impl ModelNamer {
    pub fn new(loader: PageLoader, oracle: OracleClient) -> Self {
        Self { loader, oracle }
    }

    /// Refresh the model of every row.
    ///
    /// Rows keep their model when the page cannot be loaded, has no title, the
    /// oracle finds the title uninformative, or the oracle call fails. The
    /// returned rows are in input order.
    pub async fn refresh(&self, rows: Vec<DatasetRow>, concurrency: usize) -> Vec<DatasetRow> {
        info!(rows = rows.len(), concurrency, "Refreshing model names");

        let mut renamed: Vec<DatasetRow> = stream::iter(rows.into_iter().map(|row| async move {
            match self.refreshed_model(&row).await {
                Some(model) => DatasetRow { model, ..row },
                None => row,
            }
        }))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

        renamed.sort_by_key(|r| r.index);
        renamed
    }

    async fn refreshed_model(&self, row: &DatasetRow) -> Option<String> {
        let url = row.url.as_deref()?;

        let page = match self.loader.load(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(row = row.index, url = %url, error = %e, "Failed to fetch page");
                return None;
            }
        };

        let Some(title) = page.title.as_deref().map(clean_title) else {
            warn!(row = row.index, url = %page.canonical_url, "Page has no title");
            return None;
        };
        debug!(row = row.index, title = %title, "Page title");

        let verdict = self
            .oracle
            .update_model_name(&row.product, &row.brand, &row.model, &title, &page.canonical_url)
            .await;

        match verdict {
            Ok(ModelNameVerdict::Named(model)) => {
                info!(row = row.index, from = %row.model, to = %model, "Model renamed");
                Some(model)
            }
            Ok(ModelNameVerdict::Uninformative) => None,
            Err(e) => {
                warn!(row = row.index, error = %e, "Model name lookup failed");
                None
            }
        }
    }
}

/// Replace dashes, pipes and line breaks with spaces and collapse whitespace.
pub fn clean_title(title: &str) -> String {
    title
        .trim()
        .replace(['\n', '\u{2014}', '\u{2013}', '|', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
