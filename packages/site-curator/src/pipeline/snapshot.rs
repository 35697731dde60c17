//! Page snapshots for a finished dataset.
//!
//! For each brand the first URL that loads is saved as raw HTML and as
//! visible text, named after the row index.

use futures::stream::{self, StreamExt};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{DatasetError, DatasetResult};
use crate::pipeline::PageLoader;
use crate::types::{DatasetRow, PageContent};

/// Counts from a snapshot run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    pub brands: usize,
    pub saved: usize,
}

/// Save one page per brand under `out_dir/pages` and `out_dir/content`.
///
/// Both directories are emptied first.
pub async fn snapshot_pages(
    loader: &PageLoader,
    rows: &[DatasetRow],
    out_dir: &Path,
    concurrency: usize,
) -> DatasetResult<SnapshotReport> {
    let pages_dir = out_dir.join("pages");
    let content_dir = out_dir.join("content");
    for dir in [&pages_dir, &content_dir] {
        if tokio::fs::try_exists(dir).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(dir)
                .await
                .map_err(|e| DatasetError::io(dir, e))?;
        }
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| DatasetError::io(dir, e))?;
    }

    let groups = group_by_brand(rows);
    let brands = groups.len();
    info!(brands, rows = rows.len(), "Snapshotting pages");

    let mut pages = stream::iter(groups.into_iter().map(|group| first_loadable(loader, group)))
        .buffer_unordered(concurrency.max(1));

    let mut saved = 0;
    while let Some(result) = pages.next().await {
        let Some((index, page)) = result else {
            continue;
        };

        let html_path = pages_dir.join(format!("{}.html", index));
        tokio::fs::write(&html_path, &page.raw_html)
            .await
            .map_err(|e| DatasetError::io(&html_path, e))?;

        let text_path = content_dir.join(format!("{}.txt", index));
        tokio::fs::write(&text_path, &page.visible_text)
            .await
            .map_err(|e| DatasetError::io(&text_path, e))?;

        saved += 1;
    }

    info!(brands, saved, "Snapshot complete");
    Ok(SnapshotReport { brands, saved })
}

async fn first_loadable(loader: &PageLoader, group: Vec<&DatasetRow>) -> Option<(usize, PageContent)> {
    for row in group {
        let Some(url) = row.url.as_deref() else {
            continue;
        };
        match loader.load(url).await {
            Ok(page) => return Some((row.index, page)),
            Err(e) => warn!(row = row.index, url = %url, error = %e, "Failed to fetch"),
        }
    }
    None
}

/// Rows grouped by brand, groups in order of first appearance.
fn group_by_brand(rows: &[DatasetRow]) -> Vec<Vec<&DatasetRow>> {
    let mut groups: Vec<Vec<&DatasetRow>> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|g| g[0].brand == row.brand) {
            Some(group) => group.push(row),
            None => groups.push(vec![row]),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryCache;
    use crate::testing::MockFetcher;
    use crate::types::FetchedPage;
    use std::sync::Arc;

    fn row(index: usize, brand: &str, url: &str) -> DatasetRow {
        DatasetRow::new(index, "blender", brand, "M", Some(url.into()))
    }

    #[tokio::test]
    async fn test_first_loadable_page_per_brand() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pages")).unwrap();
        std::fs::write(dir.path().join("pages/stale.html"), "old").unwrap();

        let fetcher = MockFetcher::new()
            .with_page(FetchedPage::new("https://acme.com/b", "https://acme.com/b", "<p>Acme B</p>"))
            .with_page(FetchedPage::new("https://zeta.com/a", "https://zeta.com/a", "<p>Zeta A</p>"))
            .with_page(FetchedPage::new("https://zeta.com/b", "https://zeta.com/b", "<p>Zeta B</p>"));
        let loader = PageLoader::new(Arc::new(fetcher), Arc::new(MemoryCache::new()));

        let rows = vec![
            row(0, "Acme", "https://acme.com/a"),
            row(1, "Zeta", "https://zeta.com/a"),
            row(2, "Acme", "https://acme.com/b"),
            row(3, "Zeta", "https://zeta.com/b"),
            row(4, "Nobody", "https://nobody.com/x"),
        ];

        let report = snapshot_pages(&loader, &rows, dir.path(), 2).await.unwrap();

        assert_eq!(report, SnapshotReport { brands: 3, saved: 2 });
        assert!(!dir.path().join("pages/stale.html").exists());
        assert!(dir.path().join("pages/1.html").exists());
        assert!(dir.path().join("pages/2.html").exists());
        assert!(!dir.path().join("pages/3.html").exists());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("content/2.txt")).unwrap(),
            "Acme B"
        );
    }
}
