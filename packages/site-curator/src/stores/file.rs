//! File-backed response cache.
//!
//! Layout: `<root>/<namespace>/<file name derived from key>`. Every entry is
//! its own file, so concurrent tasks writing different keys never touch the
//! same path.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::error::{CacheError, CacheResult};
use crate::traits::store::ResponseCache;

/// File names longer than this are truncated and suffixed with a digest.
const MAX_NAME_LEN: usize = 150;

/// Characters of the key kept in front of the digest.
const NAME_PREFIX_LEN: usize = 100;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Response cache persisted as one file per entry.
#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Create a cache rooted at `root`. Directories are created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this cache.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding an entry.
    pub fn entry_path(&self, namespace: &str, key: &str) -> PathBuf {
        let mut path = self.root.clone();
        for part in namespace.split('/').filter(|p| !p.is_empty()) {
            path.push(sanitize(part));
        }
        path.push(file_name(key));
        path
    }
}

#[async_trait]
impl ResponseCache for FileCache {
    async fn get(&self, namespace: &str, key: &str) -> CacheResult<Option<String>> {
        let path = self.entry_path(namespace, key);
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io(&path, e)),
        }
    }

    async fn put(&self, namespace: &str, key: &str, value: &str) -> CacheResult<()> {
        let path = self.entry_path(namespace, key);
        let Some(dir) = path.parent() else {
            return Ok(());
        };
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| CacheError::io(dir, e))?;

        // Write aside and rename so readers never see a partial entry.
        let temp = dir.join(format!(
            ".{}.{}.tmp",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        tokio::fs::write(&temp, value)
            .await
            .map_err(|e| CacheError::io(&temp, e))?;
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(CacheError::io(&path, e));
        }

        debug!(namespace = %namespace, path = %path.display(), "Cached entry");
        Ok(())
    }
}

/// Map a cache key onto a safe, unique file name.
///
/// Keys that are already safe and short are used verbatim. Anything else
/// keeps a readable prefix and gains a digest of the full key, so two keys
/// that sanitize or truncate to the same text still get different files.
fn file_name(key: &str) -> String {
    let clean = sanitize(key);
    if clean == key && clean.len() <= MAX_NAME_LEN && !clean.is_empty() {
        return clean;
    }

    let prefix: String = clean.chars().take(NAME_PREFIX_LEN).collect();
    let digest = Sha256::digest(key.as_bytes());
    let hex: String = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect();
    format!("{}-{}", prefix, hex)
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
            _ => '_',
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}
