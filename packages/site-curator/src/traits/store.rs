//! Response cache trait.

use async_trait::async_trait;

use crate::error::CacheResult;

/// Persistent key-value cache shared by concurrent row tasks.
///
/// Entries are never invalidated: once a key is written its value is treated
/// as ground truth for the rest of the run and for later runs. Two tasks may
/// race to write the same key; implementations must keep the entry whole and
/// may let the last writer win.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Read an entry.
    async fn get(&self, namespace: &str, key: &str) -> CacheResult<Option<String>>;

    /// Write an entry.
    async fn put(&self, namespace: &str, key: &str, value: &str) -> CacheResult<()>;
}

/// Cache namespaces used by the engine.
pub mod namespace {
    /// Raw HTML keyed by canonical URL
    pub const PAGES: &str = "pages";

    /// Requested URL to canonical URL
    pub const ALIASES: &str = "aliases";

    /// Serialized successful search results keyed by query string
    pub const SEARCH: &str = "search";

    /// Prefix for raw oracle answers, one namespace per query kind
    pub const ORACLE_PREFIX: &str = "oracle";
}
