//! The classification and resolution engine.
//!
//! Components, leaves first:
//! - [`OracleClient`] - cached, retried oracle calls with typed verdicts
//! - [`PageLoader`] - redirect-aware page loading with an HTML cache
//! - [`PageClassifier`] - the per-page decision procedure
//! - [`SearchResolver`] - search, verify, and follow catalog pages
//! - [`DatasetReconciler`] - concurrent reconciliation of a whole dataset
//!
//! [`ModelNamer`] and [`snapshot_pages`] reuse the loader and oracle for the
//! model-name refresh and page snapshot runs.

pub mod classify;
pub mod loader;
pub mod oracle;
pub mod prompts;
pub mod reconcile;
pub mod rename;
pub mod resolve;
pub mod snapshot;

pub use classify::PageClassifier;
pub use loader::PageLoader;
pub use oracle::OracleClient;
pub use reconcile::{DatasetReconciler, Reconciliation};
pub use rename::ModelNamer;
pub use resolve::SearchResolver;
pub use snapshot::{snapshot_pages, SnapshotReport};
