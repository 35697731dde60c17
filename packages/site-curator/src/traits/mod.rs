//! Collaborator trait abstractions.
//!
//! The engine talks to the outside world only through these traits, so
//! applications and tests can swap in their own fetchers, oracles, search
//! providers and caches.

pub mod fetcher;
pub mod oracle;
pub mod searcher;
pub mod store;
