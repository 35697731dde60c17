//! Concrete collaborator backends.
//!
//! - `HttpFetcher` - reqwest page fetching with redirects
//! - `OpenAIOracle` - chat-completions oracle
//! - `GoogleSearch` - Custom Search JSON API

pub mod google;
pub mod http;
pub mod openai;

pub use google::GoogleSearch;
pub use http::HttpFetcher;
pub use openai::OpenAIOracle;
