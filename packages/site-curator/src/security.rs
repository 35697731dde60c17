//! API credentials for the oracle and search backends.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

const REDACTED: &str = "[REDACTED]";

/// An API key that formats as `[REDACTED]`.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(value.into().into_boxed_str()))
    }

    /// The key itself, for request headers and query strings only.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// Credentials for the chat-completions oracle.
#[derive(Clone)]
pub struct OracleCredentials {
    pub api_key: SecretString,

    /// Model identifier
    pub model: String,

    /// API base URL override
    pub base_url: Option<String>,
}

impl OracleCredentials {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key),
            model: model.into(),
            base_url: None,
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}

impl fmt::Debug for OracleCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleCredentials")
            .field("api_key", &self.api_key)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Credentials for the custom search engine.
#[derive(Clone)]
pub struct SearchCredentials {
    pub api_key: SecretString,

    /// Search engine id (`cx`)
    pub engine_id: String,
}

impl SearchCredentials {
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key),
            engine_id: engine_id.into(),
        }
    }
}

impl fmt::Debug for SearchCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchCredentials")
            .field("api_key", &self.api_key)
            .field("engine_id", &self.engine_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_not_in_debug_or_display() {
        let secret = SecretString::new("sk-super-secret-key");
        assert!(!format!("{:?}", secret).contains("sk-super"));
        assert_eq!(format!("{}", secret), "[REDACTED]");
        assert_eq!(secret.expose(), "sk-super-secret-key");
    }

    #[test]
    fn test_credentials_debug_redacts_keys() {
        let oracle = OracleCredentials::new("sk-secret", "gpt-3.5-turbo");
        let debug = format!("{:?}", oracle);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("gpt-3.5-turbo"));

        let search = SearchCredentials::new("AIza-secret", "cx123");
        let debug = format!("{:?}", search);
        assert!(!debug.contains("AIza-secret"));
        assert!(debug.contains("cx123"));
    }
}
