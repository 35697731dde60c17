//! OpenAI chat-completions oracle.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{OracleError, OracleResult};
use crate::security::OracleCredentials;
use crate::traits::oracle::{Oracle, OracleRequest};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Oracle backed by the OpenAI chat-completions endpoint.
///
/// One request per call; the oracle client does caching and retries.
pub struct OpenAIOracle {
    http_client: reqwest::Client,
    credentials: OracleCredentials,
}

impl OpenAIOracle {
    pub fn new(credentials: OracleCredentials) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            credentials,
        }
    }

    /// Create from `OPENAI_API_KEY` and `OPENAI_MODEL` (default `gpt-3.5-turbo`).
    pub fn from_env() -> OracleResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| OracleError::Config("OPENAI_API_KEY not set".into()))?;
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".into());
        Ok(Self::new(OracleCredentials::new(api_key, model)))
    }

    fn base_url(&self) -> &str {
        self.credentials
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl Oracle for OpenAIOracle {
    async fn query(&self, request: &OracleRequest) -> OracleResult<String> {
        let start = std::time::Instant::now();
        let body = ChatRequest {
            model: &self.credentials.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url()))
            .header(
                "Authorization",
                format!("Bearer {}", self.credentials.api_key.expose()),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                OracleError::Transient(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, kind = %request.kind, "OpenAI API error");
            return Err(classify_failure(status.as_u16(), error_text));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Transient(format!("unreadable response: {}", e)))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OracleError::Transient("no choices in response".into()))?;

        debug!(
            kind = %request.kind,
            model = %self.credentials.model,
            duration_ms = start.elapsed().as_millis() as u64,
            "OpenAI chat completion"
        );

        Ok(content)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Map a non-success response onto the oracle error taxonomy.
fn classify_failure(status: u16, body: String) -> OracleError {
    if body.contains("context_length_exceeded") || body.contains("maximum context length") {
        return OracleError::ContextOverflow;
    }
    match status {
        401 | 403 => OracleError::Fatal(format!("HTTP {}: {}", status, body)),
        _ => OracleError::Transient(format!("HTTP {}: {}", status, body)),
    }
}
