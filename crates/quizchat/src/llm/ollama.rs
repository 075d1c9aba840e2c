//! Local inference provider (Ollama generate API).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::LLMError;
use super::provider::{LLMProvider, read_json};

/// Provider for a locally hosted Ollama server.
///
/// The server may run unauthenticated; when an API key is configured it is
/// sent as `Authorization: Bearer <key>`.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OllamaProvider {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:11434";

    #[must_use]
    pub fn new(client: Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl LLMProvider for OllamaProvider {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, LLMError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));

        let mut req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");

        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let response = req.json(&to_request(model, prompt)).send().await?;
        from_response(read_json(response).await?)
    }
}

// --- Ollama format types and conversions ---

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

fn to_request<'a>(model: &'a str, prompt: &'a str) -> GenerateRequest<'a> {
    GenerateRequest {
        model,
        prompt,
        stream: false,
    }
}

fn from_response(response: GenerateResponse) -> Result<String, LLMError> {
    response.response.ok_or(LLMError::MissingField("response"))
}
