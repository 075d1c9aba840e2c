//! LLM provider trait.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::error::LLMError;

/// A transport for one provider kind's wire format.
///
/// Implementations build the provider-specific payload, perform a single
/// round trip and return the extracted completion text.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, LLMError>;
}

/// Turn a provider response into `T`, mapping non-2xx statuses to `LLMError::Api`.
pub(super) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, LLMError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(LLMError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
