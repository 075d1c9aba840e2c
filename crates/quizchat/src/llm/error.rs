//! LLM error types.

use thiserror::Error;

use super::types::ProviderKind;

/// Errors that can occur when making LLM API calls.
#[derive(Debug, Error)]
pub enum LLMError {
    /// HTTP request failed (connect, timeout, body read)
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned a non-2xx response
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body was not the JSON we expected
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Response parsed, but the text payload was absent
    #[error("response is missing field '{0}'")]
    MissingField(&'static str),
}

/// Why a chat could not be dispatched or completed.
///
/// Rendered into the error side of a [`ChatResult`](super::ChatResult) and
/// never surfaced to callers as a Rust error.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("No model for {0}")]
    UnknownNickname(String),

    #[error("Provider {kind} is not configured: {env} is not set")]
    NotConfigured { kind: ProviderKind, env: String },

    #[error("Unknown provider: {0}")]
    UnknownProvider(ProviderKind),

    #[error(transparent)]
    Transport(#[from] LLMError),
}

/// A chat request rejected before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("nickname must not be empty")]
    EmptyNickname,

    #[error("prompt must not be empty")]
    EmptyPrompt,
}

/// Invalid persona roster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("persona nickname must not be empty")]
    EmptyNickname,

    #[error("persona '{0}' has an empty model id")]
    EmptyModel(String),

    #[error("persona '{0}' is defined more than once")]
    Duplicate(String),
}
