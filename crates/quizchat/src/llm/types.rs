//! Common types for persona chat dispatch.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// The backend family serving a persona's model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Locally hosted inference server (Ollama `/api/generate`).
    #[serde(alias = "ollama", alias = "local")]
    LocalInference,
    /// Cloud chat-completions API (OpenAI-compatible).
    #[serde(alias = "openai", alias = "cloud")]
    CloudCompletion,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::LocalInference => "local_inference",
            ProviderKind::CloudCompletion => "cloud_completion",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the persona roster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderEntry {
    pub nickname: String,
    #[serde(rename = "model", alias = "model_id")]
    pub model_id: String,
    #[serde(rename = "provider", alias = "provider_kind")]
    pub provider_kind: ProviderKind,
}

impl ProviderEntry {
    pub fn new(
        nickname: impl Into<String>,
        model_id: impl Into<String>,
        provider_kind: ProviderKind,
    ) -> Self {
        Self {
            nickname: nickname.into(),
            model_id: model_id.into(),
            provider_kind,
        }
    }
}

/// A validated chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub nickname: String,
    pub prompt: String,
}

impl ChatRequest {
    /// Both fields must contain something other than whitespace.
    pub fn new(nickname: &str, prompt: &str) -> Result<Self, ValidationError> {
        if nickname.trim().is_empty() {
            return Err(ValidationError::EmptyNickname);
        }
        if prompt.trim().is_empty() {
            return Err(ValidationError::EmptyPrompt);
        }
        Ok(Self {
            nickname: nickname.to_string(),
            prompt: prompt.to_string(),
        })
    }
}

/// Uniform outcome of a chat, whichever provider handled it.
///
/// Serializes as `{"response": "..."}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatResult {
    Response(String),
    Error(String),
}

impl ChatResult {
    pub fn is_error(&self) -> bool {
        matches!(self, ChatResult::Error(_))
    }
}

/// A message in a chat-completions conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// The role of a message sender.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}
