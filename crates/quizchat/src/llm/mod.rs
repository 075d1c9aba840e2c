//! Persona chat: roster lookup and provider dispatch.

mod error;
mod ollama;
mod openai;
mod provider;
mod registry;
mod router;
mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use error::{DispatchError, LLMError, RegistryError, ValidationError};
pub use ollama::OllamaProvider;
pub use openai::OpenAICompatibleProvider;
pub use provider::LLMProvider;
pub use registry::PersonaRegistry;
pub use router::Dispatcher;
pub use types::{ChatRequest, ChatResult, Message, ProviderEntry, ProviderKind, Role};
