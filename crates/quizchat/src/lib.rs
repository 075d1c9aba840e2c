//! quizchat - quiz backend that routes persona chats to local or cloud LLM providers.

pub mod config;
pub mod handlers;
pub mod llm;
pub mod response;
pub mod server;
pub mod store;
