//! # Notes Providers
//!
//! Environment-driven provider configuration and HTTP gateways for
//! OpenAI-compatible APIs (openai, deepseek, qwen, bigmodel).
//!
//! - [`HttpEmbeddingGateway`] implements `notes_vector_store::EmbeddingGateway`
//! - [`HttpChatGateway`] implements `notes_rag::CompletionGateway`
//!
//! Settings fail fast: a missing API key, a missing model or an unknown
//! provider is reported when the gateway is configured, not on first use.

mod chat;
mod config;
mod embedding;
mod error;
mod http;

pub use chat::{parse_chat_response, ChatOptions, HttpChatGateway};
pub use config::{
    provider_defaults, ProviderDefaults, ProviderSettings, DEFAULT_CHAT_PROVIDER,
    DEFAULT_EMBEDDING_PROVIDER, HTTP_TIMEOUT, KNOWN_PROVIDERS,
};
pub use embedding::{parse_embedding_response, HttpEmbeddingGateway};
pub use error::{ProviderError, Result};
