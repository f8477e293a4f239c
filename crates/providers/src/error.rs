use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("No API key configured for provider '{provider}' (set <PROVIDER>_API_KEY or LLM_API_KEY)")]
    MissingApiKey { provider: String },

    #[error("No model configured for provider '{provider}'")]
    MissingModel { provider: String },

    #[error("Unknown provider '{0}' (expected one of: openai, deepseek, qwen, bigmodel)")]
    UnknownProvider(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}
