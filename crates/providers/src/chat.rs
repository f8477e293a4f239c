use crate::config::ProviderSettings;
use crate::error::{ProviderError, Result};
use crate::http::JsonEndpoint;
use async_trait::async_trait;
use notes_rag::{ChatMessage, CompletionGateway, RagError};
use serde::{Deserialize, Serialize};

/// Sampling parameters sent with every completion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 800,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Text of the first choice of an OpenAI-style `/chat/completions` reply.
/// A null content is an empty answer.
pub fn parse_chat_response(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("chat completion: {e}")))?;
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or_else(|| ProviderError::InvalidResponse("no choices in reply".to_string()))
}

/// Completion gateway for OpenAI-compatible `/chat/completions` endpoints
pub struct HttpChatGateway {
    endpoint: JsonEndpoint,
    model: String,
    options: ChatOptions,
}

impl HttpChatGateway {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let endpoint = JsonEndpoint::new(settings, "chat/completions")?;
        log::debug!("Chat gateway: {} ({})", endpoint.url(), settings.model);
        Ok(Self {
            endpoint,
            model: settings.model.clone(),
            options: ChatOptions::default(),
        })
    }

    #[must_use]
    pub const fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn request(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = self
            .endpoint
            .post(&ChatRequest {
                model: &self.model,
                messages,
                temperature: self.options.temperature,
                max_tokens: self.options.max_tokens,
            })
            .await?;
        parse_chat_response(&body)
    }
}

#[async_trait]
impl CompletionGateway for HttpChatGateway {
    async fn complete(&self, messages: &[ChatMessage]) -> notes_rag::Result<String> {
        self.request(messages)
            .await
            .map_err(|e| RagError::completion(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_choice() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"hello"}},{"message":{"content":"other"}}]}"#;
        assert_eq!(parse_chat_response(body).unwrap(), "hello");
    }

    #[test]
    fn null_content_is_empty() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert_eq!(parse_chat_response(body).unwrap(), "");
    }

    #[test]
    fn missing_choices_is_invalid() {
        assert!(matches!(
            parse_chat_response(r#"{"choices":[]}"#),
            Err(ProviderError::InvalidResponse(_))
        ));
        assert!(parse_chat_response(r#"{"error":"quota"}"#).is_err());
    }
}
