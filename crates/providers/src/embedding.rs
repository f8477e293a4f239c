use crate::config::ProviderSettings;
use crate::error::{ProviderError, Result};
use crate::http::JsonEndpoint;
use async_trait::async_trait;
use notes_vector_store::{EmbeddingGateway, VectorStoreError};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

/// Parse an OpenAI-style `/embeddings` reply holding `expected` vectors.
///
/// Items are put back in input order when the reply carries `index` fields.
pub fn parse_embedding_response(body: &str, expected: usize) -> Result<Vec<Vec<f32>>> {
    let mut response: EmbeddingResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("embeddings: {e}")))?;

    if response.data.len() != expected {
        return Err(ProviderError::InvalidResponse(format!(
            "expected {expected} embeddings, got {}",
            response.data.len()
        )));
    }
    if response.data.iter().all(|item| item.index.is_some()) {
        response.data.sort_by_key(|item| item.index);
    }
    Ok(response.data.into_iter().map(|item| item.embedding).collect())
}

/// Embedding gateway for OpenAI-compatible `/embeddings` endpoints
pub struct HttpEmbeddingGateway {
    endpoint: JsonEndpoint,
    model: String,
}

impl HttpEmbeddingGateway {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let endpoint = JsonEndpoint::new(settings, "embeddings")?;
        log::debug!(
            "Embedding gateway: {} ({})",
            endpoint.url(),
            settings.model
        );
        Ok(Self {
            endpoint,
            model: settings.model.clone(),
        })
    }

    pub async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = self
            .endpoint
            .post(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .await?;
        parse_embedding_response(&body, texts.len())
    }
}

#[async_trait]
impl EmbeddingGateway for HttpEmbeddingGateway {
    async fn embed(&self, texts: &[String]) -> notes_vector_store::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts)
            .await
            .map_err(|e| VectorStoreError::embedding(e.to_string()))
    }
}
