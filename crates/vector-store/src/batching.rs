use crate::embeddings::EmbeddingGateway;
use crate::error::{Result, VectorStoreError};
use serde::{Deserialize, Serialize};

/// How texts are sent to an [`EmbeddingGateway`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPolicy {
    /// Maximum texts per gateway call
    pub max_batch: usize,

    /// Calls allowed per text once a multi-text batch has failed and the
    /// texts are retried one at a time. Also applies to single-text batches.
    pub item_attempts: usize,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            max_batch: 64,
            item_attempts: 1,
        }
    }
}

/// Embed `texts` in order, `policy.max_batch` at a time.
///
/// A failed batch with more than one text is retried text by text so one bad
/// input cannot sink its neighbours. A text that still fails after
/// `item_attempts` calls fails the whole call.
pub async fn embed_in_batches(
    gateway: &dyn EmbeddingGateway,
    texts: &[String],
    policy: &BatchPolicy,
) -> Result<Vec<Vec<f32>>> {
    let max_batch = policy.max_batch.max(1);
    let mut vectors = Vec::with_capacity(texts.len());

    for (batch_no, batch) in texts.chunks(max_batch).enumerate() {
        if batch.len() == 1 {
            vectors.push(embed_single(gateway, &batch[0], policy.item_attempts).await?);
            continue;
        }

        match embed_checked(gateway, batch).await {
            Ok(batch_vectors) => {
                log::debug!("Embedded batch {batch_no} ({} texts)", batch.len());
                vectors.extend(batch_vectors);
            }
            Err(err) => {
                log::warn!(
                    "Embedding batch {batch_no} ({} texts) failed: {err}; retrying per item",
                    batch.len()
                );
                for text in batch {
                    vectors.push(embed_single(gateway, text, policy.item_attempts).await?);
                }
            }
        }
    }

    Ok(vectors)
}

async fn embed_checked(gateway: &dyn EmbeddingGateway, batch: &[String]) -> Result<Vec<Vec<f32>>> {
    let vectors = gateway.embed(batch).await?;
    if vectors.len() != batch.len() {
        return Err(VectorStoreError::embedding(format!(
            "embedding size mismatch: got {} vectors for {} inputs",
            vectors.len(),
            batch.len()
        )));
    }
    Ok(vectors)
}

async fn embed_single(
    gateway: &dyn EmbeddingGateway,
    text: &str,
    attempts: usize,
) -> Result<Vec<f32>> {
    let single = [text.to_string()];
    let attempts = attempts.max(1);
    let mut last_err = None;

    for attempt in 1..=attempts {
        match embed_checked(gateway, &single).await {
            Ok(mut vectors) => {
                if let Some(vector) = vectors.pop() {
                    return Ok(vector);
                }
            }
            Err(err) => {
                log::debug!("Embedding single text failed (attempt {attempt}/{attempts}): {err}");
                last_err = Some(err);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| VectorStoreError::embedding("empty embedding result")))
}
