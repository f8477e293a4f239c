use crate::error::{RagError, Result};
use crate::llm::{ChatMessage, CompletionGateway};
use crate::prompt::{context_block, snippet, system_prompt, title_or_untitled, SNIPPET_CHARS};
use notes_retrieval::RetrievalSelector;
use notes_vector_store::SearchHit;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Source reference attached to an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub source_id: String,
    pub snippet: String,
    pub tags: Vec<String>,
    pub score: f32,
}

impl Citation {
    fn from_hit(hit: &SearchHit) -> Self {
        Self {
            title: title_or_untitled(&hit.title).to_string(),
            source_id: hit.source_id.clone(),
            snippet: snippet(&hit.content, SNIPPET_CHARS),
            tags: hit.tags.clone(),
            score: hit.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagAnswer {
    pub answer: String,
    /// One per context item, whatever the model actually cited
    pub citations: Vec<Citation>,
    pub contexts: Vec<SearchHit>,
}

/// Retrieval-augmented question answering
pub struct RagPipeline {
    retrieval: Arc<RetrievalSelector>,
    llm: Arc<dyn CompletionGateway>,
    persona: Option<String>,
}

impl RagPipeline {
    pub fn new(retrieval: Arc<RetrievalSelector>, llm: Arc<dyn CompletionGateway>) -> Self {
        Self {
            retrieval,
            llm,
            persona: None,
        }
    }

    /// Replace the default assistant persona
    #[must_use]
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    pub async fn answer(&self, question: &str, k: usize) -> Result<RagAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::EmptyQuestion);
        }

        let contexts = match self.retrieval.semantic_top_k(question, k).await {
            Ok(hits) => hits,
            Err(err) => {
                log::warn!("Retrieval failed, answering without context: {err}");
                Vec::new()
            }
        };
        log::info!("Retrieved {} note excerpts for question", contexts.len());

        let messages = [
            ChatMessage::system(system_prompt(
                self.persona.as_deref(),
                &context_block(&contexts),
            )),
            ChatMessage::user(question),
        ];
        let answer = self.llm.complete(&messages).await?;

        Ok(RagAnswer {
            answer,
            citations: contexts.iter().map(Citation::from_hit).collect(),
            contexts,
        })
    }
}
