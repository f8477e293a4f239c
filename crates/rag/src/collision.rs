use crate::error::Result;
use crate::llm::{ChatMessage, CompletionGateway};
use crate::prompt::{
    collision_user_prompt, title_or_untitled, truncate_with_ellipsis, COLLISION_NOTE_CHARS,
    COLLISION_SYSTEM_PROMPT,
};
use notes_retrieval::{PairMode, RetrievalSelector};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Structured idea returned by the model
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IdeaDraft {
    #[serde(default)]
    pub connection: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub outline: Vec<String>,
}

impl IdeaDraft {
    fn has_content(&self) -> bool {
        !self.title.trim().is_empty() || !self.connection.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Idea {
    /// Model reply that was not the requested JSON
    Raw { raw: String },
    Parsed(IdeaDraft),
}

impl Idea {
    /// Parse a model reply, accepting bare JSON, a fenced code block, or JSON
    /// embedded in surrounding prose. An object with neither a title nor a
    /// connection is not an idea and stays raw.
    #[must_use]
    pub fn parse(reply: &str) -> Self {
        let trimmed = reply.trim();
        let candidates = [Some(trimmed), strip_fence(trimmed), outer_object(trimmed)];
        for candidate in candidates.into_iter().flatten() {
            match serde_json::from_str::<IdeaDraft>(candidate) {
                Ok(draft) if draft.has_content() => return Self::Parsed(draft),
                Ok(_) => log::debug!("Collision reply JSON has no title or connection"),
                Err(_) => {}
            }
        }
        log::warn!("Collision reply is not an idea object; keeping raw text");
        Self::Raw {
            raw: reply.to_string(),
        }
    }
}

fn strip_fence(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("```")?;
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let body = rest.trim_end().strip_suffix("```")?;
    Some(body.trim())
}

fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceNote {
    pub title: String,
    pub source_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionResult {
    pub source_notes: [SourceNote; 2],
    pub idea: Idea,
    pub mode: PairMode,
}

/// Picks two notes and asks the model to synthesize an idea from them
pub struct ConceptCollider {
    retrieval: Arc<RetrievalSelector>,
    llm: Arc<dyn CompletionGateway>,
    hint: Option<String>,
}

impl ConceptCollider {
    pub fn new(retrieval: Arc<RetrievalSelector>, llm: Arc<dyn CompletionGateway>) -> Self {
        Self {
            retrieval,
            llm,
            hint: None,
        }
    }

    /// Extra angle appended to the user prompt
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub async fn collide<R: Rng + ?Sized>(
        &self,
        mode: PairMode,
        rng: &mut R,
    ) -> Result<CollisionResult> {
        let pair = self.retrieval.pick_pair(mode, rng)?;
        log::info!(
            "Colliding {} with {} ({mode})",
            pair.first.source_id,
            pair.second.source_id
        );

        let messages = [
            ChatMessage::system(COLLISION_SYSTEM_PROMPT),
            ChatMessage::user(collision_user_prompt(
                &truncate_with_ellipsis(&pair.first.text, COLLISION_NOTE_CHARS),
                &truncate_with_ellipsis(&pair.second.text, COLLISION_NOTE_CHARS),
                self.hint.as_deref(),
            )),
        ];
        let reply = self.llm.complete(&messages).await?;

        let note = |title: &str, source_id: &str| SourceNote {
            title: title_or_untitled(title).to_string(),
            source_id: source_id.to_string(),
        };
        Ok(CollisionResult {
            source_notes: [
                note(&pair.first.display_title, &pair.first.source_id),
                note(&pair.second.display_title, &pair.second.source_id),
            ],
            idea: Idea::parse(&reply),
            mode,
        })
    }
}
