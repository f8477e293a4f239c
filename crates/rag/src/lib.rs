//! # Notes RAG
//!
//! LLM-facing features built on [`notes_retrieval`]:
//!
//! - [`RagPipeline`]: answer a question from the top-k note chunks, with
//!   citations
//! - [`ConceptCollider`]: pick two notes and ask for a synthesized idea
//!
//! Models are reached through the [`CompletionGateway`] trait; HTTP
//! implementations live in `notes-providers`.

mod collision;
mod error;
mod llm;
mod pipeline;
pub mod prompt;

pub use collision::{CollisionResult, ConceptCollider, Idea, IdeaDraft, SourceNote};
pub use error::{RagError, Result};
pub use llm::{ChatMessage, CompletionGateway, Role};
pub use pipeline::{Citation, RagAnswer, RagPipeline};
