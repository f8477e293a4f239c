use notes_chunker::NoteChunk;
use serde::{Deserialize, Serialize};

/// A chunk together with its raw (non-normalized) embedding.
///
/// Serialized flat, so the metadata artifact holds objects of the form
/// `{text, source_id, display_title, order, sibling_count, tags, chunk_key,
/// headings, embedding}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    #[serde(flatten)]
    pub chunk: NoteChunk,
    pub embedding: Vec<f32>,
}

impl IndexEntry {
    #[must_use]
    pub const fn new(chunk: NoteChunk, embedding: Vec<f32>) -> Self {
        Self { chunk, embedding }
    }

    #[must_use]
    pub fn source_id(&self) -> &str {
        &self.chunk.source_id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.chunk.text
    }
}

/// One search result as exposed to callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub content: String,
    pub source_id: String,
    pub title: String,
    pub tags: Vec<String>,
    pub order: usize,
    pub sibling_count: usize,
    pub score: f32,
}

impl SearchHit {
    pub(crate) fn from_entry(entry: &IndexEntry, score: f32) -> Self {
        Self {
            content: entry.chunk.text.clone(),
            source_id: entry.chunk.source_id.clone(),
            title: entry.chunk.display_title.clone(),
            tags: entry.chunk.tags.clone(),
            order: entry.chunk.order,
            sibling_count: entry.chunk.sibling_count,
            score,
        }
    }
}
