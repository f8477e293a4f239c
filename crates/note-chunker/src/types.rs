use serde::{Deserialize, Serialize};

/// A bounded span of a note, the atomic unit of the vector index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteChunk {
    /// Chunk body (never empty after trimming)
    pub text: String,

    /// Stable identifier of the originating document (its path)
    pub source_id: String,

    /// Frontmatter title, or the file stem of `source_id`
    pub display_title: String,

    /// Zero-based position within the document's chunk sequence
    pub order: usize,

    /// Total chunks produced from the same document
    pub sibling_count: usize,

    /// Tags carried over from the document frontmatter
    #[serde(default)]
    pub tags: Vec<String>,

    /// Process-unique key, assigned at creation time
    pub chunk_key: String,

    /// Heading trail (h1..hN) in force where the chunk starts
    #[serde(default)]
    pub headings: Vec<String>,
}

impl NoteChunk {
    /// Number of characters in the chunk body
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether this is the first chunk of its document
    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.order == 0
    }

    /// Whether this is the last chunk of its document
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.order + 1 == self.sibling_count
    }
}

/// A raw document handed to the chunker by a content provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceDocument {
    pub source_id: String,
    pub content: String,
}

impl SourceDocument {
    pub fn new(source_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            content: content.into(),
        }
    }
}
