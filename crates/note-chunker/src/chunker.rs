use crate::config::ChunkerConfig;
use crate::error::{ChunkerError, Result};
use crate::frontmatter::parse_frontmatter;
use crate::headings::{split_by_headings, Segment};
use crate::splitter::RecursiveSplitter;
use crate::types::{NoteChunk, SourceDocument};
use std::path::Path;
use uuid::Uuid;

/// Main chunker interface for markdown notes
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a new chunker, rejecting invalid configuration
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk a document from a content provider
    pub fn chunk_document(&self, document: &SourceDocument) -> Result<Vec<NoteChunk>> {
        self.chunk(&document.source_id, &document.content)
    }

    /// Split one markdown document into ordered chunks.
    ///
    /// The frontmatter block is parsed for title/tags and removed from the
    /// body. The body is cut at headings (levels 1..=`max_heading_level`),
    /// each segment is split by size, and every surviving chunk receives the
    /// same document metadata. `order`/`sibling_count` number the chunks of
    /// one heading segment.
    pub fn chunk(&self, source_id: &str, content: &str) -> Result<Vec<NoteChunk>> {
        if source_id.trim().is_empty() {
            return Err(ChunkerError::EmptySourceId);
        }

        let (frontmatter, body) = parse_frontmatter(content);
        let display_title = frontmatter
            .title
            .clone()
            .unwrap_or_else(|| title_from_source_id(source_id));

        let mut chunks: Vec<NoteChunk> = Vec::new();
        for segment in split_by_headings(body, self.config.max_heading_level) {
            let pieces: Vec<String> = self
                .split_segment(&segment)
                .into_iter()
                .filter(|text| !text.trim().is_empty())
                .collect();
            let sibling_count = pieces.len();
            chunks.extend(pieces.into_iter().enumerate().map(|(order, text)| NoteChunk {
                text,
                source_id: source_id.to_string(),
                display_title: display_title.clone(),
                order,
                sibling_count,
                tags: frontmatter.tags.clone(),
                chunk_key: Uuid::new_v4().to_string(),
                headings: segment.headings.clone(),
            }));
        }

        log::debug!("Chunked {source_id} into {} chunks", chunks.len());
        Ok(chunks)
    }

    /// Size-split one segment. A heading line is never left as a chunk of
    /// its own: when the body after it is too long to share a chunk, the body
    /// is split with room reserved for the heading, which then leads the
    /// first piece.
    fn split_segment(&self, segment: &Segment<'_>) -> Vec<String> {
        let config = &self.config;
        let pieces = RecursiveSplitter::new(config.chunk_size, config.chunk_overlap, &config.separators)
            .split(segment.text);
        if segment.headings.is_empty() || pieces.len() < 2 {
            return pieces;
        }

        let Some((heading_line, body)) = segment.text.split_once('\n') else {
            return pieces;
        };
        let heading_line = heading_line.trim();
        if !heading_line.starts_with('#') || pieces[0] != heading_line {
            return pieces;
        }

        let reserved = heading_line.chars().count() + 1;
        if reserved + config.chunk_overlap >= config.chunk_size {
            return pieces;
        }
        let mut body_pieces = RecursiveSplitter::new(
            config.chunk_size - reserved,
            config.chunk_overlap,
            &config.separators,
        )
        .split(body);
        match body_pieces.first_mut() {
            Some(first) => *first = format!("{heading_line}\n{first}"),
            None => return pieces,
        }
        body_pieces
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            config: ChunkerConfig::default(),
        }
    }
}

/// File stem of a path-like source id, or the id itself
#[must_use]
pub fn title_from_source_id(source_id: &str) -> String {
    Path::new(source_id)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| source_id.to_string())
}
