//! # Notes Chunker
//!
//! Heading-aware chunking of markdown notes for semantic retrieval.
//!
//! ## Pipeline
//!
//! ```text
//! Markdown document
//!     │
//!     ├──> Frontmatter (YAML) → title, tags, status
//!     │
//!     ├──> Heading split (levels 1-4, heading line kept)
//!     │
//!     ├──> Recursive size split
//!     │    ├─> ~800 chars per chunk, ~100 chars overlap
//!     │    └─> break at headings, then newlines, then spaces
//!     │
//!     └──> NoteChunk[] (order, sibling_count, chunk_key)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use notes_chunker::{Chunker, ChunkerConfig};
//!
//! let chunker = Chunker::new(ChunkerConfig::default()).unwrap();
//! let note = "---\ntitle: Tea\ntags: [drinks]\n---\n# Green\nSteep at 80C.\n";
//!
//! let chunks = chunker.chunk("notes/tea.md", note).unwrap();
//! assert_eq!(chunks[0].display_title, "Tea");
//! assert_eq!(chunks[0].text, "# Green\nSteep at 80C.");
//! ```

mod chunker;
mod config;
mod error;
mod frontmatter;
mod headings;
mod splitter;
mod types;

pub use chunker::{title_from_source_id, Chunker};
pub use config::ChunkerConfig;
pub use error::{ChunkerError, Result};
pub use frontmatter::{parse_frontmatter, Frontmatter};
pub use headings::{split_by_headings, Segment};
pub use splitter::RecursiveSplitter;
pub use types::{NoteChunk, SourceDocument};
