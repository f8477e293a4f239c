//! # Notes Indexer
//!
//! Keeps a note index in sync with a directory of markdown files.
//!
//! ## Pipeline
//!
//! ```text
//! Notes root
//!     │
//!     ├──> NoteScanner (.gitignore aware, glob + publish filter)
//!     │      └─> SourceDocument { source_id: relative path, content }
//!     │
//!     ├──> index.lock (one writer process at a time)
//!     │
//!     └──> NoteVectorStore (chunk, embed, persist)
//!            └─> Searchable index
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use notes_indexer::{NoteIndexer, ScanOptions};
//! use notes_vector_store::{IndexPaths, NoteVectorStore, StoreConfig, StubEmbedder};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let root = Path::new("/path/to/notes");
//!     let store = NoteVectorStore::open(
//!         IndexPaths::for_notes_root(root),
//!         Arc::new(StubEmbedder::default()),
//!         StoreConfig::default(),
//!     )
//!     .await?;
//!     let indexer = NoteIndexer::new(root, ScanOptions::default(), Arc::new(store))?;
//!     let stats = indexer.index_full().await?;
//!
//!     println!("Indexed {} notes, {} chunks", stats.files, stats.chunks);
//!     Ok(())
//! }
//! ```

mod error;
mod index_lock;
mod indexer;
mod scanner;
mod stats;

pub use error::{IndexerError, Result};
pub use indexer::NoteIndexer;
pub use scanner::{NoteScanner, NoteStatus, ScanOptions, DEFAULT_FILE_GLOB};
pub use stats::IndexStats;
