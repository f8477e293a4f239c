//! # Notes Vector Store
//!
//! Vector storage and similarity search for note chunks.
//!
//! ## Features
//!
//! - **Pluggable embeddings** via the [`EmbeddingGateway`] trait
//! - **Batch embedding** with per-item fallback when a batch is rejected
//! - **Cosine search** as inner product over L2-normalized vectors
//! - **Incremental updates**: whole documents are replaced by source id
//! - **Persistent storage**: binary vectors + JSON metadata, loaded together
//!
//! ## Architecture
//!
//! ```text
//! SourceDocument[]
//!     │
//!     ├──> Chunker (notes-chunker)
//!     │      └─> NoteChunk[]
//!     │
//!     ├──> EmbeddingGateway (batches of 64)
//!     │      └─> Vec<f32> per chunk
//!     │
//!     ├──> IndexSnapshot { entries, FlatIpIndex }
//!     │      └─> swapped in only after it is saved
//!     │
//!     └──> notes.index + notes_meta.json
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use notes_vector_store::{IndexPaths, NoteVectorStore, StoreConfig, StubEmbedder};
//! use notes_chunker::SourceDocument;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = NoteVectorStore::open(
//!         IndexPaths::new(".notes-index"),
//!         Arc::new(StubEmbedder::default()),
//!         StoreConfig::default(),
//!     )
//!     .await?;
//!
//!     store.rebuild(&[SourceDocument::new("tea.md", "# Tea\nGreen tea at 80C.")]).await;
//!
//!     for hit in store.search("green tea", 5).await? {
//!         println!("{}: {:.3}", hit.source_id, hit.score);
//!     }
//!     Ok(())
//! }
//! ```

mod batching;
mod embeddings;
mod error;
mod flat_index;
mod paths;
mod snapshot;
mod store;
mod types;

pub use batching::{embed_in_batches, BatchPolicy};
pub use embeddings::{
    cosine_similarity, normalize_in_place, normalized, EmbeddingGateway, StubEmbedder,
    NORM_EPSILON,
};
pub use error::{Result, VectorStoreError};
pub use flat_index::FlatIpIndex;
pub use paths::{IndexPaths, INDEX_DIR_NAME, METADATA_FILE_NAME, VECTORS_FILE_NAME};
pub use snapshot::IndexSnapshot;
pub use store::{NoteVectorStore, StoreConfig};
pub use types::{IndexEntry, SearchHit};

// Re-export chunker types for convenience
pub use notes_chunker::{NoteChunk, SourceDocument};
