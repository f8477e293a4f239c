//! # Notes Retrieval
//!
//! Query-time selection over a [`notes_vector_store::NoteVectorStore`]:
//! semantic top-k search, candidate pools, and note pairing for
//! concept collision.

mod error;
mod pairing;
mod pools;
mod selector;

pub use error::{Result, RetrievalError};
pub use pairing::{pick_pair, PairMode};
pub use pools::{file_level_pool, shorter_pool, DEFAULT_SHORTER_CAP, LENGTH_RATIO, MIN_ENTRIES};
pub use selector::{NotePair, RetrievalSelector};
