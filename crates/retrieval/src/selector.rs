use crate::error::Result;
use crate::pairing::{pick_pair, PairMode};
use crate::pools::DEFAULT_SHORTER_CAP;
use notes_chunker::NoteChunk;
use notes_vector_store::{NoteVectorStore, SearchHit};
use rand::Rng;
use std::sync::Arc;

/// Two notes chosen for concept collision
#[derive(Debug, Clone, PartialEq)]
pub struct NotePair {
    pub first: NoteChunk,
    pub second: NoteChunk,
    pub mode: PairMode,
}

/// Retrieval front end over a shared [`NoteVectorStore`]
pub struct RetrievalSelector {
    store: Arc<NoteVectorStore>,
    shorter_cap: usize,
}

impl RetrievalSelector {
    #[must_use]
    pub const fn new(store: Arc<NoteVectorStore>) -> Self {
        Self {
            store,
            shorter_cap: DEFAULT_SHORTER_CAP,
        }
    }

    /// Override the size of the shortest-first fallback pool
    #[must_use]
    pub const fn with_shorter_cap(mut self, cap: usize) -> Self {
        self.shorter_cap = cap;
        self
    }

    #[must_use]
    pub fn store(&self) -> &Arc<NoteVectorStore> {
        &self.store
    }

    /// Top-`k` chunks for `query`, best first
    pub async fn semantic_top_k(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        Ok(self.store.search(query, k).await?)
    }

    /// Choose two distinct indexed notes
    pub fn pick_pair<R: Rng + ?Sized>(&self, mode: PairMode, rng: &mut R) -> Result<NotePair> {
        let snapshot = self.store.snapshot();
        let entries = snapshot.entries();
        let (first, second) = pick_pair(entries, mode, self.shorter_cap, rng)?;
        log::debug!(
            "Picked {mode} pair: {} / {}",
            entries[first].source_id(),
            entries[second].source_id()
        );
        Ok(NotePair {
            first: entries[first].chunk.clone(),
            second: entries[second].chunk.clone(),
            mode,
        })
    }
}
