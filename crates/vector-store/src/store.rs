use crate::batching::{embed_in_batches, BatchPolicy};
use crate::embeddings::EmbeddingGateway;
use crate::error::{Result, VectorStoreError};
use crate::paths::IndexPaths;
use crate::snapshot::IndexSnapshot;
use crate::types::{IndexEntry, SearchHit};
use notes_chunker::{Chunker, ChunkerConfig, NoteChunk, SourceDocument};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;

/// Tunables for building the index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    pub chunker: ChunkerConfig,
    pub batch: BatchPolicy,
}

/// Persistent vector index over note chunks.
///
/// Readers work on the last fully built [`IndexSnapshot`]. Mutations build a
/// new snapshot off to the side, persist it, and only then swap it in, so a
/// failed build leaves both memory and disk untouched. Mutations are
/// serialized by an internal writer lock.
pub struct NoteVectorStore {
    paths: IndexPaths,
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingGateway>,
    batch: BatchPolicy,
    snapshot: RwLock<Arc<IndexSnapshot>>,
    writer: Mutex<()>,
}

impl NoteVectorStore {
    /// Open the store at `paths`, loading persisted artifacts when both are
    /// present and consistent. Anything else starts an empty store.
    pub async fn open(
        paths: IndexPaths,
        embedder: Arc<dyn EmbeddingGateway>,
        config: StoreConfig,
    ) -> Result<Self> {
        let chunker = Chunker::new(config.chunker)?;

        let snapshot = load_or_empty(&paths).await;

        Ok(Self {
            paths,
            chunker,
            embedder,
            batch: config.batch,
            snapshot: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(()),
        })
    }

    /// Re-read the persisted artifacts, replacing the in-memory snapshot.
    /// Another process may have written the index since this store was
    /// opened; callers holding the index lock use this to build on the
    /// latest state. Returns the number of entries loaded.
    pub async fn reload(&self) -> usize {
        let _guard = self.writer.lock().await;
        let snapshot = load_or_empty(&self.paths).await;
        let len = snapshot.len();
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
        len
    }

    #[must_use]
    pub const fn paths(&self) -> &IndexPaths {
        &self.paths
    }

    /// The last fully built snapshot
    #[must_use]
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Replace the whole index with `documents`. Returns the number of chunks
    /// indexed, or 0 when the build fails (the previous index is kept).
    pub async fn rebuild(&self, documents: &[SourceDocument]) -> usize {
        match self.try_rebuild(documents).await {
            Ok(count) => count,
            Err(err) => {
                log::error!("Index rebuild failed: {err}");
                0
            }
        }
    }

    pub async fn try_rebuild(&self, documents: &[SourceDocument]) -> Result<usize> {
        let _guard = self.writer.lock().await;
        log::info!("Rebuilding index from {} documents", documents.len());
        self.build_and_swap(Vec::new(), documents).await
    }

    /// Replace every entry of the given documents' source ids with freshly
    /// chunked content. Returns the number of new chunks, or 0 on failure.
    pub async fn upsert(&self, documents: &[SourceDocument]) -> usize {
        match self.try_upsert(documents).await {
            Ok(count) => count,
            Err(err) => {
                log::error!("Index upsert failed: {err}");
                0
            }
        }
    }

    pub async fn try_upsert(&self, documents: &[SourceDocument]) -> Result<usize> {
        let _guard = self.writer.lock().await;
        let targets: HashSet<&str> = documents.iter().map(|d| d.source_id.as_str()).collect();
        let current = self.snapshot();
        let survivors: Vec<IndexEntry> = current
            .entries()
            .iter()
            .filter(|entry| !targets.contains(entry.source_id()))
            .cloned()
            .collect();
        log::info!(
            "Upserting {} documents ({} entries replaced)",
            documents.len(),
            current.len() - survivors.len()
        );
        self.build_and_swap(survivors, documents).await
    }

    /// Drop all entries of `source_ids`. Returns the number of entries removed.
    pub async fn delete_sources(&self, source_ids: &[String]) -> Result<usize> {
        let _guard = self.writer.lock().await;
        let targets: HashSet<&str> = source_ids.iter().map(String::as_str).collect();
        let current = self.snapshot();
        let survivors: Vec<IndexEntry> = current
            .entries()
            .iter()
            .filter(|entry| !targets.contains(entry.source_id()))
            .cloned()
            .collect();
        let removed = current.len() - survivors.len();
        if removed == 0 {
            return Ok(0);
        }
        self.build_and_swap(survivors, &[]).await?;
        log::info!("Removed {removed} entries for {} sources", source_ids.len());
        Ok(removed)
    }

    /// Whether the indexed chunks of `document` already match what its
    /// current content chunks into
    pub fn is_current(&self, document: &SourceDocument) -> Result<bool> {
        let fresh = self.chunker.chunk_document(document)?;
        let snapshot = self.snapshot();
        let indexed: Vec<&NoteChunk> = snapshot
            .entries()
            .iter()
            .filter(|entry| entry.source_id() == document.source_id)
            .map(|entry| &entry.chunk)
            .collect();
        Ok(fresh.len() == indexed.len()
            && fresh.iter().zip(indexed).all(|(new, old)| {
                new.text == old.text
                    && new.display_title == old.display_title
                    && new.tags == old.tags
                    && new.headings == old.headings
            }))
    }

    /// Top-`k` chunks for `query`, best first. An empty query or an empty
    /// store yields no hits. A failing query embedding is logged and also
    /// yields no hits.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            return Ok(Vec::new());
        }

        log::debug!("Searching for: '{query}' (limit: {k})");
        let query_vector = match self.embed_query(query).await {
            Ok(vector) => vector,
            Err(err) => {
                log::warn!("Query embedding failed, returning no results: {err}");
                return Ok(Vec::new());
            }
        };

        let hits = match snapshot.search_vector(&query_vector, k) {
            Ok(hits) => hits,
            Err(err) => {
                log::warn!("Search over {} entries failed: {err}", snapshot.len());
                return Ok(Vec::new());
            }
        };
        log::debug!("Found {} results", hits.len());
        Ok(hits)
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embedder.embed(&[query.to_string()]).await?;
        match (vectors.pop(), vectors.is_empty()) {
            (Some(vector), true) => Ok(vector),
            _ => Err(VectorStoreError::embedding(
                "query embedding did not return exactly one vector",
            )),
        }
    }

    async fn build_and_swap(
        &self,
        mut entries: Vec<IndexEntry>,
        documents: &[SourceDocument],
    ) -> Result<usize> {
        let mut chunks: Vec<NoteChunk> = Vec::new();
        for document in documents {
            chunks.extend(self.chunker.chunk_document(document)?);
        }

        let added = chunks.len();
        if added > 0 {
            let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
            let vectors = embed_in_batches(self.embedder.as_ref(), &texts, &self.batch).await?;
            entries.extend(
                chunks
                    .into_iter()
                    .zip(vectors)
                    .map(|(chunk, embedding)| IndexEntry::new(chunk, embedding)),
            );
        }

        let snapshot = IndexSnapshot::from_entries(entries)?;
        snapshot.save(&self.paths).await?;

        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
        Ok(added)
    }
}

/// Load persisted artifacts when either exists; unreadable or inconsistent
/// artifacts start an empty snapshot.
async fn load_or_empty(paths: &IndexPaths) -> IndexSnapshot {
    if !paths.vectors().exists() && !paths.metadata().exists() {
        log::info!("No index at {}; starting empty", paths.dir().display());
        return IndexSnapshot::empty();
    }
    match IndexSnapshot::load(paths).await {
        Ok(snapshot) => {
            log::info!(
                "Loaded index with {} entries from {}",
                snapshot.len(),
                paths.dir().display()
            );
            snapshot
        }
        Err(err) => {
            log::warn!(
                "Ignoring unreadable index at {}: {err}; starting empty",
                paths.dir().display()
            );
            IndexSnapshot::empty()
        }
    }
}
