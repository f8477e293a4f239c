use crate::error::Result;
use crate::index_lock::{acquire_index_write_lock, IndexWriteLock};
use crate::scanner::{NoteScanner, NoteStatus, ScanOptions};
use crate::stats::IndexStats;
use notes_vector_store::NoteVectorStore;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Keeps a [`NoteVectorStore`] in sync with a directory of notes
pub struct NoteIndexer {
    scanner: NoteScanner,
    store: Arc<NoteVectorStore>,
}

impl NoteIndexer {
    pub fn new(
        root: impl AsRef<Path>,
        options: ScanOptions,
        store: Arc<NoteVectorStore>,
    ) -> Result<Self> {
        Ok(Self {
            scanner: NoteScanner::new(root, options)?,
            store,
        })
    }

    pub fn root(&self) -> &Path {
        self.scanner.root()
    }

    pub const fn scanner(&self) -> &NoteScanner {
        &self.scanner
    }

    pub fn store(&self) -> &Arc<NoteVectorStore> {
        &self.store
    }

    /// Rebuild the index from every note under the root
    pub async fn index_full(&self) -> Result<IndexStats> {
        let start = Instant::now();
        let _lock = self.lock_and_reload().await?;
        self.rebuild_locked(start).await
    }

    /// Take the on-disk index lock, then pick up whatever another writer
    /// persisted before it was released.
    async fn lock_and_reload(&self) -> Result<IndexWriteLock> {
        let lock = acquire_index_write_lock(self.store.paths()).await?;
        let entries = self.store.reload().await;
        log::debug!("Index lock held; {entries} entries on disk");
        Ok(lock)
    }

    /// Full rebuild; the caller holds the index lock
    async fn rebuild_locked(&self, start: Instant) -> Result<IndexStats> {
        let mut stats = IndexStats::new();

        let (documents, errors) = self.scanner.scan();
        errors.into_iter().for_each(|e| stats.add_error(e));

        let previous: HashSet<String> = self
            .store
            .snapshot()
            .source_ids()
            .into_iter()
            .map(str::to_string)
            .collect();
        let current: HashSet<&str> = documents.iter().map(|d| d.source_id.as_str()).collect();
        stats.removed = previous
            .iter()
            .filter(|id| !current.contains(id.as_str()))
            .count();

        log::info!("Full index of {} notes", documents.len());
        let chunks = self.store.try_rebuild(&documents).await?;
        stats.add_files(documents.len());
        stats.add_chunks(chunks);

        Ok(self.finish(stats, start))
    }

    /// Re-index only `paths` (absolute or root-relative). Notes that are gone,
    /// no longer match the glob, or are no longer published are removed.
    pub async fn index_paths(&self, paths: &[PathBuf]) -> Result<IndexStats> {
        let start = Instant::now();
        let _lock = self.lock_and_reload().await?;
        let mut stats = IndexStats::new();

        let mut upserts = Vec::new();
        let mut removals = Vec::new();
        for path in paths {
            let source_id = match self.scanner.source_id(path) {
                Ok(id) => id,
                Err(err) => {
                    log::warn!("Ignoring {}: {err}", path.display());
                    stats.add_error(err.to_string());
                    continue;
                }
            };
            match self.scanner.load(path) {
                Ok(NoteStatus::Indexable(doc)) => upserts.push(doc),
                Ok(NoteStatus::Excluded | NoteStatus::Missing) => removals.push(source_id),
                Err(err) => {
                    log::warn!("Skipping {source_id}: {err}");
                    stats.add_error(format!("{source_id}: {err}"));
                }
            }
        }

        if !upserts.is_empty() {
            let chunks = self.store.try_upsert(&upserts).await?;
            stats.add_files(upserts.len());
            stats.add_chunks(chunks);
        }
        if !removals.is_empty() {
            let known: HashSet<String> = self
                .store
                .snapshot()
                .source_ids()
                .into_iter()
                .map(str::to_string)
                .collect();
            stats.removed = removals.iter().filter(|id| known.contains(id.as_str())).count();
            self.store.delete_sources(&removals).await?;
        }

        Ok(self.finish(stats, start))
    }

    /// Full index when the store is empty; otherwise re-index only notes
    /// whose chunks changed and drop notes that disappeared.
    pub async fn index(&self) -> Result<IndexStats> {
        let start = Instant::now();
        let _lock = self.lock_and_reload().await?;
        if self.store.is_empty() {
            return self.rebuild_locked(start).await;
        }

        let mut stats = IndexStats::new();

        let (documents, errors) = self.scanner.scan();
        errors.into_iter().for_each(|e| stats.add_error(e));

        let current: HashSet<String> = documents.iter().map(|d| d.source_id.clone()).collect();
        let vanished: Vec<String> = self
            .store
            .snapshot()
            .source_ids()
            .into_iter()
            .filter(|id| !current.contains(*id))
            .map(str::to_string)
            .collect();

        let mut changed = Vec::new();
        for document in documents {
            if !self.store.is_current(&document)? {
                changed.push(document);
            }
        }
        log::info!(
            "{} of {} notes changed, {} removed",
            changed.len(),
            current.len(),
            vanished.len()
        );

        if !changed.is_empty() {
            let chunks = self.store.try_upsert(&changed).await?;
            stats.add_files(changed.len());
            stats.add_chunks(chunks);
        }
        if !vanished.is_empty() {
            self.store.delete_sources(&vanished).await?;
            stats.removed = vanished.len();
        }

        Ok(self.finish(stats, start))
    }

    fn finish(&self, mut stats: IndexStats, start: Instant) -> IndexStats {
        stats.total_entries = self.store.len();
        stats.time_ms = start.elapsed().as_millis() as u64;
        log::info!(
            "Indexed {} notes into {} chunks ({} removed, {} entries total) in {}ms",
            stats.files,
            stats.chunks,
            stats.removed,
            stats.total_entries,
            stats.time_ms
        );
        stats
    }
}
