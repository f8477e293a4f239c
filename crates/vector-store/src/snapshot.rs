use crate::embeddings::normalized;
use crate::error::{Result, VectorStoreError};
use crate::flat_index::FlatIpIndex;
use crate::paths::IndexPaths;
use crate::types::{IndexEntry, SearchHit};

const ROW_TOLERANCE: f32 = 1e-4;

/// Entries plus the index built over them, always constructed together.
///
/// A snapshot is immutable once built; the store swaps whole snapshots.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    entries: Vec<IndexEntry>,
    index: FlatIpIndex,
}

impl IndexSnapshot {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            index: FlatIpIndex::new(0),
        }
    }

    /// Build the index for `entries`. The first entry fixes the dimension;
    /// any other dimension is an error.
    pub fn from_entries(entries: Vec<IndexEntry>) -> Result<Self> {
        let Some(first) = entries.first() else {
            return Ok(Self::empty());
        };
        let dimension = first.embedding.len();
        if dimension == 0 {
            return Err(VectorStoreError::IndexError(
                "embedding gateway returned an empty vector".to_string(),
            ));
        }

        let rows: Vec<Vec<f32>> = entries.iter().map(|e| e.embedding.clone()).collect();
        let index = FlatIpIndex::build(dimension, &rows)?;
        Ok(Self { entries, index })
    }

    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    #[must_use]
    pub const fn index(&self) -> &FlatIpIndex {
        &self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        (!self.is_empty()).then(|| self.index.dimension())
    }

    /// Distinct source ids, in first-seen order
    #[must_use]
    pub fn source_ids(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.entries
            .iter()
            .map(IndexEntry::source_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Rank entries against an already-embedded query
    pub fn search_vector(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let neighbors = self.index.search(query, k)?;
        Ok(neighbors
            .into_iter()
            .filter_map(|(idx, score)| {
                self.entries
                    .get(idx)
                    .map(|entry| SearchHit::from_entry(entry, score))
            })
            .collect())
    }

    /// Write both artifacts. Both temp files are fully written before either
    /// is renamed into place.
    pub async fn save(&self, paths: &IndexPaths) -> Result<()> {
        tokio::fs::create_dir_all(paths.dir()).await?;

        let meta_path = paths.metadata();
        let vectors_path = paths.vectors();
        let meta_tmp = meta_path.with_extension("json.tmp");
        let vectors_tmp = vectors_path.with_extension("index.tmp");

        tokio::fs::write(&meta_tmp, serde_json::to_vec_pretty(&self.entries)?).await?;
        tokio::fs::write(&vectors_tmp, self.index.to_bytes()).await?;
        tokio::fs::rename(&meta_tmp, &meta_path).await?;
        tokio::fs::rename(&vectors_tmp, &vectors_path).await?;
        log::info!(
            "Saved index with {} entries to {}",
            self.entries.len(),
            paths.dir().display()
        );
        Ok(())
    }

    /// Load both artifacts. Missing files, parse errors, and any disagreement
    /// between the two (row count, dimension, row contents) are errors.
    pub async fn load(paths: &IndexPaths) -> Result<Self> {
        let index = FlatIpIndex::load(paths.vectors()).await?;
        let bytes = tokio::fs::read(paths.metadata()).await?;
        let entries: Vec<IndexEntry> = serde_json::from_slice(&bytes)?;

        if entries.len() != index.len() {
            return Err(VectorStoreError::Corrupt(format!(
                "metadata has {} entries but index has {} rows",
                entries.len(),
                index.len()
            )));
        }

        for (idx, entry) in entries.iter().enumerate() {
            if entry.embedding.len() != index.dimension() {
                return Err(VectorStoreError::InvalidDimension {
                    expected: index.dimension(),
                    actual: entry.embedding.len(),
                });
            }
            let Some(row) = index.row(idx) else {
                return Err(VectorStoreError::Corrupt(format!("missing index row {idx}")));
            };
            let expected = normalized(&entry.embedding);
            let drift = row
                .iter()
                .zip(expected.iter())
                .any(|(a, b)| (a - b).abs() > ROW_TOLERANCE);
            if drift {
                return Err(VectorStoreError::Corrupt(format!(
                    "index row {idx} does not match metadata entry"
                )));
            }
        }

        Ok(Self { entries, index })
    }
}

impl Default for IndexSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
