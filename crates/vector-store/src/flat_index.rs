use crate::embeddings::normalize_in_place;
use crate::error::{Result, VectorStoreError};
use ndarray::{Array1, Array2, ArrayView1};
use std::path::Path;

const INDEX_MAGIC: &[u8; 4] = b"NVIX";
const INDEX_FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// Exact inner-product index over L2-normalized rows.
///
/// Row `i` always corresponds to entry `i` of the owning snapshot. Inner
/// product over unit vectors is cosine similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIpIndex {
    vectors: Array2<f32>,
}

impl FlatIpIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            vectors: Array2::zeros((0, dimension)),
        }
    }

    /// Build from raw vectors; every row is normalized on the way in.
    pub fn build(dimension: usize, rows: &[Vec<f32>]) -> Result<Self> {
        let mut flat = Vec::with_capacity(rows.len() * dimension);
        for row in rows {
            if row.len() != dimension {
                return Err(VectorStoreError::InvalidDimension {
                    expected: dimension,
                    actual: row.len(),
                });
            }
            let start = flat.len();
            flat.extend_from_slice(row);
            normalize_in_place(&mut flat[start..]);
        }
        let vectors = Array2::from_shape_vec((rows.len(), dimension), flat)
            .map_err(|e| VectorStoreError::IndexError(format!("build index: {e}")))?;
        Ok(Self { vectors })
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.vectors.ncols()
    }

    /// Get number of vectors in index
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.nrows()
    }

    /// Check if index is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.nrows() == 0
    }

    #[must_use]
    pub fn row(&self, idx: usize) -> Option<ArrayView1<'_, f32>> {
        (idx < self.len()).then(|| self.vectors.row(idx))
    }

    /// Top-`k` rows by inner product with the normalized query.
    /// Returns (row, score) sorted by score descending, ties by row.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dimension() {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension(),
                actual: query.len(),
            });
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut q = query.to_vec();
        normalize_in_place(&mut q);
        let scores: Array1<f32> = self.vectors.dot(&Array1::from(q));

        let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(k);
        Ok(ranked)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.vectors.len() * 4);
        out.extend_from_slice(INDEX_MAGIC);
        out.extend_from_slice(&INDEX_FORMAT_VERSION.to_le_bytes());
        #[allow(clippy::cast_possible_truncation)]
        let dim = self.dimension() as u32;
        out.extend_from_slice(&dim.to_le_bytes());
        out.extend_from_slice(&(self.len() as u64).to_le_bytes());
        for v in &self.vectors {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN || &bytes[0..4] != INDEX_MAGIC {
            return Err(VectorStoreError::Corrupt("bad index header".to_string()));
        }
        let version = read_u32(bytes, 4)?;
        if version != INDEX_FORMAT_VERSION {
            return Err(VectorStoreError::Corrupt(format!(
                "unsupported index format version {version}"
            )));
        }
        let dim = read_u32(bytes, 8)? as usize;
        let rows = usize::try_from(read_u64(bytes, 12)?)
            .map_err(|_| VectorStoreError::Corrupt("row count overflow".to_string()))?;

        let expected_len = rows
            .checked_mul(dim)
            .and_then(|n| n.checked_mul(4))
            .and_then(|n| n.checked_add(HEADER_LEN))
            .ok_or_else(|| VectorStoreError::Corrupt("index size overflow".to_string()))?;
        if bytes.len() != expected_len {
            return Err(VectorStoreError::Corrupt(format!(
                "index length {} does not match header ({expected_len})",
                bytes.len()
            )));
        }

        let flat: Vec<f32> = bytes[HEADER_LEN..]
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        let vectors = Array2::from_shape_vec((rows, dim), flat)
            .map_err(|e| VectorStoreError::Corrupt(format!("index shape: {e}")))?;
        Ok(Self { vectors })
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("index.tmp");
        tokio::fs::write(&tmp, self.to_bytes()).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        Self::from_bytes(&bytes)
    }
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32> {
    bytes
        .get(at..at + 4)
        .and_then(|s| s.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| VectorStoreError::Corrupt("truncated index header".to_string()))
}

fn read_u64(bytes: &[u8], at: usize) -> Result<u64> {
    bytes
        .get(at..at + 8)
        .and_then(|s| s.try_into().ok())
        .map(u64::from_le_bytes)
        .ok_or_else(|| VectorStoreError::Corrupt("truncated index header".to_string()))
}
