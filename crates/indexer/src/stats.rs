use serde::{Deserialize, Serialize};

/// Statistics about an indexing operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Notes chunked and embedded
    pub files: usize,

    /// Chunks created
    pub chunks: usize,

    /// Notes dropped from the index (deleted, unpublished or no longer matched)
    pub removed: usize,

    /// Entries in the index afterwards
    pub total_entries: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// Notes that could not be read
    pub errors: Vec<String>,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_files(&mut self, count: usize) {
        self.files += count;
    }

    pub fn add_chunks(&mut self, count: usize) {
        self.chunks += count;
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }
}
