use serde::{Deserialize, Serialize};

/// Configuration for note chunking behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Target chunk size in characters (hard upper bound for merged chunks)
    pub chunk_size: usize,

    /// Characters carried over from the end of one chunk into the next
    pub chunk_overlap: usize,

    /// Deepest ATX heading level that starts a new segment
    pub max_heading_level: usize,

    /// Break points in priority order. A per-character split is always
    /// appended as the last resort.
    pub separators: Vec<String>,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 100,
            max_heading_level: 4,
            separators: vec![
                "\n## ".to_string(),
                "\n### ".to_string(),
                "\n".to_string(),
                " ".to_string(),
            ],
        }
    }
}

impl ChunkerConfig {
    /// Smaller chunks with a tighter overlap, for embedding models with short context
    pub fn compact() -> Self {
        Self {
            chunk_size: 400,
            chunk_overlap: 50,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be > 0".to_string());
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }

        if !(1..=6).contains(&self.max_heading_level) {
            return Err(format!(
                "max_heading_level ({}) must be within 1..=6",
                self.max_heading_level
            ));
        }

        if self.separators.iter().any(String::is_empty) {
            return Err("separators must not contain empty strings".to_string());
        }

        Ok(())
    }
}
