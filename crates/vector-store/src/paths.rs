use std::path::{Path, PathBuf};

pub const INDEX_DIR_NAME: &str = ".notes-index";
pub const VECTORS_FILE_NAME: &str = "notes.index";
pub const METADATA_FILE_NAME: &str = "notes_meta.json";
pub const LOCK_FILE_NAME: &str = "index.lock";

/// Locations of the two companion index artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPaths {
    dir: PathBuf,
}

impl IndexPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default index directory for a notes root: `<root>/.notes-index`
    #[must_use]
    pub fn for_notes_root(root: &Path) -> Self {
        Self::new(root.join(INDEX_DIR_NAME))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Binary vector artifact
    #[must_use]
    pub fn vectors(&self) -> PathBuf {
        self.dir.join(VECTORS_FILE_NAME)
    }

    /// JSON metadata artifact
    #[must_use]
    pub fn metadata(&self) -> PathBuf {
        self.dir.join(METADATA_FILE_NAME)
    }

    /// Cross-process writer lock
    #[must_use]
    pub fn lock(&self) -> PathBuf {
        self.dir.join(LOCK_FILE_NAME)
    }
}
