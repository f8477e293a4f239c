use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] notes_vector_store::VectorStoreError),

    #[error("Invalid notes path: {0}")]
    InvalidPath(String),

    #[error("Invalid file glob '{pattern}': {reason}")]
    InvalidGlob { pattern: String, reason: String },

    #[error("{0}")]
    Other(String),
}
