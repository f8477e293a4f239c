use thiserror::Error;

pub type Result<T> = std::result::Result<T, RetrievalError>;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] notes_vector_store::VectorStoreError),

    #[error("Insufficient data: need at least {required} indexed chunks, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Unknown pair mode: {0}")]
    UnknownMode(String),
}
