use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Question must not be empty")]
    EmptyQuestion,

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] notes_retrieval::RetrievalError),

    #[error("Completion failed: {0}")]
    Completion(String),
}

impl RagError {
    pub fn completion(msg: impl Into<String>) -> Self {
        Self::Completion(msg.into())
    }
}
