use thiserror::Error;

/// Failures raised by the index and the ranking engine.
///
/// Unseen terms and empty result sets are not errors; they surface as empty
/// postings lists and zero scores.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("duplicate document: {0}")]
    DuplicateDocument(String),

    #[error("unknown document: {0}")]
    UnknownDocument(String),

    #[error("malformed document {id:?}: {reason}")]
    MalformedDocument { id: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;
