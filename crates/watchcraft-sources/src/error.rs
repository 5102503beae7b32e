use thiserror::Error;

/// Failure of a metadata provider or watchlist store
///
/// Callers treat every variant the same way: the operation did not happen.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SourceResult<T> = Result<T, SourceError>;
