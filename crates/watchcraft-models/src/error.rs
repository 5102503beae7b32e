use thiserror::Error;

/// Errors raised when a value cannot enter the data model
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("person name cannot be empty")]
    EmptyName,

    #[error("unknown media type: {0}")]
    UnknownMediaType(String),

    #[error("unknown watch status: {0}")]
    UnknownStatus(String),
}
