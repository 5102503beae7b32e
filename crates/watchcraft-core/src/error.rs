use thiserror::Error;
use watchcraft_models::ModelError;
use watchcraft_sources::SourceError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Entry not found: {0}")]
    NotFound(String),

    /// A provider or store call failed; nothing was applied
    #[error("Collaborator failure: {0}")]
    Collaborator(#[from] SourceError),
}

impl From<ModelError> for CoreError {
    fn from(err: ModelError) -> Self {
        CoreError::InvalidArgument(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
