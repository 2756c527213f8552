use super::domain::{VehicleId, VehicleSnapshot};
use super::rejection::ErrorKind;

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::Conflict => ErrorKind::AlreadyExists,
            RepositoryError::NotFound => ErrorKind::NotFound,
            RepositoryError::Unavailable(_) => ErrorKind::Storage,
        }
    }
}

/// Read-only view of the external vehicle directory.
pub trait VehicleDirectory: Send + Sync {
    fn vehicle(&self, id: &VehicleId) -> Result<Option<VehicleSnapshot>, DirectoryError>;
}

/// Vehicle directory lookup failure.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("vehicle directory unavailable: {0}")]
    Unavailable(String),
}
