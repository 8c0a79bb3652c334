use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Device profile not found: {0}")]
    DeviceProfileNotFound(String),

    #[error("Device profile already exists: {0}")]
    DeviceProfileAlreadyExists(String),

    #[error("Device profile in use: {0}")]
    DeviceProfileInUse(String),

    #[error("Device resource '{0}' units '{1}' is invalid")]
    InvalidUnitsOfMeasure(String, String),

    #[error("Device profile '{0}' would have {1} resources, exceeding the maximum of {2}")]
    ResourceCapacityExceeded(String, usize, u32),

    #[error("profile deletion is not allowed when strict device profile deletes is enabled")]
    ProfileDeletionLocked,

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
