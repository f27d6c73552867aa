//! Service-level error taxonomy.
//!
//! Services surface every failure immediately; the HTTP layer maps each
//! variant to a status code. Storage failures are fatal to the single
//! request, not to the process.

use crate::db::repository::RepositoryError;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error type for service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Entity absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller is not allowed to mutate the entity.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// No caller identity where one is required.
    #[error("authentication required")]
    Unauthenticated,

    /// Another account already holds this email.
    #[error("duplicate email: {0}")]
    DuplicateEmail(String),

    /// Another account already holds this nickname.
    #[error("duplicate nickname: {0}")]
    DuplicateNickname(String),

    /// No account matches the supplied credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A required field is missing or empty.
    #[error("validation error: {0}")]
    Validation(String),

    /// The storage adapter failed.
    #[error("storage error: {0}")]
    Storage(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        if err.is_not_found() {
            ServiceError::NotFound(err.to_string())
        } else {
            ServiceError::Storage(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_not_found_maps_to_service_not_found() {
        let err: ServiceError = RepositoryError::not_found("post 4 not found").into();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn other_repository_errors_map_to_storage() {
        let err: ServiceError = RepositoryError::corrupt("bad json").into();
        assert!(matches!(err, ServiceError::Storage(_)));
    }
}
