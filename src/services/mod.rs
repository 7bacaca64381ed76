//! Service layer sitting between screens and the store.
//!
//! Services accept loosely typed input (raw ids, search text), convert it into
//! domain values and call the repository traits. Failures are logged where
//! they happen and returned as [`ServiceError`].

use thiserror::Error;

use crate::domain::types::TypeConstraintError;
use crate::repository::errors::RepositoryError;

pub mod client;
pub mod expense;
pub mod item;
pub mod job;
pub mod task;

/// Number of rows shown per list page.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// Errors returned by service functions.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("record not found")]
    NotFound,

    #[error("form error: {0}")]
    Form(String),

    #[error("type constraint violated: {0}")]
    TypeConstraint(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(val: RepositoryError) -> Self {
        match val {
            RepositoryError::NotFound => ServiceError::NotFound,
            other => ServiceError::Repository(other),
        }
    }
}

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_not_found_maps_to_not_found() {
        assert!(matches!(
            ServiceError::from(RepositoryError::NotFound),
            ServiceError::NotFound
        ));
        assert!(matches!(
            ServiceError::from(TypeConstraintError::NonPositiveId),
            ServiceError::TypeConstraint(_)
        ));
    }
}
