use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::domain::types::TypeConstraintError;

/// Failures surfaced by the local store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No row matched the requested id.
    #[error("Record not found")]
    NotFound,

    /// SQLite rejected the statement for a reason other than a constraint.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A stored or submitted value broke a domain rule.
    #[error("Invalid data: {0}")]
    ValidationError(String),

    /// No pooled connection could be checked out.
    #[error("Could not reach the store: {0}")]
    ConnectionError(String),

    /// A unique, foreign key, not-null or check constraint fired.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Embedded migrations could not be applied at startup.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Any other diesel failure.
    #[error("Unexpected store error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

fn constraint_name(kind: &DatabaseErrorKind) -> Option<&'static str> {
    match kind {
        DatabaseErrorKind::UniqueViolation => Some("unique"),
        DatabaseErrorKind::ForeignKeyViolation => Some("foreign key"),
        DatabaseErrorKind::NotNullViolation => Some("not null"),
        DatabaseErrorKind::CheckViolation => Some("check"),
        _ => None,
    }
}

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RepositoryError::NotFound,
            DieselError::DatabaseError(kind, info) => match constraint_name(&kind) {
                Some(name) => {
                    RepositoryError::ConstraintViolation(format!("{name}: {}", info.message()))
                }
                None => RepositoryError::DatabaseError(info.message().to_string()),
            },
            DieselError::SerializationError(_)
            | DieselError::DeserializationError(_)
            | DieselError::InvalidCString(_) => RepositoryError::ValidationError(err.to_string()),
            DieselError::RollbackTransaction
            | DieselError::AlreadyInTransaction
            | DieselError::NotInTransaction
            | DieselError::BrokenTransactionManager => {
                RepositoryError::DatabaseError(err.to_string())
            }
            other => RepositoryError::Unexpected(other.to_string()),
        }
    }
}

impl From<PoolError> for RepositoryError {
    fn from(err: PoolError) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(err: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diesel_not_found_maps_to_not_found() {
        assert!(matches!(
            RepositoryError::from(DieselError::NotFound),
            RepositoryError::NotFound
        ));
        assert!(matches!(
            RepositoryError::from(DieselError::RollbackTransaction),
            RepositoryError::DatabaseError(_)
        ));
    }

    #[test]
    fn type_constraint_maps_to_validation() {
        let err = RepositoryError::from(TypeConstraintError::InvalidAmount);
        assert!(matches!(err, RepositoryError::ValidationError(_)));
    }
}
