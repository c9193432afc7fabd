//! Storage-specific error types for SQLite operations.
//!
//! Diesel and r2d2 errors are wrapped here and converted to the
//! database-agnostic errors of `fundflow_core` at the crate boundary.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use fundflow_core::errors::{DatabaseError, Error};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Cannot open SQLite database: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("r2d2 pool: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Diesel: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Pending migrations could not be applied: {0}")]
    MigrationFailed(String),

    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored column could not be read back into its domain type.
    #[error("Corrupt value in {column}: {value}")]
    InvalidColumn { column: &'static str, value: String },

    /// A core error raised inside a write job. Kept intact so callers can
    /// still match on it (unique violations in particular).
    #[error(transparent)]
    Core(Error),
}

impl From<Error> for StorageError {
    fn from(err: Error) -> Self {
        StorageError::Core(err)
    }
}

/// Sorts a Diesel failure into the storage-agnostic buckets. Constraint
/// violations get their own variants because services branch on them.
fn classify(err: DieselError) -> DatabaseError {
    match err {
        DieselError::NotFound => DatabaseError::NotFound("Record not found".to_string()),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DatabaseError::UniqueViolation(info.message().to_string())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            DatabaseError::ForeignKeyViolation(info.message().to_string())
        }
        e @ (DieselError::RollbackTransaction | DieselError::AlreadyInTransaction) => {
            DatabaseError::TransactionFailed(e.to_string())
        }
        other => DatabaseError::QueryFailed(other.to_string()),
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        let db = match err {
            StorageError::Core(e) => return e,
            StorageError::QueryFailed(e) => classify(e),
            StorageError::ConnectionFailed(e) => DatabaseError::ConnectionFailed(e.to_string()),
            StorageError::PoolError(e) => DatabaseError::PoolCreationFailed(e.to_string()),
            StorageError::MigrationFailed(e) => DatabaseError::MigrationFailed(e),
            e @ (StorageError::Io(_) | StorageError::InvalidColumn { .. }) => {
                DatabaseError::Internal(e.to_string())
            }
        };
        Error::Database(db)
    }
}

/// Extension trait for converting Diesel and r2d2 results to core results.
///
/// Orphan rules rule out `From<DieselError> for Error`, so conversion goes
/// through `StorageError`.
pub trait IntoCore<T> {
    fn into_core(self) -> fundflow_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, DieselError> {
    fn into_core(self) -> fundflow_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

impl<T> IntoCore<T> for std::result::Result<T, r2d2::Error> {
    fn into_core(self) -> fundflow_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_survive_the_round_trip() {
        let original = Error::Database(DatabaseError::UniqueViolation("capital_calls".into()));
        let back: Error = StorageError::from(original).into();
        assert!(back.is_unique_violation());
    }

    #[test]
    fn test_missing_row_maps_to_not_found() {
        let err: Error = StorageError::QueryFailed(DieselError::NotFound).into();
        assert!(matches!(err, Error::Database(DatabaseError::NotFound(_))));
    }
}
