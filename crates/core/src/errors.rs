//! Error types shared by every capital-call service.
//!
//! Nothing here depends on a storage engine: the storage crate folds its
//! Diesel and r2d2 failures into [`DatabaseError`] before they reach a service.

use chrono::ParseError as ChronoParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::capital_calls::CapitalCallError;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything a capital-call operation can fail with.
///
/// Business-rule failures live in [`CapitalCallError`]; input problems in
/// [`ValidationError`]; persistence failures arrive as opaque [`DatabaseError`]s.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage failure: {0}")]
    Database(#[from] DatabaseError),

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Capital call rule violated: {0}")]
    CapitalCall(#[from] CapitalCallError),

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Bad setting: {0}")]
    InvalidConfigValue(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// The idempotent create paths key off this.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Error::Database(DatabaseError::UniqueViolation(_)))
    }
}

/// Storage failures, flattened to strings by the storage crate.
///
/// `UniqueViolation` must survive the trip intact: duplicate submissions are
/// recognized by it.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Cannot open database: {0}")]
    ConnectionFailed(String),

    #[error("Connection pool unavailable: {0}")]
    PoolCreationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("No such row: {0}")]
    NotFound(String),

    /// Natural key already taken, e.g. a second call on the same date.
    #[error("Duplicate key: {0}")]
    UniqueViolation(String),

    /// Usually an allocation pointing at a fund that does not exist.
    #[error("Dangling reference: {0}")]
    ForeignKeyViolation(String),

    #[error("Transaction aborted: {0}")]
    TransactionFailed(String),

    #[error("Schema migration failed: {0}")]
    MigrationFailed(String),

    /// The writer task is gone or returned something unexpected.
    #[error("Storage internal error: {0}")]
    Internal(String),
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("'{0}' is required")]
    MissingField(String),

    /// One entry per offending field, in the order they were checked.

    #[error("{}", format_field_errors(.0))]
    Fields(Vec<FieldError>),

    #[error("Not a decimal amount: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Not a date: {0}")]
    DateParse(#[from] ChronoParseError),
}

impl ValidationError {
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ValidationError::Fields(errors) => errors,
            _ => &[],
        }
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateParse(err))
    }
}
