//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  PostgreSQL Error (sqlx::Error)     Ledger rule (CoreError)            │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module) ◄──────────── DbError::Rule                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in apps/api) ← Status code + JSON body                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any error returned from inside a ledger operation drops the open
//! `sqlx::Transaction`, which rolls it back.

use thiserror::Error;
use warung_core::{CoreError, ValidationError};

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";
/// SQLSTATE for `check_violation`.
const CHECK_VIOLATION: &str = "23514";
/// SQLSTATE for `numeric_value_out_of_range`.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// A ledger rule rejected the operation.
    #[error(transparent)]
    Rule(#[from] CoreError),

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Creating a product or account whose name is already taken
    /// - Registering an existing username
    #[error("Duplicate value violates {constraint}")]
    UniqueViolation { constraint: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Deleting a row another row still references
    /// - Referencing a non-existent product_id or account_id
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A CHECK constraint rejected a row (e.g. negative stock).
    #[error("Check constraint violation: {message}")]
    CheckViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored value could not be mapped back to a domain type.
    #[error("Corrupt row in {table}: {reason}")]
    CorruptRow { table: &'static str, reason: String },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Shorthand for a `NotFound` ledger rule.
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        DbError::Rule(CoreError::not_found(entity, key))
    }

    /// The wrapped ledger rule, if this is one.
    pub fn rule(&self) -> Option<&CoreError> {
        match self {
            DbError::Rule(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Rule(CoreError::Validation(err))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database 23505  → DbError::UniqueViolation
/// sqlx::Error::Database 23503  → DbError::ForeignKeyViolation
/// sqlx::Error::Database 23514  → DbError::CheckViolation
/// sqlx::Error::Database 22003  → DbError::Rule(Validation(OutOfRange))
/// sqlx::Error::PoolTimedOut    → DbError::PoolExhausted
/// Other                        → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => DbError::UniqueViolation {
                    constraint: db_err.constraint().unwrap_or("unique index").to_string(),
                },
                Some(FOREIGN_KEY_VIOLATION) => DbError::ForeignKeyViolation {
                    message: db_err.message().to_string(),
                },
                Some(CHECK_VIOLATION) => DbError::CheckViolation {
                    message: db_err.message().to_string(),
                },
                Some(NUMERIC_OUT_OF_RANGE) => DbError::Rule(CoreError::Validation(
                    ValidationError::OutOfRange {
                        field: "amount".to_string(),
                        reason: db_err.message().to_string(),
                    },
                )),
                _ => DbError::QueryFailed(db_err.message().to_string()),
            },

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(io) => DbError::ConnectionFailed(io.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
