//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  LedgerError (staybook-core)     SQLite Error (sqlx::Error)            │
//! │       │                                │                                │
//! │       └──────────────┬─────────────────┘                                │
//! │                      ▼                                                  │
//! │  DbError (this module) ← Adds context and categorization               │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │  Caller (transaction already rolled back)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use staybook_core::{ErrorKind, LedgerError, Principal};
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// A ledger rule rejected the operation. Nothing was written.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The ledger has no administrator yet.
    ///
    /// ## When This Occurs
    /// - A mutation runs before `Database::open_ledger`
    #[error("Ledger not initialized: no administrator recorded")]
    NotInitialized,

    /// The database was created for a different administrator.
    #[error("Administrator mismatch: database belongs to {stored}, requested {requested}")]
    AdministratorMismatch {
        stored: Principal,
        requested: Principal,
    },

    /// A query expected exactly one row and found none.
    #[error("Row not found")]
    RowNotFound,

    /// Unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A stored or supplied value does not fit its column.
    ///
    /// ## When This Occurs
    /// - Amounts above `i64::MAX` (SQLite integers are signed)
    /// - Corrupted rows holding negative ids or prices
    #[error("Value out of range for {field}")]
    OutOfRange { field: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Event payload could not be encoded or decoded.
    #[error("Event payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates an OutOfRange error for a column.
    pub fn out_of_range(field: impl Into<String>) -> Self {
        DbError::OutOfRange {
            field: field.into(),
        }
    }

    /// The ledger rule that failed, if this is a rule violation.
    pub fn ledger_kind(&self) -> Option<ErrorKind> {
        match self {
            DbError::Ledger(err) => Some(err.kind()),
            _ => None,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::RowNotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: <table>.<column>, ..."
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::RowNotFound => DbError::RowNotFound,

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

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

// =============================================================================
// Unit Tests
// =============================================================================
