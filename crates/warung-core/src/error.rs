//! # Error Types
//!
//! Domain-specific error types for warung-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  warung-core errors (this file)                                        │
//! │  ├── CoreError        - Ledger rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  warung-db errors (separate crate)                                     │
//! │  └── DbError          - Storage failures, wraps CoreError as Rule      │
//! │                                                                         │
//! │  API errors (in app)                                                   │
//! │  └── ApiError         - What HTTP clients see (status + JSON)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, account, amounts)
//! 3. Every variant is recoverable at the transaction boundary: the caller
//!    rolls back and reports it, nothing is partially applied

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger rule violations.
///
/// Every one of these aborts the surrounding database transaction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Not enough units on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Sell 5 × "Kopi Susu"
    ///      │
    ///      ▼
    /// Locked row: stock = 3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Kopi Susu", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Transaction rolled back, stock and balances untouched
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// An account would go below zero.
    #[error("Insufficient funds in {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: String,
        balance: Money,
        requested: Money,
    },

    /// Delete blocked because other records still reference the entity.
    #[error("{0}")]
    Conflict(String),

    /// An enumerated value outside its allowed set.
    #[error("Invalid {field} '{value}': expected one of {allowed:?}")]
    InvalidArgument {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and lookup key.
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when request input doesn't meet requirements.
/// Used for early validation before any row is locked.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., too many decimal places, bad date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value does not fit what the store can hold (e.g., an amount past
    /// `NUMERIC(14,2)`).
    #[error("{field} is out of range: {reason}")]
    OutOfRange { field: String, reason: String },

    /// Duplicate value (e.g., product name already taken).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Kopi Susu".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Kopi Susu: available 3, requested 5"
        );

        let err = CoreError::InsufficientFunds {
            account: "Kas".to_string(),
            balance: Money::from_major(10),
            requested: Money::from_minor(1250),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds in Kas: balance 10.00, requested 12.50"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "productName".to_string(),
        };
        assert_eq!(err.to_string(), "productName is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
