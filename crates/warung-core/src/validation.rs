//! # Validation Module
//!
//! Input validation utilities for Warung.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum Json)                                   │
//! │  └── Type validation (deserialization)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Names, quantities, money scale                                    │
//! │  └── Runs before any row is locked                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Ledger guards (warung-db, under row locks)                   │
//! │  ├── Stock never below zero                                            │
//! │  └── Debited balances never below zero                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (PostgreSQL)                                        │
//! │  ├── UNIQUE (LOWER(name))                                              │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use warung_core::money::Money;
//! use warung_core::validation::{validate_name, validate_positive_amount, validate_quantity};
//!
//! validate_name("productName", "Kopi Susu").unwrap();
//! validate_quantity(5).unwrap();
//! validate_positive_amount("amount", Money::from_minor(850)).unwrap();
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::{Money, MONEY_SCALE};
use crate::types::DateRange;
use crate::{MAX_NAME_LEN, MAX_QUANTITY, MAX_SALE_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product, account, user).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LEN`] characters
///
/// ## Returns
/// The trimmed name, which is what gets stored.
///
/// ```rust
/// use warung_core::validation::validate_name;
///
/// assert_eq!(validate_name("name", "  Kopi ").unwrap(), "Kopi");
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates an optional free-text description.
///
/// Blank descriptions collapse to `None`.
pub fn validate_description(description: Option<&str>) -> ValidationResult<Option<String>> {
    const MAX: usize = 500;

    match description.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) if text.chars().count() > MAX => Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX,
        }),
        Some(text) => Ok(Some(text.to_string())),
    }
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns all results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Validates a login username: non-empty, no whitespace.
pub fn validate_username(username: &str) -> ValidationResult<String> {
    let username = validate_name("username", username)?;

    if username.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must not contain spaces".to_string(),
        });
    }

    Ok(username)
}

pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < 6 {
        return Err(ValidationError::InvalidFormat {
            field: "password".to_string(),
            reason: "must be at least 6 characters".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity of units moved by a sale or purchase.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_QUANTITY`]
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POST /transactions  { quantity: 0, ... }                              │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(0) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → 400 "quantity must be positive"                  │
/// │       │                                                                 │
/// │       └── OK → lock product row, check stock                           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_QUANTITY {
        return Err(ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: format!("must not exceed {MAX_QUANTITY}"),
        });
    }

    Ok(())
}

/// Validates a stock level set directly on a product.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }
    Ok(())
}

/// Validates the number of lines in one sale request.
pub fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }
    if count > MAX_SALE_LINES {
        return Err(ValidationError::InvalidFormat {
            field: "items".to_string(),
            reason: format!("at most {MAX_SALE_LINES} lines per sale"),
        });
    }
    Ok(())
}

// =============================================================================
// Money Validators
// =============================================================================

/// Rejects amounts the store cannot hold: more decimal places than it keeps,
/// or a magnitude of 10^12 and above.
pub fn validate_money_scale(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.fits_store_scale() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("at most {MONEY_SCALE} decimal places"),
        });
    }
    if !amount.fits_store_range() {
        return Err(Money::out_of_range(field));
    }
    Ok(())
}

/// Amount moved by an operation: strictly positive, two decimals at most.
///
/// ```rust
/// use warung_core::money::Money;
/// use warung_core::validation::validate_positive_amount;
///
/// assert!(validate_positive_amount("amount", Money::from_minor(1)).is_ok());
/// assert!(validate_positive_amount("amount", Money::zero()).is_err());
/// assert!(validate_positive_amount("amount", "1.005".parse().unwrap()).is_err());
/// ```
pub fn validate_positive_amount(field: &str, amount: Money) -> ValidationResult<()> {
    validate_money_scale(field, amount)?;
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Prices may be zero (free items) but never negative.
pub fn validate_price(field: &str, amount: Money) -> ValidationResult<()> {
    validate_money_scale(field, amount)?;
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// Builds a listing window; `start` after `end` is rejected.
pub fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ValidationResult<DateRange> {
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(ValidationError::InvalidFormat {
                field: "startDate".to_string(),
                reason: "must not be after endDate".to_string(),
            });
        }
    }
    Ok(DateRange { start, end })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("name", "Kopi Susu").unwrap(), "Kopi Susu");
        assert!(matches!(
            validate_name("name", ""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_name("name", &"x".repeat(MAX_NAME_LEN + 1)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_description_collapses_blank() {
        assert_eq!(validate_description(None).unwrap(), None);
        assert_eq!(validate_description(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_description(Some(" listrik ")).unwrap(),
            Some("listrik".to_string())
        );
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_positive_amount("amount", Money::from_minor(50)).is_ok());
        assert!(validate_positive_amount("amount", Money::from_major(-1)).is_err());
        assert!(validate_price("price", Money::zero()).is_ok());
        assert!(validate_price("price", Money::from_minor(-1)).is_err());
        assert!(matches!(
            validate_price("price", "2.999".parse().unwrap()),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_validate_amounts_reject_values_past_store_range() {
        assert!(validate_price("sellingPrice", "999999999999.99".parse().unwrap()).is_ok());
        assert!(matches!(
            validate_price("sellingPrice", "1000000000000".parse().unwrap()),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            validate_price("sellingPrice", "79228162514264337593543950335".parse().unwrap()),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            validate_money_scale("balance", "-1000000000000".parse().unwrap()),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_positive_amount("amount", Money::from_major(1_000_000_000_000)).is_err());
    }

    #[test]
    fn test_validate_username_and_password() {
        assert_eq!(validate_username(" admin ").unwrap(), "admin");
        assert!(validate_username("ad min").is_err());
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("123").is_err());
    }

    #[test]
    fn test_validate_date_range() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        assert!(validate_date_range(Some(d(1)), Some(d(31))).is_ok());
        assert!(validate_date_range(Some(d(1)), Some(d(1))).is_ok());
        assert!(validate_date_range(Some(d(2)), Some(d(1))).is_err());
        assert!(validate_date_range(None, Some(d(1))).is_ok());
    }

    #[test]
    fn test_validate_line_count() {
        assert!(validate_line_count(0).is_err());
        assert!(validate_line_count(1).is_ok());
        assert!(validate_line_count(MAX_SALE_LINES + 1).is_err());
    }
}
