//! # Repository Module
//!
//! Database repository implementations for Warung.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Ways In                                          │
//! │                                                                         │
//! │  1. Repository structs (own a PgPool clone)                            │
//! │     db.products().list(Some("kopi"))                                   │
//! │     Reads and single-row catalogue edits.                              │
//! │                                                                         │
//! │  2. Row functions taking `&mut PgConnection`                           │
//! │     product::lock(&mut tx, id)                                         │
//! │     Used by the Ledger inside one open transaction, so every           │
//! │     statement of an operation commits or rolls back together.          │
//! │                                                                         │
//! │  SQL lives only in these files.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalogue and stock counts
//! - [`AccountRepository`](account::AccountRepository) - Cash/bank pools
//! - [`TransactionRepository`](transaction::TransactionRepository) - Sale/withdrawal history
//! - [`ExpenseRepository`](expense::ExpenseRepository) - Expenses
//! - [`CapitalRepository`](capital::CapitalRepository) - Capital history and total
//! - [`PurchaseRepository`](purchase::PurchaseRepository) - Stock purchases
//! - [`UserRepository`](user::UserRepository) - Login identities

pub mod account;
pub mod capital;
pub mod expense;
pub mod product;
pub mod purchase;
pub mod transaction;
pub mod user;

use warung_core::ValidationError;

use crate::error::DbError;

/// Maps a unique violation on insert/update to a `Duplicate` validation error.
pub(crate) fn duplicate_as(field: &str, value: &str) -> impl FnOnce(sqlx::Error) -> DbError {
    let field = field.to_string();
    let value = value.to_string();
    move |err| match DbError::from(err) {
        DbError::UniqueViolation { .. } => ValidationError::Duplicate { field, value }.into(),
        other => other,
    }
}

/// Escapes `%`, `_` and `\` so user input matches literally inside ILIKE.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("kopi"), "%kopi%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
